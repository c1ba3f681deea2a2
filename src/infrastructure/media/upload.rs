use std::path::Path;

use actix_multipart::form::{bytes::Bytes, MultipartForm};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::constants::MAX_UPLOAD_BYTES;
use crate::errors::AppError;
use crate::media::size::format_size;

const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "webp"];

#[derive(Debug, MultipartForm)]
pub struct ImageUploadForm {
    #[multipart(rename = "file", limit = "10MiB")]
    pub file: Bytes,
}

/// An upload that passed type and size checks, held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content: Vec<u8>,
    pub name: String,
    pub extension: String,
    pub size: usize,
}

impl UploadedFile {
    pub fn from_form(form: ImageUploadForm) -> Result<Self, AppError> {
        let file = form.file;
        Self::from_parts(file.file_name.as_deref(), file.data.to_vec())
    }

    pub fn from_parts(file_name: Option<&str>, content: Vec<u8>) -> Result<Self, AppError> {
        let (name, extension) = split_file_name(file_name)?;
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported file extension '{extension}', expected one of {}",
                ACCEPTED_EXTENSIONS.join(", ")
            )));
        }

        if content.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }
        if content.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} upload limit",
                format_size(MAX_UPLOAD_BYTES)
            )));
        }

        let kind = infer::get(&content)
            .ok_or_else(|| AppError::BadRequest("Unrecognised file type".into()))?;
        if !ACCEPTED_MIME_TYPES.contains(&kind.mime_type()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported file type: {}",
                kind.mime_type()
            )));
        }
        if canonical_extension(kind.extension()) != canonical_extension(&extension) {
            return Err(AppError::BadRequest(format!(
                "File named .{extension} holds {} data",
                kind.mime_type()
            )));
        }

        let size = content.len();
        Ok(UploadedFile { content, name, extension, size })
    }

    pub fn human_size(&self) -> String {
        format_size(self.size)
    }

    pub fn base64(&self) -> String {
        STANDARD.encode(&self.content)
    }
}

fn canonical_extension(extension: &str) -> &str {
    match extension {
        "jpeg" => "jpg",
        other => other,
    }
}

/// `"Cat.JPG"` becomes `("Cat", "jpg")`.
pub fn split_file_name(file_name: Option<&str>) -> Result<(String, String), AppError> {
    let file_name = file_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Uploaded file has no name".into()))?;

    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).map(str::trim).unwrap_or_default();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if stem.is_empty() || extension.is_empty() {
        return Err(AppError::BadRequest(format!(
            "File name '{file_name}' needs a name and an extension"
        )));
    }

    Ok((stem.to_owned(), extension))
}
