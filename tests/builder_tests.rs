
use gallery_backend::builders::{image::ImageBuilder, thumbnail::ThumbnailBuilder};
use gallery_backend::entities::image::{Image, ImageChanges};
use gallery_backend::entities::resource::Resource;
use gallery_backend::entities::thumbnail::Thumbnail;
use gallery_backend::errors::AppError;
use test_fixtures::TestImage;

fn complete_image() -> ImageBuilder {
    ImageBuilder::new()
        .name("sunset")
        .extension("jpg")
        .content_file("aGVsbG8=")
        .owner("alice")
        .size("5 B")
}

#[test]
fn build_new_leaves_id_unset() {
    let image = complete_image().id("ignored").build_new().expect("valid image");
    assert_eq!(image.id(), None);
    assert_eq!(image.file_name(), "sunset.jpg");
}

#[test]
fn build_requires_id() {
    let err = complete_image().build().unwrap_err();
    assert_eq!(err.field, "id");

    let err = complete_image().id("   ").build().unwrap_err();
    assert_eq!(err.field, "id");

    let image = complete_image().id("0190f5a2-0000-7000-8000-000000000001").build().unwrap();
    assert_eq!(image.id(), Some("0190f5a2-0000-7000-8000-000000000001"));
}

#[test]
fn first_missing_field_is_reported_in_order() {
    let err = ImageBuilder::new().build_new().unwrap_err();
    assert_eq!(err.field, "name");

    let err = ImageBuilder::new().name("a").build_new().unwrap_err();
    assert_eq!(err.field, "extension");

    let err = ImageBuilder::new().name("a").extension("png").build_new().unwrap_err();
    assert_eq!(err.field, "content_file");

    let err = ImageBuilder::new()
        .name("a")
        .extension("png")
        .content_file("eA==")
        .build_new()
        .unwrap_err();
    assert_eq!(err.field, "size");

    let err = ImageBuilder::new()
        .name("a")
        .extension("png")
        .content_file("eA==")
        .size("1 B")
        .build_new()
        .unwrap_err();
    assert_eq!(err.field, "owner");
}

#[test]
fn whitespace_counts_as_absent() {
    let err = complete_image().name("   ").build_new().unwrap_err();
    assert_eq!(err.field, "name");
    assert_eq!(err.reason, "name is required");
}

#[test]
fn extension_is_normalised() {
    let image = complete_image().extension(".PNG").build_new().unwrap();
    assert_eq!(image.extension(), "png");

    let err = complete_image().extension("p n g").build_new().unwrap_err();
    assert_eq!(err.field, "extension");
}

#[test]
fn only_name_can_be_set_by_field() {
    let builder = complete_image().set_field("name", "renamed").unwrap();
    assert_eq!(builder.build_new().unwrap().name(), "renamed");

    let err = complete_image().set_field("owner", "mallory").unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn validation_failure_maps_to_field_error() {
    let draft = TestImage::new("alice", "").draft();
    match Image::build_new(&draft).unwrap_err() {
        AppError::ValidationError(fields) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "name");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn update_set_skips_blank_values() {
    assert!(Image::update_set(&ImageChanges { name: None }).is_empty());
    assert!(Image::update_set(&ImageChanges { name: Some("  ".into()) }).is_empty());

    let set = Image::update_set(&ImageChanges { name: Some(" beach ".into()) });
    assert_eq!(set.get("name").map(String::as_str), Some("beach"));
}

#[test]
fn thumbnail_checks_source_fields_last() {
    let err = ThumbnailBuilder::new()
        .name("sunset")
        .extension("jpg")
        .content_file("dGh1bWI=")
        .owner("alice")
        .size("5 B")
        .build_new()
        .unwrap_err();
    assert_eq!(err.field, "image_id");

    let thumbnail = Thumbnail::build_new(&TestImage::new("alice", "sunset").thumbnail_for("img-1"))
        .expect("valid thumbnail");
    assert_eq!(thumbnail.image_id(), "img-1");
    assert_eq!(thumbnail.id(), None);
}

#[test]
fn stored_documents_decode_through_the_builder() {
    let json = serde_json::json!({
        "id": "0190f5a2-0000-7000-8000-000000000001",
        "name": "sunset",
        "extension": "JPG",
        "content_file": "aGVsbG8=",
        "owner": "alice",
        "size": "5 B",
    });
    let image: Image = serde_json::from_value(json).expect("document decodes");
    assert_eq!(image.extension(), "jpg");

    let missing_owner = serde_json::json!({
        "id": "0190f5a2-0000-7000-8000-000000000001",
        "name": "sunset",
        "extension": "jpg",
        "content_file": "aGVsbG8=",
        "size": "5 B",
    });
    assert!(serde_json::from_value::<Image>(missing_owner).is_err());
}
