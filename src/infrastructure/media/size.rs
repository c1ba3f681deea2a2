const UNITS: [&str; 4] = ["kB", "MB", "GB", "TB"];

/// SI size with one decimal: `512 B`, `2.3 kB`, `4.0 MB`.
pub fn format_size(bytes: usize) -> String {
    if bytes < 1000 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
