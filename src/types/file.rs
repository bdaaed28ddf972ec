pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub struct MimeDetector;

impl MimeDetector {
    /// Pick the MIME type for an upload: the declared one when the client sent it,
    /// otherwise whatever the magic bytes say.
    pub fn resolve(declared: Option<&str>, data: &[u8]) -> String {
        match declared.map(str::trim) {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => Self::detect(data),
        }
    }

    pub fn detect(data: &[u8]) -> String {
        if let Some(kind) = infer::get(data) {
            match kind.mime_type() {
                // infer reports the legacy wav name
                "audio/x-wav" => "audio/wav".to_string(),
                mime => mime.to_string(),
            }
        } else {
            DEFAULT_MIME_TYPE.to_string()
        }
    }
}

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size in base 1024, at most two decimals, trailing zeros dropped.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png_magic() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(MimeDetector::detect(&png), "image/png");
    }

    #[test]
    fn test_unknown_bytes_fall_back() {
        assert_eq!(MimeDetector::detect(b"hello"), DEFAULT_MIME_TYPE);
        assert_eq!(MimeDetector::detect(b""), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_declared_type_wins() {
        assert_eq!(MimeDetector::resolve(Some("text/plain"), b"%PDF-1.4"), "text/plain");
        assert_eq!(MimeDetector::resolve(Some("  "), b"hello"), DEFAULT_MIME_TYPE);
        assert_eq!(MimeDetector::resolve(None, b"%PDF-1.4 rest"), "application/pdf");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(100 * 1024 * 1024), "100 MB");
        assert_eq!(format_bytes(10 * 1024 * 1024 * 1024), "10 GB");
    }
}
