//! Content-type sniffing over the leading bytes of an upload.

/// Number of leading bytes inspected when sniffing.
pub const PROBE_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const PLAIN_TEXT: &str = "text/plain; charset=utf-8";
pub const PLAIN_TEXT_UTF16_BE: &str = "text/plain; charset=utf-16be";
pub const PLAIN_TEXT_UTF16_LE: &str = "text/plain; charset=utf-16le";

/// The sniffing window of `body`. Shorter bodies are probed in full.
pub fn probe(body: &[u8]) -> &[u8] {
    &body[..body.len().min(PROBE_LEN)]
}

/// Detects a MIME type from byte-order marks and magic bytes, falling back to
/// plain text when the probe holds no binary control bytes, and to
/// `application/octet-stream` otherwise.
pub fn detect_content_type(probe: &[u8]) -> &'static str {
    // UTF-16 text is full of NULs, so the BOM has to win over the byte scan.
    match probe {
        [0xFE, 0xFF, ..] => return PLAIN_TEXT_UTF16_BE,
        [0xFF, 0xFE, ..] => return PLAIN_TEXT_UTF16_LE,
        [0xEF, 0xBB, 0xBF, ..] => return PLAIN_TEXT,
        _ => {}
    }

    if let Some(kind) = infer::get(probe) {
        return kind.mime_type();
    }

    if !probe.is_empty() && !probe.iter().copied().any(is_binary_byte) {
        PLAIN_TEXT
    } else {
        OCTET_STREAM
    }
}

// Control characters that never show up in text files.
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    #[test]
    fn test_png_magic() {
        assert_eq!(detect_content_type(&PNG_HEADER), "image/png");
    }

    #[test]
    fn test_pdf_magic() {
        assert_eq!(detect_content_type(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3"), "application/pdf");
    }

    #[test]
    fn test_unrecognised_binary_defaults_to_octet_stream() {
        let junk = [0x00, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x13, 0x37];
        assert_eq!(detect_content_type(&junk), OCTET_STREAM);
    }

    #[test]
    fn test_text_without_signature() {
        assert_eq!(detect_content_type(b"name,size\nreport,42\n"), PLAIN_TEXT);
    }

    #[test]
    fn test_byte_order_marks() {
        // "hi" in each encoding
        assert_eq!(detect_content_type(&[0xFE, 0xFF, 0x00, 0x68, 0x00, 0x69]), PLAIN_TEXT_UTF16_BE);
        assert_eq!(detect_content_type(&[0xFF, 0xFE, 0x68, 0x00, 0x69, 0x00]), PLAIN_TEXT_UTF16_LE);
        assert_eq!(detect_content_type(&[0xEF, 0xBB, 0xBF, 0x68, 0x69]), PLAIN_TEXT);
    }

    #[test]
    fn test_empty_probe() {
        assert_eq!(detect_content_type(&[]), OCTET_STREAM);
    }

    #[test]
    fn test_probe_window() {
        let big = vec![b'a'; 2048];
        assert_eq!(probe(&big).len(), PROBE_LEN);

        let small = b"tiny";
        assert_eq!(probe(small), small);
    }
}
