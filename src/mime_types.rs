//! Content-type lookup by file extension
//!
//! The remote worker does not report reliable content types for produced
//! files, so downloads are typed locally from the file name.

const OCTET_STREAM: &str = "application/octet-stream";

/// Extension table, lowercase keys
const MIME_TABLE: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("txt", "text/plain"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

/// Returns the content type for `file_name`, matching the extension
/// case-insensitively. Unmapped or missing extensions fall back to
/// `application/octet-stream`.
pub fn get_mime_type(file_name: &str) -> &'static str {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .and_then(|ext| {
            MIME_TABLE
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(get_mime_type("a.pdf"), "application/pdf");
        assert_eq!(get_mime_type("photo.JPG"), "image/jpeg");
        assert_eq!(get_mime_type("photo.jpeg"), "image/jpeg");
        assert_eq!(get_mime_type("notes.txt"), "text/plain");
        assert_eq!(get_mime_type("rows.csv"), "text/csv");
        assert_eq!(
            get_mime_type("letter.docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(
            get_mime_type("report.XLSX"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(get_mime_type("noext"), "application/octet-stream");
        assert_eq!(get_mime_type("archive.tar.zst"), "application/octet-stream");
        assert_eq!(get_mime_type("trailing."), "application/octet-stream");
    }

    #[test]
    fn test_only_last_extension_counts() {
        assert_eq!(get_mime_type("data.json.png"), "image/png");
    }
}
