//! MIME type detection module
//!
//! Returns the Content-Type of a downloaded file based on its extension.
//! Job output has no extension more often than not (`stdout`, `stderr`), so
//! extension-less files are served as text.

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use fileserver::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("log")), "text/plain; charset=utf-8");
/// assert_eq!(get_content_type(None), "text/plain; charset=utf-8");
/// assert_eq!(get_content_type(Some("bin")), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(extension) = extension else {
        return "text/plain; charset=utf-8";
    };

    match extension.to_ascii_lowercase().as_str() {
        // Text logs
        "log" | "txt" | "out" | "err" | "stdout" | "stderr" | "md" | "csv" => {
            "text/plain; charset=utf-8"
        }
        "html" | "htm" => "text/html; charset=utf-8",
        "xml" => "application/xml",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",

        // Archives of rotated or collected logs
        "gz" | "gzip" => "application/gzip",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "bz2" => "application/x-bzip2",
        "xz" => "application/x-xz",
        "zst" => "application/zstd",

        // Default
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("log")), "text/plain; charset=utf-8");
        assert_eq!(get_content_type(Some("LOG")), "text/plain; charset=utf-8");
        assert_eq!(get_content_type(Some("json")), "application/json");
        assert_eq!(get_content_type(Some("gz")), "application/gzip");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "text/plain; charset=utf-8");
    }
}
