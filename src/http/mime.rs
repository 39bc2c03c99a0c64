//! MIME type lookup
//!
//! Maps a file extension to the Content-Type used when sending files.

/// Content-Type for a file extension, `text/plain` when unknown
///
/// # Examples
/// ```
/// use treeroute::http::mime::content_type;
/// assert_eq!(content_type(Some("html")), "text/html; charset=utf-8");
/// assert_eq!(content_type(Some("JS")), "text/javascript; charset=utf-8");
/// assert_eq!(content_type(None), "text/plain; charset=utf-8");
/// ```
pub fn content_type(extension: Option<&str>) -> &'static str {
    let extension = extension.map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("wasm") => "application/wasm",

        Some("ico") => "image/x-icon",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",

        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",

        Some("ttf") => "application/x-font-ttf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("eot") => "application/vnd.ms-fontobject",

        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("doc") => "application/msword",

        _ => "text/plain; charset=utf-8",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type(Some("css")), "text/css; charset=utf-8");
        assert_eq!(content_type(Some("json")), "application/json");
        assert_eq!(content_type(Some("png")), "image/png");
        assert_eq!(content_type(Some("svg")), "image/svg+xml");
        assert_eq!(content_type(Some("ttf")), "application/x-font-ttf");
    }

    #[test]
    fn test_unknown_extension_is_plain_text() {
        assert_eq!(content_type(Some("xyz")), "text/plain; charset=utf-8");
        assert_eq!(content_type(None), "text/plain; charset=utf-8");
    }
}
