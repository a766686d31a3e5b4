//! Extension to content-type mapping.

/// Content type used when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extensions whose bodies are gzip-compressed.
pub const COMPRESSIBLE: [&str; 6] = ["html", "css", "js", "json", "xml", "svg"];

/// Content type for a file extension (case-insensitive, without the dot).
pub fn content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "bmp" => "image/bmp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "webmanifest" => "application/manifest+json",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Whether responses with this extension are compressed.
pub fn is_compressible(extension: &str) -> bool {
    COMPRESSIBLE.iter().any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Whether the reload snippet may be appended to this extension.
pub fn is_html(extension: &str) -> bool {
    extension.eq_ignore_ascii_case("html")
}
