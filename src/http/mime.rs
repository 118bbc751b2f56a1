//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

use std::path::Path;

/// Extension-to-MIME table, matched case-sensitively
pub const CONTENT_TYPES: &[(&str, &str)] = &[
    ("js", "application/javascript"),
    ("wasm", "application/wasm"),
    ("html", "text/html"),
];

/// Get MIME Content-Type based on file extension
///
/// Anything without an extension, or with one missing from [`CONTENT_TYPES`],
/// gets `fallback`.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use wasm_asset_server::http::mime::content_type_for;
///
/// let fallback = "text/plain; charset=utf-8";
/// assert_eq!(content_type_for(Path::new("web/app.wasm"), fallback), "application/wasm");
/// assert_eq!(content_type_for(Path::new("web/APP.JS"), fallback), fallback);
/// assert_eq!(content_type_for(Path::new("web/LICENSE"), fallback), fallback);
/// ```
pub fn content_type_for<'a>(path: &Path, fallback: &'a str) -> &'a str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(lookup)
        .unwrap_or(fallback)
}

fn lookup(extension: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}
