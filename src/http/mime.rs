//! Content-Type lookup for stored files, keyed on the filename extension.

use std::path::Path;

const FALLBACK: &str = "application/octet-stream";

/// Guess the `Content-Type` of a stored file from its name
pub fn content_type_for(filename: &str) -> &'static str {
    let Some(ext) = Path::new(filename).extension().and_then(|e| e.to_str()) else {
        return FALLBACK;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Raster / geospatial
        "tif" | "tiff" => "image/tiff",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "geojson" => "application/geo+json",
        "kml" => "application/vnd.google-earth.kml+xml",

        // Text and data
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",

        // Documents and archives
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        // Media
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",

        _ => FALLBACK,
    }
}
