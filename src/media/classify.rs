//! Extension and media-type based classification.

use url::Url;

use super::MediaKind;

/// Image extensions recognised in URL paths (lowercase, without the dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "svg", "bmp", "avif"];

/// Video extensions recognised in URL paths (lowercase, without the dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "ogg", "wmv", "mkv", "flv"];

/// Classifies a network URL by the extension of its last path segment.
///
/// Query and fragment never take part in the match. Only `http` and `https`
/// URLs are downloadable; anything else is [`MediaKind::Discarded`].
#[must_use]
pub fn classify_url(url: &Url) -> MediaKind {
    if !matches!(url.scheme(), "http" | "https") {
        return MediaKind::Discarded;
    }

    let Some(extension) = path_extension(url) else {
        return MediaKind::Discarded;
    };

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        MediaKind::Image
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        MediaKind::Video
    } else {
        MediaKind::Discarded
    }
}

fn path_extension(url: &Url) -> Option<String> {
    let last_segment = url.path_segments()?.next_back()?;
    let dot_index = last_segment.rfind('.')?;
    let ext = &last_segment[dot_index + 1..];
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Maps a declared media subtype (`png`, `svg+xml`, `quicktime`) to a file extension.
#[must_use]
pub fn extension_for_subtype(subtype: &str) -> String {
    let subtype = subtype.trim().to_ascii_lowercase();
    let mapped = match subtype.as_str() {
        "jpeg" | "pjpeg" => "jpg",
        "svg+xml" => "svg",
        "quicktime" => "mov",
        "x-matroska" => "mkv",
        "x-flv" => "flv",
        "x-ms-wmv" => "wmv",
        "x-ms-bmp" => "bmp",
        other => other.split('+').next().unwrap_or(other),
    };
    if mapped.is_empty() {
        "bin".to_string()
    } else {
        mapped.to_string()
    }
}
