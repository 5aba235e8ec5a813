//! Filename derivation, sanitization, and collision-safe path resolution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::constants::MAX_FILENAME_LEN;
use crate::media::{InlinePayload, MediaCategory, MediaReference, extension_for_subtype};

/// Monotonic identifier source for synthesized inline payload names.
///
/// One sequence lives for one run, so two payloads never share an id even when
/// they are processed within the same clock tick.
#[derive(Debug, Default)]
pub struct InlineIdSequence {
    last: u64,
}

impl InlineIdSequence {
    /// Creates a sequence whose first id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id.
    pub fn next_id(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

/// Unsanitized filename for a reference.
///
/// - Inline payloads: `data_<category>_<id>.<ext>`, extension from the declared subtype.
/// - URLs: the last path segment, percent-decoded, or `<category>_file` when empty.
#[must_use]
pub fn base_filename(
    reference: &MediaReference,
    category: MediaCategory,
    inline_ids: &mut InlineIdSequence,
) -> String {
    if reference.is_inline() {
        let extension = InlinePayload::parse(reference.raw_url())
            .map_or_else(|| "bin".to_string(), |payload| extension_for_subtype(payload.subtype()));
        return format!(
            "data_{}_{}.{extension}",
            category.label(),
            inline_ids.next_id()
        );
    }

    reference
        .absolute_url()
        .and_then(|url| url.path_segments()?.next_back().map(str::to_string))
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(&segment)
                .map(std::borrow::Cow::into_owned)
                .unwrap_or(segment)
        })
        .unwrap_or_else(|| default_filename(category))
}

fn default_filename(category: MediaCategory) -> String {
    format!("{}_file", category.label())
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_` and truncates
/// to the filename cap.
///
/// Names made only of dots would address the directory itself or its parent,
/// so they are rewritten to underscores.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }
    if sanitized.chars().all(|c| c == '.') {
        return "_".repeat(sanitized.len());
    }
    sanitized
}

/// Resolves a free path for `filename` inside `dir`.
///
/// A path is taken when it exists on disk or was already claimed earlier in
/// the run. Taken names get `-1`, `-2`, ... inserted before the extension
/// until a free one is found.
#[must_use]
pub fn resolve_unique_path(dir: &Path, filename: &str, claimed: &HashSet<PathBuf>) -> PathBuf {
    let is_taken = |candidate: &Path| candidate.exists() || claimed.contains(candidate);

    let base_path = dir.join(filename);
    if !is_taken(&base_path) {
        return base_path;
    }

    let (stem, ext) = split_extension(filename);
    (1u64..)
        .map(|i| dir.join(format!("{stem}-{i}{ext}")))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or(base_path)
}

/// Splits `name.ext` into (`name`, `.ext`); a leading dot is not an extension.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => filename.split_at(pos),
        _ => (filename, ""),
    }
}
