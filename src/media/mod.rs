//! Media reference model shared by the harvester and the download pipeline.
//!
//! A [`MediaReference`] is created once by the harvester, classified, and then
//! only read. Classification rules live in [`classify`]; inline `data:` payload
//! parsing and decoding live in [`inline`].

mod classify;
mod inline;

use std::fmt;

use url::Url;

pub use classify::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS, classify_url, extension_for_subtype};
pub use inline::{
    INLINE_SCHEME, InlineDecodeError, InlinePayload, decode_inline, is_inline_reference,
};

/// Output category of a downloadable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    /// Still images.
    Image,
    /// Video files.
    Video,
}

impl MediaCategory {
    /// Subdirectory name under the session root.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }

    /// Label used in synthesized filenames (`data_images_1.png`, `videos_file`).
    #[must_use]
    pub fn label(self) -> &'static str {
        self.dir_name()
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("Images"),
            Self::Video => f.write_str("Videos"),
        }
    }
}

/// Classification of a single reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Network image, classified by extension.
    Image,
    /// Network video, classified by extension.
    Video,
    /// Inline `data:` payload with the category its declared media type maps to.
    InlineData(MediaCategory),
    /// Not downloadable media.
    Discarded,
}

impl MediaKind {
    /// Category the reference is downloaded into, or `None` for discarded references.
    #[must_use]
    pub fn category(self) -> Option<MediaCategory> {
        match self {
            Self::Image => Some(MediaCategory::Image),
            Self::Video => Some(MediaCategory::Video),
            Self::InlineData(category) => Some(category),
            Self::Discarded => None,
        }
    }
}

/// A discovered pointer to a media asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    raw_url: String,
    absolute_url: Option<Url>,
    kind: MediaKind,
}

impl MediaReference {
    /// Classifies an already absolute network URL.
    #[must_use]
    pub fn from_url(raw_url: impl Into<String>, absolute_url: Url) -> Self {
        let kind = classify_url(&absolute_url);
        Self {
            raw_url: raw_url.into(),
            absolute_url: Some(absolute_url),
            kind,
        }
    }

    /// Classifies an inline `data:` reference by its declared media type.
    #[must_use]
    pub fn from_inline(literal: impl Into<String>) -> Self {
        let raw_url = literal.into();
        let kind = InlinePayload::parse(&raw_url)
            .and_then(|payload| payload.category())
            .map_or(MediaKind::Discarded, MediaKind::InlineData);
        Self {
            raw_url,
            absolute_url: None,
            kind,
        }
    }

    /// The reference as it was discovered.
    #[must_use]
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    /// Absolute network URL; `None` for inline payloads.
    #[must_use]
    pub fn absolute_url(&self) -> Option<&Url> {
        self.absolute_url.as_ref()
    }

    /// Classification result.
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Download category, `None` when discarded.
    #[must_use]
    pub fn category(&self) -> Option<MediaCategory> {
        self.kind.category()
    }

    /// Returns true for inline `data:` payloads.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.kind, MediaKind::InlineData(_))
    }

    /// Deduplication key: the absolute URL, or the literal inline string.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.absolute_url
            .as_ref()
            .map_or(self.raw_url.as_str(), Url::as_str)
    }

    /// Shortened form for log lines.
    #[must_use]
    pub fn display_short(&self) -> String {
        let identity = self.identity();
        if identity.chars().count() <= 60 {
            return identity.to_string();
        }
        let mut short: String = identity.chars().take(60).collect();
        short.push_str("...");
        short
    }
}
