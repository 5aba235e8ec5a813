//! Inline `data:` payload parsing and decoding.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

use super::MediaCategory;

/// Scheme marker that identifies inline payload references.
pub const INLINE_SCHEME: &str = "data:";

/// Standard alphabet, padding optional. Pages routinely strip trailing `=`.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors decoding an inline payload body.
#[derive(Debug, Error)]
pub enum InlineDecodeError {
    /// The reference is not a `data:<type>,<body>` string.
    #[error("malformed inline data reference")]
    Malformed,

    /// The body is declared base64 but does not decode.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Returns true when the reference uses the inline data scheme.
#[must_use]
pub fn is_inline_reference(reference: &str) -> bool {
    reference
        .get(..INLINE_SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(INLINE_SCHEME))
}

/// A parsed `data:[<media type>][;param...][;base64],<body>` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlinePayload<'a> {
    media_type: &'a str,
    base64: bool,
    body: &'a str,
}

impl<'a> InlinePayload<'a> {
    /// Parses an inline reference; `None` when the scheme or the comma separator is missing.
    #[must_use]
    pub fn parse(reference: &'a str) -> Option<Self> {
        if !is_inline_reference(reference) {
            return None;
        }
        let rest = &reference[INLINE_SCHEME.len()..];
        let (header, body) = rest.split_once(',')?;

        let mut parts = header.split(';');
        let media_type = parts.next().unwrap_or("").trim();
        let base64 = parts.any(|param| param.trim().eq_ignore_ascii_case("base64"));

        Some(Self {
            media_type,
            base64,
            body,
        })
    }

    /// Declared media type as written (`image/png`), possibly empty.
    #[must_use]
    pub fn media_type(&self) -> &'a str {
        self.media_type
    }

    /// Declared subtype (`png` for `image/png`), empty when absent.
    #[must_use]
    pub fn subtype(&self) -> &'a str {
        self.media_type
            .split_once('/')
            .map_or("", |(_, subtype)| subtype.trim())
    }

    /// Whether the body is declared base64.
    #[must_use]
    pub fn is_base64(&self) -> bool {
        self.base64
    }

    /// Category from the declared top-level type; anything but `image/*` or `video/*` is `None`.
    #[must_use]
    pub fn category(&self) -> Option<MediaCategory> {
        let (top, subtype) = self.media_type.split_once('/')?;
        if subtype.trim().is_empty() {
            return None;
        }
        if top.trim().eq_ignore_ascii_case("image") {
            Some(MediaCategory::Image)
        } else if top.trim().eq_ignore_ascii_case("video") {
            Some(MediaCategory::Video)
        } else {
            None
        }
    }

    /// Decodes the body into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InlineDecodeError::Base64`] when a base64 body is invalid.
    pub fn decode(&self) -> Result<Vec<u8>, InlineDecodeError> {
        let unescaped = urlencoding::decode_binary(self.body.as_bytes());
        if !self.base64 {
            return Ok(unescaped.into_owned());
        }

        let compact: Vec<u8> = unescaped
            .iter()
            .copied()
            .filter(|byte| !byte.is_ascii_whitespace())
            .collect();
        Ok(LENIENT_BASE64.decode(compact)?)
    }
}

/// Parses and decodes in one step.
///
/// # Errors
///
/// Returns [`InlineDecodeError::Malformed`] for references without a body
/// separator, otherwise the errors of [`InlinePayload::decode`].
pub fn decode_inline(reference: &str) -> Result<Vec<u8>, InlineDecodeError> {
    InlinePayload::parse(reference)
        .ok_or(InlineDecodeError::Malformed)?
        .decode()
}
