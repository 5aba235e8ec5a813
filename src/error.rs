//! Run-terminating errors and input URL validation.

use thiserror::Error;
use url::Url;

use crate::renderer::RendererError;

/// Longest accepted page URL.
pub const MAX_URL_LENGTH: usize = 2000;

/// Errors that end a run before or while the page is harvested.
///
/// Per-task download failures never surface here; they are counted in the
/// run summary instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// The page URL is not an absolute `http(s)` URL.
    #[error("invalid URL '{input}': {reason}\n  Suggestion: {suggestion}")]
    InvalidInputUrl {
        /// What the user entered.
        input: String,
        /// Why it was rejected.
        reason: String,
        /// How to fix it.
        suggestion: String,
    },

    /// Browser launch, navigation or DOM inspection failed.
    #[error(transparent)]
    Renderer(#[from] RendererError),

    /// The shared HTTP client could not be built.
    #[error("failed to initialise HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl RunError {
    /// Creates an `InvalidInputUrl` error for a non-web scheme.
    #[must_use]
    pub fn unsupported_scheme(input: &str) -> Self {
        Self::InvalidInputUrl {
            input: input.to_string(),
            reason: "URL must start with http:// or https://".to_string(),
            suggestion: "Use a full web address such as https://example.com/gallery".to_string(),
        }
    }

    /// Creates an `InvalidInputUrl` error for a URL that does not parse.
    #[must_use]
    pub fn malformed(input: &str, parse_error: &str) -> Self {
        Self::InvalidInputUrl {
            input: input.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }

    /// Creates an `InvalidInputUrl` error for an over-long URL.
    #[must_use]
    pub fn too_long(input: &str) -> Self {
        let preview: String = input.chars().take(60).collect();
        Self::InvalidInputUrl {
            input: format!("{preview}..."),
            reason: format!("URL is {} chars, max {MAX_URL_LENGTH}", input.len()),
            suggestion: "Check for extraneous content pasted with the URL".to_string(),
        }
    }
}

/// Validates the page URL entered by the user.
///
/// # Errors
///
/// Returns [`RunError::InvalidInputUrl`] unless the input is an absolute
/// `http://` or `https://` URL with a host.
pub fn validate_page_url(raw: &str) -> Result<Url, RunError> {
    let raw = raw.trim();
    if raw.len() > MAX_URL_LENGTH {
        return Err(RunError::too_long(raw));
    }

    let lower = raw.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(RunError::unsupported_scheme(raw));
    }

    let parsed = Url::parse(raw).map_err(|e| RunError::malformed(raw, &e.to_string()))?;
    if parsed.host().is_none() {
        return Err(RunError::malformed(raw, "URL has no host"));
    }
    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_page_url_accepts_http_and_https() {
        assert_eq!(
            validate_page_url("https://example.com/gallery").unwrap().as_str(),
            "https://example.com/gallery"
        );
        assert!(validate_page_url("  HTTP://Example.com  ").is_ok());
    }

    #[test]
    fn test_validate_page_url_rejects_other_schemes() {
        for input in ["ftp://example.com/", "example.com", "", "file:///etc/passwd"] {
            let err = validate_page_url(input).unwrap_err();
            assert!(
                matches!(err, RunError::InvalidInputUrl { .. }),
                "{input}: {err:?}"
            );
        }
    }

    #[test]
    fn test_validate_page_url_rejects_malformed() {
        let err = validate_page_url("https://exa mple.com").unwrap_err();
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn test_validate_page_url_rejects_overlong_input() {
        let input = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        let err = validate_page_url(&input).unwrap_err();
        assert!(err.to_string().contains("max 2000"), "{err}");
    }

    #[test]
    fn test_renderer_error_converts_transparently() {
        let err: RunError = RendererError::launch("no browser").into();
        assert_eq!(err.to_string(), "failed to launch browser: no browser");
    }
}
