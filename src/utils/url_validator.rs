//! Syntactic validation of long URLs and custom aliases.
//!
//! This is the input-shape check that runs before anything reaches the link
//! service. It does not fetch or inspect URL content.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Scheme, dotted host, then at least one path or query character.
pub static LONG_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)[\w.-]+(?:\.[\w.-]+)+[\w\-._~:/?#\[\]@!$&'()*+,;=.]+$")
        .expect("long URL pattern is valid")
});

/// Letters, digits, underscores and hyphens.
pub static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias pattern is valid"));

/// Maximum accepted custom alias length.
pub const MAX_ALIAS_LENGTH: usize = 64;

/// Errors produced by [`validate_long_url`] and [`validate_alias`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format")]
    InvalidFormat,

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Custom alias must be 1-{MAX_ALIAS_LENGTH} characters")]
    AliasLength,

    #[error("Custom alias can only contain letters, digits, underscores and hyphens")]
    AliasCharacters,
}

/// Checks that `input` looks like an absolute HTTP(S) URL.
///
/// Surrounding whitespace is ignored, matching how links are stored.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_long_url("https://example.com/page").is_ok());
/// assert!(validate_long_url("example.com").is_err());
/// ```
pub fn validate_long_url(input: &str) -> Result<(), UrlValidationError> {
    let input = input.trim();

    let url = Url::parse(input).map_err(|_| UrlValidationError::InvalidFormat)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedProtocol);
    }

    if !LONG_URL_REGEX.is_match(input) {
        return Err(UrlValidationError::InvalidFormat);
    }

    Ok(())
}

/// Checks the shape of a caller-chosen alias.
pub fn validate_alias(alias: &str) -> Result<(), UrlValidationError> {
    let alias = alias.trim();

    if alias.is_empty() || alias.len() > MAX_ALIAS_LENGTH {
        return Err(UrlValidationError::AliasLength);
    }

    if !ALIAS_REGEX.is_match(alias) {
        return Err(UrlValidationError::AliasCharacters);
    }

    Ok(())
}
