//! Short code generation and audit fingerprints.
//!
//! Codes are 6 characters drawn uniformly from a 62-symbol alphabet and are
//! independent of the long URL. The fingerprint is a salted SHA-256 of the
//! long URL recorded for traceability only; it is never a lookup or dedupe key.

use rand::Rng;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Length of every generated short code.
pub const CODE_LENGTH: usize = 6;

/// Upper case, lower case, then digits.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Number of random bytes in a fingerprint salt (hex-encoded to 32 characters).
const SALT_LENGTH_BYTES: usize = 16;

/// Source of candidate short codes.
///
/// Implementations must be stateless from the caller's point of view: every
/// call is independent and must not consult storage. Uniqueness is enforced
/// by [`crate::application::services::UniquenessResolver`].
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default generator backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        generate_code()
    }
}

/// Generates a random short code of [`CODE_LENGTH`] characters.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    let mut rng = rand::rng();

    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Salt and digest recorded alongside a link for audit purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub salt: String,
    pub digest: String,
}

/// Computes an audit fingerprint for `long_url` with a fresh random salt.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn fingerprint(long_url: &str) -> Result<Fingerprint, AppError> {
    let mut buffer = [0u8; SALT_LENGTH_BYTES];
    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate fingerprint salt",
            json!({ "reason": e.to_string() }),
        )
    })?;

    let salt = hex::encode(buffer);
    let digest = fingerprint_with_salt(long_url, &salt);

    Ok(Fingerprint { salt, digest })
}

/// Recomputes the fingerprint digest: `sha256(hex(sha256(long_url)) + salt)`.
pub fn fingerprint_with_salt(long_url: &str, salt: &str) -> String {
    let url_hash = hex::encode(Sha256::digest(long_url.as_bytes()));

    let mut hasher = Sha256::new();
    hasher.update(url_hash.as_bytes());
    hasher.update(salt.as_bytes());

    hex::encode(hasher.finalize())
}
