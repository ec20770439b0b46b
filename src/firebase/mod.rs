//! Firebase ID token verification.
//!
//! Tokens are RS256 JWTs signed by one of Google's rotating `securetoken`
//! keys. [`FirebaseVerifier`] checks the signature against the published JWK
//! set and the standard Firebase claims, then hands back the identity fields
//! the profile store needs.

mod keys;
#[cfg(test)]
pub(crate) mod stub;
mod verifier;

use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use serde::Serialize;
use thiserror::Error;

pub use keys::{GoogleKeyProvider, KeyProvider, StaticKeyProvider, GOOGLE_JWKS_URL};
pub use verifier::FirebaseVerifier;

/// Identity fields extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityClaim {
    pub email: String,
    pub subject_id: String,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
}

/// Why a token was refused. Callers treat every variant the same way; the
/// detail only goes to the server log.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("token is empty")]
    Empty,
    #[error("malformed token: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
    #[error("unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),
    #[error("token header has no kid")]
    MissingKeyId,
    #[error("no public key for kid {0}")]
    UnknownKey(String),
    #[error("unusable public key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("fetching public keys failed: {0}")]
    KeyFetch(#[from] reqwest::Error),
    #[error("token rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
    #[error("token issued in the future")]
    IssuedInFuture,
    #[error("invalid subject")]
    InvalidSubject,
    #[error("token carries no email")]
    MissingEmail,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<IdentityClaim, VerifyError>;
}
