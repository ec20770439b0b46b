use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;

use super::{IdentityClaim, KeyProvider, TokenVerifier, VerifyError};

const CLOCK_SKEW_SECS: u64 = 60;
const MAX_SUBJECT_LEN: usize = 128;

/// Payload of a Firebase ID token; `aud`, `iss` and `exp` are checked by
/// `Validation` and not repeated here.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    iat: i64,
    #[serde(default)]
    auth_time: Option<i64>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

pub struct FirebaseVerifier {
    keys: Arc<dyn KeyProvider>,
    validation: Validation,
}

impl FirebaseVerifier {
    pub fn new(project_id: &str, keys: Arc<dyn KeyProvider>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{project_id}")]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation.leeway = CLOCK_SKEW_SECS;
        Self { keys, validation }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaim, VerifyError> {
        if token.is_empty() {
            return Err(VerifyError::Empty);
        }

        let header = decode_header(token).map_err(VerifyError::Malformed)?;
        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;
        let jwk = self
            .keys
            .find(&kid)
            .await?
            .ok_or_else(|| VerifyError::UnknownKey(kid.clone()))?;
        let key = DecodingKey::from_jwk(&jwk).map_err(VerifyError::InvalidKey)?;

        let claims = decode::<FirebaseClaims>(token, &key, &self.validation)
            .map_err(VerifyError::Rejected)?
            .claims;

        let latest = OffsetDateTime::now_utc().unix_timestamp() + CLOCK_SKEW_SECS as i64;
        if claims.iat > latest || claims.auth_time.is_some_and(|t| t > latest) {
            return Err(VerifyError::IssuedInFuture);
        }
        if claims.sub.is_empty() || claims.sub.len() > MAX_SUBJECT_LEN {
            return Err(VerifyError::InvalidSubject);
        }
        let email = non_empty(claims.email).ok_or(VerifyError::MissingEmail)?;

        debug!(sub = %claims.sub, kid = %kid, "firebase token verified");
        Ok(IdentityClaim {
            email,
            subject_id: claims.sub,
            display_name: non_empty(claims.name),
            picture_url: non_empty(claims.picture),
        })
    }
}
