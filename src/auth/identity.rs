use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::warn;

use crate::error::AppError;
use crate::firebase::{IdentityClaim, TokenVerifier};

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::AuthRequired)?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or(AppError::AuthRequired)?;

    if token.is_empty() {
        return Err(AppError::AuthRequired);
    }
    Ok(token)
}

/// Verifies a Firebase ID token. Every verification failure becomes
/// `AppError::InvalidToken`; the reason is only logged.
pub async fn authenticate(
    verifier: &dyn TokenVerifier,
    token: Option<&str>,
) -> Result<IdentityClaim, AppError> {
    let token = token.unwrap_or_default();
    verifier.verify(token).await.map_err(|e| {
        warn!(reason = %e, "identity token rejected");
        AppError::InvalidToken
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::firebase::stub::StubVerifier;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn missing_or_malformed_header_requires_auth() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(AppError::AuthRequired)));
        assert!(matches!(bearer_token(&headers("Basic dXNlcg==")), Err(AppError::AuthRequired)));
        assert!(matches!(bearer_token(&headers("Bearer ")), Err(AppError::AuthRequired)));
        assert!(matches!(bearer_token(&headers("abc")), Err(AppError::AuthRequired)));
    }

    #[tokio::test]
    async fn collapses_verification_failures() {
        let verifier = StubVerifier::new().with("good", "a@x.com", "u1");
        assert_eq!(
            authenticate(&verifier, Some("good")).await.unwrap().email,
            "a@x.com"
        );
        assert!(matches!(
            authenticate(&verifier, Some("bad")).await,
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            authenticate(&verifier, None).await,
            Err(AppError::InvalidToken)
        ));
    }
}
