use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::identity::{authenticate, bearer_token};
use crate::{error::AppError, state::AppState, users::User};

/// The verified administrator, inserted into request extensions by
/// [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Middleware admitting only requests whose Firebase ID token belongs to a
/// stored user with the `admin` role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;
    let claim = authenticate(state.verifier.as_ref(), Some(token)).await?;

    let user = state
        .users
        .find_by_email(&claim.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !user.is_admin() {
        warn!(email = %user.email, role = ?user.role, "admin access denied");
        return Err(AppError::Forbidden("Admin access required".into()));
    }

    debug!(user_id = %user.id, "admin access granted");
    req.extensions_mut().insert(AdminUser(user));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use bson::{oid::ObjectId, DateTime};
    use tower::ServiceExt;

    use crate::{
        app::build_app,
        firebase::stub::StubVerifier,
        state::testing::fake,
        users::{memory::InMemoryUserRepository, Role, User},
    };

    fn user(email: &str, role: Option<Role>) -> User {
        User {
            id: ObjectId::new(),
            full_name: email.into(),
            email: email.into(),
            password: None,
            avatar: String::new(),
            external_id: None,
            role,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    fn app() -> Router {
        let users = Arc::new(InMemoryUserRepository::new());
        users.insert(user("root@x.com", Some(Role::Admin)));
        users.insert(user("joe@x.com", Some(Role::User)));
        users.insert(user("legacy@x.com", None));
        let verifier = Arc::new(
            StubVerifier::new()
                .with("admin-token", "root@x.com", "r1")
                .with("user-token", "joe@x.com", "j1")
                .with("legacy-token", "legacy@x.com", "l1")
                .with("stranger-token", "nobody@x.com", "n1"),
        );
        build_app(fake(users, verifier))
    }

    async fn call(auth: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().uri("/api/admin/me");
        if let Some(value) = auth {
            req = req.header(header::AUTHORIZATION, value);
        }
        let res = app()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let (status, body) = call(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn rejects_non_bearer_scheme() {
        let (status, _) = call(Some("Token admin-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let (status, body) = call(Some("Bearer forged")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let (status, _) = call(Some("Bearer stranger-token")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_non_admin_and_roleless_users() {
        let (status, _) = call(Some("Bearer user-token")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(Some("Bearer legacy-token")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admits_admin_and_exposes_user() {
        let (status, body) = call(Some("Bearer admin-token")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "root@x.com");
        assert_eq!(body["data"]["role"], "admin");
    }
}
