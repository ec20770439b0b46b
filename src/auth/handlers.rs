use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LinkedResponse, SigninResponse, SignupRequest, TokenRequest, UserResponse},
        identity::authenticate,
        session::{SessionKeys, SessionUser},
    },
    error::{ApiResult, AppError, ALREADY_LINKED},
    state::AppState,
    users::{NewUser, RepoError, Role},
};

const DEFAULT_FULL_NAME: &str = "User";
const DEFAULT_GOOGLE_NAME: &str = "Google User";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/google-sync", post(google_sync))
        .route("/me", get(me))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Links a freshly created Firebase account to a new profile.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Option<Json<SignupRequest>>,
) -> ApiResult<(StatusCode, Json<LinkedResponse>)> {
    let Json(payload) = payload.unwrap_or_default();
    let claim = authenticate(state.verifier.as_ref(), payload.token.as_deref()).await?;

    if state.users.find_by_email(&claim.email).await?.is_some() {
        warn!(email = %claim.email, "signup for already linked email");
        return Err(AppError::Conflict(ALREADY_LINKED.into()));
    }

    let new_user = NewUser {
        email: claim.email,
        full_name: non_empty(payload.full_name).unwrap_or_else(|| DEFAULT_FULL_NAME.into()),
        avatar: claim.picture_url.unwrap_or_default(),
        external_id: Some(claim.subject_id),
        role: Role::User,
    };
    // A concurrent signup that wins the unique index surfaces as Conflict.
    let user = state.users.create(new_user).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(LinkedResponse {
            success: true,
            message: "Signup successful".into(),
            data: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    payload: Option<Json<TokenRequest>>,
) -> ApiResult<Json<SigninResponse>> {
    let Json(payload) = payload.unwrap_or_default();
    let claim = authenticate(state.verifier.as_ref(), payload.token.as_deref()).await?;

    // Verified by Firebase but never linked here: report it, do not heal it.
    let Some(user) = state.users.find_by_email(&claim.email).await? else {
        warn!(email = %claim.email, "verified identity has no profile");
        return Err(AppError::NotFound("User profile not found".into()));
    };

    let token = SessionKeys::from_ref(&state).sign(&user.id.to_hex())?;

    info!(user_id = %user.id, email = %user.email, "user signed in");
    Ok(Json(SigninResponse {
        success: true,
        message: "Signin successful".into(),
        token,
        data: user.into(),
    }))
}

/// Find-or-create keyed by the verified email. Repeated calls return the
/// record created by the first one.
#[instrument(skip(state, payload))]
pub async fn google_sync(
    State(state): State<AppState>,
    payload: Option<Json<TokenRequest>>,
) -> ApiResult<Json<UserResponse>> {
    let Json(payload) = payload.unwrap_or_default();
    let claim = authenticate(state.verifier.as_ref(), payload.token.as_deref()).await?;

    if let Some(user) = state.users.find_by_email(&claim.email).await? {
        return Ok(Json(UserResponse::new(user)));
    }

    let email = claim.email.clone();
    let new_user = NewUser {
        email: claim.email,
        full_name: claim
            .display_name
            .unwrap_or_else(|| DEFAULT_GOOGLE_NAME.into()),
        avatar: claim.picture_url.unwrap_or_default(),
        external_id: Some(claim.subject_id),
        role: Role::User,
    };

    let user = match state.users.create(new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "google user created");
            user
        }
        Err(RepoError::DuplicateEmail(_)) => {
            // Lost a race with a concurrent sync; return the winner's record.
            state
                .users
                .find_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("user {email} vanished after duplicate insert"))?
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(UserResponse::new(user)))
}

#[instrument(skip_all)]
pub async fn me(SessionUser(user): SessionUser) -> Json<UserResponse> {
    Json(UserResponse::new(user))
}
