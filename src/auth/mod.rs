use crate::state::AppState;
use axum::{middleware::from_fn_with_state, routing::get, Extension, Json, Router};

pub mod dto;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod session;

use dto::UserResponse;
use gate::{require_admin, AdminUser};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Routes behind the admin gate.
pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(admin_me))
        .route_layer(from_fn_with_state(state, require_admin))
}

async fn admin_me(Extension(AdminUser(user)): Extension<AdminUser>) -> Json<UserResponse> {
    Json(UserResponse::new(user))
}
