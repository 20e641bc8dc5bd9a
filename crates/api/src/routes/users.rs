//! User routes (auth-facing slice of the user surface)

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub email: String,
    pub enabled: bool,
}

/// Return the verified identity of the caller.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<ProfileResponse>>> {
    let account = state
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ApiResponse::success(
        "profile",
        Some(ProfileResponse {
            id: account.id,
            email: account.email,
            enabled: account.enabled,
        }),
    )))
}
