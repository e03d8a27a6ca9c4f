use axum::{extract::State, Json};
use tracing::{info, warn};
use validator::Validate;

use super::extract::JsonOrForm;
use crate::auth::check_credentials;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse};
use crate::AppState;

/// Login user
///
/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    JsonOrForm(req): JsonOrForm<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    req.validate()?;

    if !check_credentials(state.credentials.as_ref(), &req.user_id, &req.password).await? {
        warn!("Login rejected for {}", req.user_id);
        return Err(ApiError::Unauthorized("No such username or password".to_string()));
    }

    let token = state.sessions.issue(&req.user_id)?;
    info!("Login succeeded for {}", req.user_id);

    Ok(Json(LoginResponse::success(req.user_id, token)))
}
