// Sign-in endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::auth::User;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for login, logout and whoami
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SessionResponse {
    fn from_user(user: Option<User>) -> Self {
        Self {
            authenticated: user.is_some(),
            display_name: user.as_ref().map(User::display_name),
            user,
        }
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state.session.login(&request.email, &request.password).await?;
    state.prefill_email();
    Ok(Json(SessionResponse::from_user(Some(user))))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> Json<SessionResponse> {
    state.session.logout().await;
    Json(SessionResponse::from_user(None))
}

/// GET /api/auth/whoami
pub async fn whoami(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse::from_user(state.session.user()))
}
