//! Authentication endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use kifayati_core::Envelope;

use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::UserProfile;
use crate::services::auth::{AuthService, ProfileUpdate, Registration};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub answer: String,
    pub new_password: String,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.store(), state.config());
    let user = auth.register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("User registered successfully", user.profile())),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>> {
    let auth = AuthService::new(state.store(), state.config());
    let (user, token) = auth.login(&request.email, &request.password).await?;

    Ok(Json(Envelope::ok(
        "Login successful",
        LoginResponse {
            user: user.profile(),
            token,
        },
    )))
}

/// `POST /api/auth/forgot-password`
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<Envelope<()>>> {
    let auth = AuthService::new(state.store(), state.config());
    auth.reset_password(&request.email, &request.answer, &request.new_password)
        .await?;

    Ok(Json(Envelope::ok_empty("Password reset successfully")))
}

/// `PUT /api/auth/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Envelope<UserProfile>>> {
    let auth = AuthService::new(state.store(), state.config());
    let updated = auth.update_profile(&user.user_id, update).await?;

    Ok(Json(Envelope::ok(
        "Profile updated successfully",
        updated.profile(),
    )))
}

/// `GET /api/auth/test` - admin token probe.
pub async fn admin_probe(RequireAdmin(_): RequireAdmin) -> Json<Envelope<()>> {
    Json(Envelope::ok_empty("Protected admin route"))
}
