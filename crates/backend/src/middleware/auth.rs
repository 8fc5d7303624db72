//! Bearer-token authentication extractors.
//!
//! Route handlers opt into authentication by taking [`RequireAuth`] (any
//! signed-in user) or [`RequireAdmin`] (role 1 only) as an argument.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use kifayati_core::UserId;

use crate::error::AppError;
use crate::models::user::ROLE_ADMIN;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// The authenticated caller, as asserted by a verified token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// ID of the token's subject.
    pub user_id: UserId,
    /// 0 = customer, 1 = admin.
    pub role: u8,
}

impl AuthUser {
    /// Whether the caller holds an admin token.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("hello, {}", user.user_id)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state)?))
    }
}

/// Extractor that requires a valid bearer token with the admin role.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }
        Ok(Self(user))
    }
}

/// Verify the `Authorization: Bearer` header against the signing secret.
fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_owned()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected bearer token".to_owned()))?;

    let claims = AuthService::new(state.store(), state.config()).verify_token(token)?;

    Ok(AuthUser {
        user_id: UserId::from(claims.sub),
        role: claims.role,
    })
}
