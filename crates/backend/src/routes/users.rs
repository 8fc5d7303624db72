//! User administration endpoints.

use axum::{Json, extract::State};

use kifayati_core::Envelope;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::UserProfile;
use crate::state::AppState;

/// `GET /api/users` (admin) - list all accounts, hashes excluded.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Envelope<Vec<UserProfile>>>> {
    let users = state
        .users()
        .list()
        .await?
        .iter()
        .map(crate::models::User::profile)
        .collect();

    Ok(Json(Envelope::ok("Users fetched", users)))
}
