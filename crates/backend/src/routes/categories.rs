//! Category endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use kifayati_core::{CategoryId, Envelope};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, slugify};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// `POST /api/categories` (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(request): Json<CategoryRequest>,
) -> Result<impl IntoResponse> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("category name is required".to_owned()));
    }

    let now = Utc::now();
    let category = Category {
        id: CategoryId::from(Uuid::new_v4().to_string()),
        slug: slugify(&request.name),
        name: request.name,
        created_at: now,
        updated_at: now,
    };
    state.categories().create(&category).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Category created successfully", category)),
    ))
}

/// `GET /api/categories`
pub async fn list(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Category>>>> {
    let categories = state.categories().list().await?;
    Ok(Json(Envelope::ok("Categories fetched", categories)))
}

/// `GET /api/categories/{slug}`
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<Category>>> {
    let category = state
        .categories()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    Ok(Json(Envelope::ok("Category fetched", category)))
}

/// `PUT /api/categories/{id}` (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<Envelope<Category>>> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("category name is required".to_owned()));
    }

    let mut category = state
        .categories()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    category.slug = slugify(&request.name);
    category.name = request.name;
    category.updated_at = Utc::now();

    state.categories().update(&category).await?;

    Ok(Json(Envelope::ok("Category updated successfully", category)))
}

/// `DELETE /api/categories/{id}` (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<Envelope<()>>> {
    if state.categories().delete(&id).await? {
        Ok(Json(Envelope::ok_empty("Category deleted successfully")))
    } else {
        Err(AppError::NotFound(format!("category {id}")))
    }
}
