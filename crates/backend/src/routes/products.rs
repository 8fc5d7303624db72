//! Product catalog endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kifayati_core::{CategoryId, Envelope, Price, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Product, slugify};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub discount_percent: u8,
    pub category_id: CategoryId,
    pub quantity: u32,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub shipping: bool,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub discount_percent: Option<u8>,
    pub category_id: Option<CategoryId>,
    pub quantity: Option<u32>,
    pub photo_url: Option<String>,
    pub shipping: Option<bool>,
}

/// Product as returned to clients, with the discount already computed.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub final_price: Price,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let final_price = product.final_price();
        Self {
            product,
            final_price,
        }
    }
}

/// `POST /api/products` (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(request): Json<CreateProduct>,
) -> Result<impl IntoResponse> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".to_owned()));
    }
    if request.discount_percent > 100 {
        return Err(AppError::BadRequest(
            "discount_percent must be 0-100".to_owned(),
        ));
    }
    state
        .categories()
        .get_by_id(&request.category_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("unknown category".to_owned()))?;

    let now = Utc::now();
    let product = Product {
        id: ProductId::from(Uuid::new_v4().to_string()),
        slug: slugify(&request.name),
        name: request.name,
        description: request.description,
        price: request.price,
        discount_percent: request.discount_percent,
        category_id: request.category_id,
        quantity: request.quantity,
        photo_url: request.photo_url,
        shipping: request.shipping,
        created_at: now,
        updated_at: now,
    };
    state.products().create(&product).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Product created successfully",
            ProductView::from(product),
        )),
    ))
}

/// `GET /api/products`
pub async fn list(State(state): State<AppState>) -> Result<Json<Envelope<Vec<ProductView>>>> {
    let products = state
        .products()
        .list()
        .await?
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(Json(Envelope::ok("Products fetched", products)))
}

/// `GET /api/products/{slug}`
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<ProductView>>> {
    let product = state
        .products()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    Ok(Json(Envelope::ok("Product fetched", product.into())))
}

/// `GET /api/products/category/{slug}`
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<Vec<ProductView>>>> {
    let category = state
        .categories()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let products = state
        .products()
        .list_by_category(&category.id)
        .await?
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(Json(Envelope::ok("Products fetched", products)))
}

/// `PUT /api/products/{id}` (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateProduct>,
) -> Result<Json<Envelope<ProductView>>> {
    let mut product = state
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("product name is required".to_owned()));
        }
        product.slug = slugify(&name);
        product.name = name;
    }
    if let Some(description) = request.description {
        product.description = description;
    }
    if let Some(price) = request.price {
        product.price = price;
    }
    if let Some(discount_percent) = request.discount_percent {
        if discount_percent > 100 {
            return Err(AppError::BadRequest(
                "discount_percent must be 0-100".to_owned(),
            ));
        }
        product.discount_percent = discount_percent;
    }
    if let Some(category_id) = request.category_id {
        state
            .categories()
            .get_by_id(&category_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("unknown category".to_owned()))?;
        product.category_id = category_id;
    }
    if let Some(quantity) = request.quantity {
        product.quantity = quantity;
    }
    if let Some(photo_url) = request.photo_url {
        product.photo_url = Some(photo_url);
    }
    if let Some(shipping) = request.shipping {
        product.shipping = shipping;
    }
    product.updated_at = Utc::now();

    state.products().update(&product).await?;

    Ok(Json(Envelope::ok(
        "Product updated successfully",
        product.into(),
    )))
}

/// `DELETE /api/products/{id}` (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Envelope<()>>> {
    if state.products().delete(&id).await? {
        Ok(Json(Envelope::ok_empty("Product deleted successfully")))
    } else {
        Err(AppError::NotFound(format!("product {id}")))
    }
}
