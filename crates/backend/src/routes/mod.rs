//! HTTP route handlers for the backend API.
//!
//! Every endpoint responds with the `{success, message, data?}` envelope.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /api/auth/register        - Create a customer account
//! POST /api/auth/login           - Login, returns a JWT
//! POST /api/auth/forgot-password - Recovery-answer password reset
//! PUT  /api/auth/profile         - Update own profile (bearer token)
//! GET  /api/auth/test            - Admin token probe
//!
//! # Products
//! POST   /api/products                  - Create (admin)
//! GET    /api/products                  - List all
//! GET    /api/products/{slug}           - Get by slug
//! GET    /api/products/category/{slug}  - List by category slug
//! PUT    /api/products/{id}             - Update (admin)
//! DELETE /api/products/{id}             - Delete (admin)
//!
//! # Categories
//! POST   /api/categories         - Create (admin)
//! GET    /api/categories         - List all
//! GET    /api/categories/{slug}  - Get by slug
//! PUT    /api/categories/{id}    - Update (admin)
//! DELETE /api/categories/{id}    - Delete (admin)
//!
//! # Users
//! GET /api/users                 - List accounts (admin)
//! ```

pub mod auth;
pub mod categories;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/profile", put(auth::update_profile))
        .route("/test", get(auth::admin_probe))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::list))
        .route("/category/{slug}", get(products::list_by_category))
        // GET resolves by slug; PUT/DELETE address the document ID.
        .route(
            "/{key}",
            get(products::get_by_slug)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(categories::create).get(categories::list))
        // GET resolves by slug; PUT/DELETE address the document ID.
        .route(
            "/{key}",
            get(categories::get_by_slug)
                .put(categories::update)
                .delete(categories::delete),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", get(users::list))
}

/// Create all routes for the backend API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/users", user_routes())
}
