//! Product category model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kifayati_core::CategoryId;

/// A stored product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL-safe handle derived from the name; unique per store.
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
