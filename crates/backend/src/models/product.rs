//! Product catalog model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kifayati_core::{CategoryId, Price, ProductId};

/// A stored catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL-safe handle derived from the name; unique per store.
    pub slug: String,
    pub description: String,
    pub price: Price,
    /// Percentage off the list price, 0-100.
    pub discount_percent: u8,
    pub category_id: CategoryId,
    /// Units in stock.
    pub quantity: u32,
    pub photo_url: Option<String>,
    /// Whether the product ships (vs. pickup only).
    pub shipping: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price after the product's own discount.
    #[must_use]
    pub fn final_price(&self) -> Price {
        self.price.discounted(self.discount_percent)
    }

    /// The amount the discount saves per unit.
    #[must_use]
    pub fn savings(&self) -> Price {
        self.price.discount_amount(self.discount_percent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_final_price_applies_discount() {
        let product = Product {
            id: "p-1".into(),
            name: "Basmati Rice 5kg".to_owned(),
            slug: "basmati-rice-5kg".to_owned(),
            description: String::new(),
            price: Price::new("1200.00".parse().unwrap()),
            discount_percent: 15,
            category_id: "c-1".into(),
            quantity: 40,
            photo_url: None,
            shipping: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(product.final_price(), Price::new("1020.00".parse().unwrap()));
        assert_eq!(product.savings(), Price::new("180.00".parse().unwrap()));
    }
}
