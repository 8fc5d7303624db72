//! Domain models stored in the document store.

pub mod category;
pub mod product;
pub mod user;

pub use category::Category;
pub use product::Product;
pub use user::{User, UserProfile};

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, keeps ASCII alphanumerics, and collapses everything else
/// into single hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
