//! Newtype IDs for type-safe entity references.
//!
//! The managed document store assigns opaque string identifiers to documents,
//! and the identity provider does the same for authenticated subjects. The
//! `define_id!` macro wraps those strings so IDs from different entity types
//! cannot be mixed up.

/// Macro to define a type-safe opaque string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use kifayati_core::define_id;
/// define_id!(UserId);
/// define_id!(ProductId);
///
/// let user_id = UserId::new("u7Kp2fQx");
/// let product_id = ProductId::new("u7Kp2fQx");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = product_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from an opaque string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID, returning the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

// Document store entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);

// Identity provider subject ID (never authored locally)
define_id!(SubjectId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = UserId::new("a1B2c3D4");
        assert_eq!(id.as_str(), "a1B2c3D4");
        assert_eq!(id.to_string(), "a1B2c3D4");
        assert_eq!(id.into_inner(), "a1B2c3D4");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = SubjectId::new("sub-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sub-123\"");

        let back: SubjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_equality() {
        assert_eq!(ProductId::new("p1"), ProductId::from("p1"));
        assert_ne!(ProductId::new("p1"), ProductId::new("p2"));
    }
}
