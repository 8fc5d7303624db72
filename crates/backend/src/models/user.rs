//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kifayati_core::{Email, UserId};

/// Role of an ordinary customer account.
pub const ROLE_CUSTOMER: u8 = 0;
/// Role of an administrator account.
pub const ROLE_ADMIN: u8 = 1;

/// A stored user account.
///
/// The password and recovery answer are present only as argon2 hashes; this
/// struct is the document-store shape, never a wire response. Use
/// [`User::profile`] for anything that leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    /// 0 = customer, 1 = admin.
    pub role: u8,
    pub password_hash: String,
    /// Hash of the recovery answer used by password reset.
    pub answer_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account has administrator privileges.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// The client-visible projection, with no credential material.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            role: self.role,
        }
    }
}

/// Client-visible user projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub role: u8,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u-1".into(),
            name: "Ayesha".to_owned(),
            email: Email::parse("ayesha@example.com").unwrap(),
            phone: "0300-1234567".to_owned(),
            address: "Lahore".to_owned(),
            role: ROLE_CUSTOMER,
            password_hash: "$argon2id$stub".to_owned(),
            answer_hash: "$argon2id$stub".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_carries_no_hashes() {
        let json = serde_json::to_value(sample_user().profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("answer_hash").is_none());
        assert_eq!(json["name"], "Ayesha");
    }

    #[test]
    fn test_is_admin() {
        let mut user = sample_user();
        assert!(!user.is_admin());
        user.role = ROLE_ADMIN;
        assert!(user.is_admin());
    }
}
