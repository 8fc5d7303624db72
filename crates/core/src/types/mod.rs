//! Core type definitions.
//!
//! All types here are plain data with validation at construction. They carry
//! no I/O and are shared by the session core and the backend.

mod email;
mod envelope;
mod id;
mod price;

pub use email::{Email, EmailError};
pub use envelope::Envelope;
pub use id::{CategoryId, ProductId, SubjectId, UserId};
pub use price::Price;
