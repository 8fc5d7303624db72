//! Kifayati Core - Shared types library.
//!
//! This crate provides common types used across all Kifayati components:
//! - `session` - Client-side session/identity synchronization core
//! - `backend` - JSON API over the managed document store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no document store access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails,
//!   plus the API response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
