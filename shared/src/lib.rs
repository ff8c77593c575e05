//! Shared types and models for the ice cream directory
//!
//! This crate contains types shared between the backend, the browser (via
//! WASM), and any other component that needs the directory's domain rules.

pub mod listing_view;
pub mod models;
pub mod schema;
pub mod transfer;
pub mod types;
pub mod validation;

pub use listing_view::*;
pub use models::*;
pub use schema::*;
pub use types::*;
pub use validation::*;
