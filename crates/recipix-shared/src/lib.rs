//! # recipix-shared
//!
//! Types and validation rules shared by the store and the HTTP server.

pub mod constants;
pub mod error;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use types::*;
