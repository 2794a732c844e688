//! # recipix-store
//!
//! Relational storage for Recipix, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for recipes, the
//! ingredient catalog and the links between them. Foreign keys are enforced
//! and recipe creation is transactional.

pub mod database;
pub mod ingredients;
pub mod links;
pub mod migrations;
pub mod models;
pub mod recipes;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
