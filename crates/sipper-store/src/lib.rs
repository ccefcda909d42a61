//! Persistence gateway for the Sipper catalog.
//!
//! This crate owns everything between the domain types in `sipper-types`
//! and the relational store: the table layout, mapping rows back into
//! entities, and the serialized gateway that every read and write goes
//! through.
//!
//! # Storage Backends
//!
//! All backends implement the [`CatalogBackend`] trait:
//!
//! - [`SqliteBackend`] -- file-backed store, one connection per operation
//! - [`InMemoryBackend`] -- map-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. All store access is serialized through one [`Gateway`] lock.
//! 2. Identifiers are generated by the store and never reused.
//! 3. Saving a recipe replaces its association rows in one transaction.
//! 4. Deleting an ingredient removes every association row that names it.
//! 5. A successful mutation broadcasts [`StoreChanged`] after the lock is
//!    released; failed operations broadcast nothing.

pub mod backend;
pub mod config;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod memory;
mod rows;
pub mod schema;
pub mod signal;
pub mod sqlite;

// Re-export primary types at crate root for ergonomic imports.
pub use backend::{AssociationRow, CatalogBackend};
pub use config::CatalogConfig;
pub use entity::{StoredEntity, NEW_INGREDIENT_NAME, NEW_RECIPE_NAME};
pub use error::{StoreError, StoreResult};
pub use gateway::Gateway;
pub use memory::InMemoryBackend;
pub use signal::{ChangeSignal, Listeners, StoreChanged, SubscriptionId};
pub use sqlite::SqliteBackend;
