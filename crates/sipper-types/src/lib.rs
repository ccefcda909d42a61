//! Foundation types for the Sipper drink catalog.
//!
//! Every other Sipper crate depends on `sipper-types`. Nothing in here does
//! I/O: these are plain values with conversion and ordering rules.
//!
//! # Key Types
//!
//! - [`Unit`] -- closed set of volume units with millilitre factors
//! - [`Amount`] -- quantity in a unit, compared by canonical millilitres
//! - [`EntityId`] -- store-assigned row identifier
//! - [`Listed`] -- capability shared by catalog entities (id, name, natural order)
//! - [`Ingredient`] -- a purchasable bottle or carton
//! - [`Recipe`] / [`RecipeIngredients`] -- a drink and its measured ingredients

pub mod amount;
pub mod error;
pub mod id;
pub mod ingredient;
pub mod listed;
pub mod recipe;
pub mod unit;

pub use amount::Amount;
pub use error::TypeError;
pub use id::{EntityId, EntityKind};
pub use ingredient::{round_currency, Ingredient};
pub use listed::{natural_order, Listed};
pub use recipe::{Recipe, RecipeIngredient, RecipeIngredients};
pub use unit::Unit;
