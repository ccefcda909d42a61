//! In-memory views of the Sipper catalog.
//!
//! An [`EntityCache`] holds one entity kind as a sorted, deduplicated
//! sequence that is rebuilt from the store whenever the [`Gateway`]
//! reports a change. The [`Catalog`] owns the gateway and one cache per
//! kind and is the context object passed to consumers.
//!
//! [`Gateway`]: sipper_store::Gateway

pub mod cache;
pub mod error;
pub mod events;
pub mod registry;

pub use cache::EntityCache;
pub use error::{CacheError, CacheResult};
pub use events::ListEvent;
pub use registry::{Cached, Catalog};
