//! # Rollcall DB
//!
//! Storage for the Rollcall API behind the [`Store`] trait, with two
//! backends:
//!
//! - [`PgStore`]: PostgreSQL via SQLx, with embedded migrations
//! - [`MemoryStore`]: a single-lock in-memory store for development and tests
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rollcall_db::{MemoryStore, PgStore, Store};
//!
//! let store: Arc<dyn Store> = match database_url {
//!     Some(url) => {
//!         let pg = PgStore::connect(&url).await?;
//!         pg.migrate().await?;
//!         Arc::new(pg)
//!     }
//!     None => Arc::new(MemoryStore::new()),
//! };
//! ```

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::{PgStore, init_db_pool};
pub use sqlx::PgPool;
pub use store::Store;
