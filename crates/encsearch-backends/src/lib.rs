//! Concrete store clients for encsearch.
//!
//! Implements the core's [`PrimaryStore`](encsearch_core::PrimaryStore)
//! seam with a MongoDB client (automatic field-level encryption) and the
//! [`SecondaryStore`](encsearch_core::SecondaryStore) seam with a
//! PostgreSQL client (in-database symmetric decryption).

pub mod config;
pub mod mongo;
pub mod postgres;

pub use config::{MongoSettings, PostgresSettings};
pub use mongo::MongoStore;
pub use postgres::RelationalStore;
