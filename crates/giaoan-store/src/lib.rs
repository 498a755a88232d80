//! Local persistence for giaoan.
//!
//! Saved lesson plans, the access flag and the model API key are kept as
//! serialized text under fixed keys in a [`KeyValueStore`]. The query
//! modules under [`queries`] are the only code that knows those keys.

pub mod config;
pub mod kv;
pub mod models;
pub mod queries;

pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
