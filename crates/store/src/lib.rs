//! SQLite store for normalized NFT collection records.
//!
//! The store holds a single `collections` table keyed by the collection slug.
//! It is a local, embedded database: the file is created and migrated on
//! first connect, and can be deleted and rebuilt by re-running a sync.
//!
//! # Architecture
//! - [`Database`] owns the connection pool and resolves table names.
//! - [`Repository`] runs each operation (bulk load, insert, fetch, update,
//!   delete) as its own transaction on a pooled connection.
//! - [`Query`] and [`Filter`] describe predicates over typed [`Column`]s, so
//!   no caller-provided text ever reaches the SQL string.

mod db;
pub mod error;
mod models;
mod query;
mod repo;

pub use crate::db::{COLLECTIONS_TABLE, Database};
pub use crate::models::{Rows, StoredCollection};
pub use crate::query::{Column, Filter, Query, Value};
pub use crate::repo::Repository;
