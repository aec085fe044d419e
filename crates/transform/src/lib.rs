//! Normalization of raw marketplace collection payloads.
//!
//! The marketplace returns loosely-typed entries: fields go missing, hold
//! `"n/a"` placeholders, or carry contracts for chains we don't track. This
//! crate turns a raw `{"collections": [...]}` document into a deduplicated
//! list of [`Collection`] records that match the store's schema exactly.
//!
//! Missing values are replaced with fixed sentinel strings (see [`consts`])
//! rather than nulls, and entries without an Ethereum contract are dropped.

pub mod consts;
pub mod error;
mod models;
mod transform;

pub use crate::models::Collection;
pub use crate::transform::{dedup_by_collection, transform};
