//! Client for the OpenSea v2 collections API.
//!
//! The only call this crate makes is a single, unpaginated
//! `GET /api/v2/collections?chain=...`. A successful response is returned
//! verbatim as a [`Payload`] so the caller can archive exactly what the
//! marketplace sent before normalizing it.
//!
//! # Examples
//!
//! ```no_run
//! use seasync_extract::Client;
//!
//! # async fn example() -> seasync_extract::error::Result<()> {
//! let client = Client::new(Some("api-key".to_string()), seasync_extract::DEFAULT_ENDPOINT)?;
//! if let Some(payload) = client.fetch_collections("ethereum").await? {
//!     println!("{payload}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;

pub use crate::client::{API_KEY_HEADER, Client, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, Payload};
