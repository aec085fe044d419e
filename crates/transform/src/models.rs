use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A normalized NFT collection, shaped exactly like a row of the
/// `collections` table (minus the surrogate key).
///
/// Deserialization rejects unknown keys and requires every field, so a
/// hand-written mapping can only become a `Collection` if it names the exact
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Collection {
    /// Slug; the natural key.
    pub collection: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub owner: String,
    pub twitter_username: String,
    /// First Ethereum contract address.
    pub contracts: String,
}

impl Collection {
    /// Build a record from a JSON object, validating its field set.
    pub fn from_value(value: Value) -> Result<Self> {
        let described = describe(&value);
        serde_json::from_value(value).or_raise(|| ErrorKind::InvalidRecord(described))
    }
}

impl TryFrom<Value> for Collection {
    type Error = Error;
    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl FromStr for Collection {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).or_raise(|| ErrorKind::InvalidRecord(s.to_string()))
    }
}

/// Short human description of a rejected value for the error message.
fn describe(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys = map.keys().map(String::as_str).collect::<Vec<_>>();
            format!("object with keys [{}]", keys.join(", "))
        },
        other => format!("expected object, found {other}"),
    }
}
