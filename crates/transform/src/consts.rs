/// Slug used when neither a slug nor a name is available.
pub const UNNAMED_COLLECTION: &str = "unnamed-collection";
pub const NO_DESCRIPTION: &str = "No description provided for this collection.";
pub const NO_IMAGE: &str = "No Image Available";
pub const NO_TWITTER: &str = "No Twitter";
/// Never persisted: records resolving to this contract are dropped.
pub const NO_ETHEREUM_CONTRACT: &str = "No Ethereum Contract";

/// Marketplace placeholder for missing text fields (compared case-insensitively).
pub(crate) const NOT_AVAILABLE: &str = "n/a";
pub(crate) const SECURE_URL_PREFIX: &str = "https://";
/// The only chain whose contracts are kept.
pub const TARGET_CHAIN: &str = "ethereum";
