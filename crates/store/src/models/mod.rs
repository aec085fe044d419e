mod collection;

pub(crate) use self::collection::CollectionRow;
pub use self::collection::{Rows, StoredCollection};
