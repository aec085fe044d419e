use seasync_transform::Collection;
use serde::Serialize;

#[derive(sqlx::FromRow)]
pub(crate) struct CollectionRow {
    id: i64,
    collection: String,
    name: String,
    description: String,
    image_url: String,
    owner: String,
    twitter_username: String,
    contracts: String,
}
impl From<CollectionRow> for StoredCollection {
    fn from(row: CollectionRow) -> Self {
        Self {
            id: row.id,
            record: Collection {
                collection: row.collection,
                name: row.name,
                description: row.description,
                image_url: row.image_url,
                owner: row.owner,
                twitter_username: row.twitter_username,
                contracts: row.contracts,
            },
        }
    }
}

/// A collection as read back from the table, with its surrogate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredCollection {
    pub id: i64,
    #[serde(flatten)]
    pub record: Collection,
}

/// One or many records for [`Repository::insert`](crate::Repository::insert).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows(pub Vec<Collection>);
impl From<Collection> for Rows {
    fn from(record: Collection) -> Self {
        Self(vec![record])
    }
}
impl From<Vec<Collection>> for Rows {
    fn from(records: Vec<Collection>) -> Self {
        Self(records)
    }
}
