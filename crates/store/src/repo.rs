//! Repository for the `collections` table.
//!
//! Every public operation is a single transaction on a pooled connection:
//! either the whole batch lands, or none of it does.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{CollectionRow, Rows, StoredCollection};
use crate::query::{self, Column, Filter, Query, Value};
use exn::ResultExt;
use seasync_transform::Collection;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::instrument;

const INSERT_COLUMNS: &str =
    "INSERT INTO collections (collection, name, description, image_url, owner, twitter_username, contracts) ";
// SQLITE_MAX_VARIABLE_NUMBER since 3.32; every row binds one value per column.
const MAX_BIND_PARAMETERS: usize = 32766;
const ROWS_PER_STATEMENT: usize = MAX_BIND_PARAMETERS / 7;

/// Raise a failed statement, reporting unique constraint violations as
/// [`ErrorKind::Duplicate`].
fn classify<T>(result: sqlx::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            let kind = ErrorKind::from_sqlx(&err);
            Err(err).or_raise(|| kind)
        },
    }
}

/// Repository for managing collection records.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    // =========================================================================
    // Insert
    // =========================================================================

    /// Load a transformed batch, one statement per record, in one transaction.
    ///
    /// An empty batch is a no-op. If any record collides with an existing
    /// slug (or another record in the batch) the transaction is rolled back
    /// and [`ErrorKind::Duplicate`] is returned; the offending record is not
    /// identified.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn bulk_load(&self, records: &[Collection]) -> Result<u64> {
        if records.is_empty() {
            tracing::info!("No transformed data available for insertion");
            return Ok(0);
        }
        // Dropping the transaction without committing rolls it back.
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let mut inserted = 0;
        for record in records {
            let result = sqlx::query(include_str!("../queries/insert_collection.sql"))
                .bind(&record.collection)
                .bind(&record.name)
                .bind(&record.description)
                .bind(&record.image_url)
                .bind(&record.owner)
                .bind(&record.twitter_username)
                .bind(&record.contracts)
                .execute(&mut *tx)
                .await;
            inserted += classify(result)?.rows_affected();
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(inserted, "Collections loaded into the database");
        Ok(inserted)
    }

    /// Insert one or many records with multi-row `INSERT`s.
    ///
    /// Large batches are split so no statement exceeds SQLite's bind
    /// parameter limit; every statement runs in the same transaction, so the
    /// semantics are the same all-or-nothing as [`bulk_load`](Self::bulk_load).
    #[instrument(skip_all)]
    pub async fn insert(&self, rows: impl Into<Rows>) -> Result<u64> {
        let Rows(records) = rows.into();
        if records.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let mut inserted = 0;
        for chunk in records.chunks(ROWS_PER_STATEMENT) {
            let mut builder = QueryBuilder::<Sqlite>::new(INSERT_COLUMNS);
            builder.push_values(chunk, |mut b, record| {
                b.push_bind(&record.collection)
                    .push_bind(&record.name)
                    .push_bind(&record.description)
                    .push_bind(&record.image_url)
                    .push_bind(&record.owner)
                    .push_bind(&record.twitter_username)
                    .push_bind(&record.contracts);
            });
            inserted += classify(builder.build().execute(&mut *tx).await)?.rows_affected();
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(inserted, "Collections inserted");
        Ok(inserted)
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Fetch rows matching every predicate of the query.
    #[instrument(skip(self))]
    pub async fn fetch(&self, query: &Query) -> Result<Vec<StoredCollection>> {
        let mut builder = QueryBuilder::<Sqlite>::new(include_str!("../queries/select_collections.sql"));
        query::push_where(&mut builder, &query.filter, Some(query));
        query::push_tail(&mut builder, query);
        let rows =
            builder.build_query_as::<CollectionRow>().fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        Ok(rows.into_iter().map(StoredCollection::from).collect())
    }

    /// Fetch a single collection by its slug.
    pub async fn get(&self, slug: impl AsRef<str>) -> Result<Option<StoredCollection>> {
        let query = Query::new().eq(Column::Collection, slug.as_ref()).limit(1);
        Ok(self.fetch(&query).await?.into_iter().next())
    }

    /// Total number of stored collections.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collections")
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("row count".to_string()))
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Overwrite the given columns on every row matching the filter.
    ///
    /// Returns the number of rows changed. With no assignments nothing is
    /// written.
    #[instrument(skip(self))]
    pub async fn update(&self, filter: &Filter, values: &[(Column, Value)]) -> Result<u64> {
        if values.is_empty() {
            tracing::info!("No new values given; nothing to update");
            return Ok(0);
        }
        if filter.is_empty() {
            tracing::warn!("No filter given; updating every row");
        }
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE collections SET ");
        let mut assignments = builder.separated(", ");
        for (column, value) in values {
            assignments.push(column.as_str()).push_unseparated(" = ");
            match value {
                Value::Integer(i) => assignments.push_bind_unseparated(*i),
                Value::Text(s) => assignments.push_bind_unseparated(s.clone()),
            };
        }
        query::push_where(&mut builder, filter, None);
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let updated = classify(builder.build().execute(&mut *tx).await)?.rows_affected();
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(updated, "Collections updated");
        Ok(updated)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete every row matching the filter, returning how many were removed.
    ///
    /// An empty filter deletes every row.
    #[instrument(skip(self))]
    pub async fn delete(&self, filter: &Filter) -> Result<u64> {
        if filter.is_empty() {
            tracing::warn!("No filter given; deleting every row");
        }
        let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM collections");
        query::push_where(&mut builder, filter, None);
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let deleted = builder.build().execute(&mut *tx).await.or_raise(|| ErrorKind::Database)?.rows_affected();
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(deleted, "Deleted collection record(s)");
        Ok(deleted)
    }
}
