//! Ad-hoc maintenance against the store: fetch, insert, update, delete.
//!
//! Table names are resolved at run time so a typo is reported (and the
//! operation skipped) instead of failing the process.

use clap::Args;
use exn::ResultExt;
use seasync_store::{COLLECTIONS_TABLE, Column, Database, Filter, Query, StoredCollection, Value};
use seasync_transform::Collection;

use crate::error::{ErrorKind, Result};

/// `column=value`
pub type Assignment = (Column, Value);
/// `column=a,b,c`
pub type Membership = (Column, Vec<Value>);

fn split_pair(raw: &str) -> std::result::Result<(Column, &str), String> {
    let (column, value) = raw.split_once('=').ok_or_else(|| format!("expected `column=value`, found `{raw}`"))?;
    Ok((parse_column(column)?, value))
}

pub fn parse_column(raw: &str) -> std::result::Result<Column, String> {
    raw.trim().parse::<Column>().map_err(|err| err.to_string())
}

pub fn parse_assignment(raw: &str) -> std::result::Result<Assignment, String> {
    let (column, value) = split_pair(raw)?;
    let value = column.value(value).map_err(|err| err.to_string())?;
    Ok((column, value))
}

pub fn parse_like(raw: &str) -> std::result::Result<(Column, String), String> {
    let (column, value) = split_pair(raw)?;
    Ok((column, value.to_string()))
}

pub fn parse_membership(raw: &str) -> std::result::Result<Membership, String> {
    let (column, values) = split_pair(raw)?;
    let values = values
        .split(',')
        .filter(|value| !value.is_empty())
        .map(|value| column.value(value).map_err(|err| err.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((column, values))
}

#[derive(Debug, Clone, Args)]
pub struct TableArg {
    /// Table to operate on.
    #[arg(short, long, default_value = COLLECTIONS_TABLE)]
    pub table: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Exact match, repeatable (`--where owner=0xabc`).
    #[arg(short = 'w', long = "where", value_parser = parse_assignment)]
    pub filters: Vec<Assignment>,
    /// Case-sensitive substring match, repeatable (`--like name=Cat`).
    #[arg(short, long, value_parser = parse_like)]
    pub like: Vec<(Column, String)>,
    /// Membership, repeatable (`--in collection=a,b`).
    #[arg(short = 'i', long = "in", value_parser = parse_membership)]
    pub any_of: Vec<Membership>,
    /// Sort ascending by this column.
    #[arg(short, long, value_parser = parse_column)]
    pub order_by: Option<Column>,
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,
}
impl From<FetchArgs> for Query {
    fn from(args: FetchArgs) -> Self {
        Query {
            filter: Filter { conditions: args.filters },
            like: args.like,
            any_of: args.any_of,
            order_by: args.order_by,
            limit: args.limit,
        }
    }
}

pub async fn fetch(db: &Database, table: &str, args: FetchArgs) -> Result<Vec<StoredCollection>> {
    let Some(repo) = db.table(table) else {
        return Ok(Vec::new());
    };
    repo.fetch(&Query::from(args)).await.or_raise(|| ErrorKind::Store)
}

/// Parse a JSON object (one record) or array of objects (many records).
pub fn parse_records(json: &str) -> Result<Vec<Collection>> {
    let value: serde_json::Value =
        serde_json::from_str(json).or_raise(|| ErrorKind::Argument("record is not valid JSON".to_string()))?;
    let values = match value {
        serde_json::Value::Array(values) => values,
        value @ serde_json::Value::Object(_) => vec![value],
        _ => exn::bail!(ErrorKind::Argument("expected a JSON object or array of objects".to_string())),
    };
    values
        .into_iter()
        .map(|value| Collection::from_value(value).or_raise(|| ErrorKind::Argument("invalid record".to_string())))
        .collect()
}

pub async fn insert(db: &Database, table: &str, records: Vec<Collection>) -> Result<u64> {
    let Some(repo) = db.table(table) else {
        return Ok(0);
    };
    repo.insert(records).await.or_raise(|| ErrorKind::Store)
}

pub async fn update(db: &Database, table: &str, filters: Vec<Assignment>, values: &[Assignment]) -> Result<u64> {
    let Some(repo) = db.table(table) else {
        return Ok(0);
    };
    repo.update(&Filter { conditions: filters }, values).await.or_raise(|| ErrorKind::Store)
}

pub async fn delete(db: &Database, table: &str, filters: Vec<Assignment>) -> Result<u64> {
    let Some(repo) = db.table(table) else {
        return Ok(0);
    };
    repo.delete(&Filter { conditions: filters }).await.or_raise(|| ErrorKind::Store)
}
