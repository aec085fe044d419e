//! Typed filters for the `collections` table.
//!
//! Column references are a closed enum, so the only text ever spliced into
//! SQL is a static identifier; every value goes through a bind parameter.

use derive_more::Display;
use exn::OptionExt;
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

/// Columns of the `collections` table.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    #[display("id")]
    Id,
    #[display("collection")]
    Collection,
    #[display("name")]
    Name,
    #[display("description")]
    Description,
    #[display("image_url")]
    ImageUrl,
    #[display("owner")]
    Owner,
    #[display("twitter_username")]
    TwitterUsername,
    #[display("contracts")]
    Contracts,
}
impl Column {
    pub const ALL: [Column; 8] = [
        Self::Id,
        Self::Collection,
        Self::Name,
        Self::Description,
        Self::ImageUrl,
        Self::Owner,
        Self::TwitterUsername,
        Self::Contracts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Collection => "collection",
            Self::Name => "name",
            Self::Description => "description",
            Self::ImageUrl => "image_url",
            Self::Owner => "owner",
            Self::TwitterUsername => "twitter_username",
            Self::Contracts => "contracts",
        }
    }

    /// Parse a raw string into a value of this column's type.
    pub fn value(&self, raw: &str) -> Result<Value> {
        match self {
            Self::Id => raw
                .trim()
                .parse::<i64>()
                .ok()
                .map(Value::Integer)
                .ok_or_raise(|| ErrorKind::InvalidData(format!("id must be an integer, found `{raw}`"))),
            _ => Ok(Value::Text(raw.to_string())),
        }
    }
}
impl FromStr for Column {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_raise(|| ErrorKind::InvalidData(format!("unknown column `{s}`")))
    }
}

/// A bound parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Integer(i) => builder.push_bind(*i),
        Value::Text(s) => builder.push_bind(s.clone()),
    };
}

/// Equality conditions, combined with `AND`. Empty matches every row.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Filter {
    pub conditions: Vec<(Column, Value)>,
}
impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.conditions.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// A read against the table: equality, substring and membership predicates
/// (all `AND`-combined), an optional ascending sort and a row limit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    pub filter: Filter,
    /// Case-sensitive substring match on both sides.
    pub like: Vec<(Column, String)>,
    /// Membership test; an empty set matches nothing.
    pub any_of: Vec<(Column, Vec<Value>)>,
    pub order_by: Option<Column>,
    pub limit: Option<u32>,
}
impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.filter = self.filter.eq(column, value);
        self
    }

    pub fn like(mut self, column: Column, substring: impl Into<String>) -> Self {
        self.like.push((column, substring.into()));
        self
    }

    pub fn any_of<V: Into<Value>>(mut self, column: Column, values: impl IntoIterator<Item = V>) -> Self {
        self.any_of.push((column, values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn order_by(mut self, column: Column) -> Self {
        self.order_by = Some(column);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Appends a `WHERE` clause for every predicate (if there are any).
pub(crate) fn push_where(builder: &mut QueryBuilder<'_, Sqlite>, filter: &Filter, query: Option<&Query>) {
    let mut keyword = " WHERE ";
    for (column, value) in &filter.conditions {
        builder.push(keyword).push(column.as_str()).push(" = ");
        push_value(builder, value);
        keyword = " AND ";
    }
    let Some(query) = query else {
        return;
    };
    for (column, substring) in &query.like {
        builder.push(keyword).push(column.as_str()).push(" LIKE ");
        builder.push_bind(format!("%{substring}%"));
        keyword = " AND ";
    }
    for (column, values) in &query.any_of {
        builder.push(keyword);
        keyword = " AND ";
        if values.is_empty() {
            builder.push("0");
            continue;
        }
        builder.push(column.as_str()).push(" IN (");
        let mut separated = builder.separated(", ");
        for value in values {
            match value {
                Value::Integer(i) => separated.push_bind(*i),
                Value::Text(s) => separated.push_bind(s.clone()),
            };
        }
        separated.push_unseparated(")");
    }
}

/// Appends `ORDER BY` and `LIMIT`.
pub(crate) fn push_tail(builder: &mut QueryBuilder<'_, Sqlite>, query: &Query) {
    if let Some(column) = query.order_by {
        builder.push(" ORDER BY ").push(column.as_str()).push(" ASC");
    }
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }
}
