//! Record trait, index values and query filters

use std::collections::HashMap;

use rusqlite::types::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A value stored in a secondary index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl IndexValue {
    pub(crate) fn to_sql(&self) -> Value {
        match self {
            Self::String(s) => Value::Text(s.clone()),
            Self::Int(i) => Value::Integer(*i),
            Self::Bool(b) => Value::Integer(i64::from(*b)),
        }
    }
}

impl From<&str> for IndexValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for IndexValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for IndexValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Anything that can be persisted in a [`Store`](crate::Store)
///
/// `collection_name` picks the JSONL file and the SQLite partition;
/// `indexed_fields` are the fields [`Filter`]s can match on.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;

    fn updated_at(&self) -> i64;

    fn collection_name() -> &'static str;

    fn indexed_fields(&self) -> HashMap<String, IndexValue>;
}

/// Comparison applied by a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring match on string indexes
    Contains,
}

impl FilterOp {
    pub(crate) fn sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Contains => "LIKE",
        }
    }
}

/// A single condition on an indexed field
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: IndexValue,
}

impl Filter {
    /// Shorthand for an equality filter
    pub fn eq(field: impl Into<String>, value: impl Into<IndexValue>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }
}
