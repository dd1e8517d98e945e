//! Record types, attribute values, and committed changes.
//!
//! A [`RecordType`] describes one relational entity: its columns, which
//! column is the primary key, and which columns are declared searchable.
//! Record instances implement [`Record`] so the index writer can read their
//! attributes, and every relational commit is reported as an ordered list of
//! [`Change`]s.
//!
//! # Example
//!
//! ```
//! use sift_core::{ColumnType, RecordType};
//!
//! let article = RecordType::builder("Article")
//!     .primary_key("id", ColumnType::Integer)
//!     .column("title", ColumnType::String)
//!     .column("body", ColumnType::Text)
//!     .searchable(["title", "body"])
//!     .build();
//!
//! assert_eq!(article.primary_key().map(|c| c.name.as_str()), Some("id"));
//! assert!(article.is_searchable());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Declared type of a relational column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Integer column.
    Integer,
    /// Floating point column.
    Float,
    /// Boolean column.
    Boolean,
    /// Bounded string (`VARCHAR`).
    String,
    /// Unbounded text (`TEXT`).
    Text,
    /// Unicode string (`NVARCHAR`).
    Unicode,
    /// Date/time column.
    DateTime,
    /// Binary blob.
    Binary,
}

impl ColumnType {
    /// Whether values of this type can be analyzed as full text.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::Text | Self::Unicode)
    }
}

/// A column of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, also the attribute name on record instances.
    pub name: String,
    /// Declared column type.
    pub column_type: ColumnType,
    /// Whether this column is the primary key.
    pub primary_key: bool,
}

/// Description of a relational entity type.
///
/// Defined once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    name: String,
    columns: Vec<Column>,
    searchable: Vec<String>,
}

impl RecordType {
    /// Start building a record type with the given name.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            columns: Vec::new(),
            searchable: Vec::new(),
        }
    }

    /// Type name, the identity of the record type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Names of the columns declared searchable, in declaration order.
    pub fn searchable(&self) -> &[String] {
        &self.searchable
    }

    /// The primary-key column, if one was declared.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether any attribute is declared searchable.
    pub fn is_searchable(&self) -> bool {
        !self.searchable.is_empty()
    }
}

/// Builder for [`RecordType`].
#[derive(Debug, Clone)]
pub struct RecordTypeBuilder {
    name: String,
    columns: Vec<Column>,
    searchable: Vec<String>,
}

impl RecordTypeBuilder {
    /// Add the primary-key column.
    pub fn primary_key(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            column_type,
            primary_key: true,
        });
        self
    }

    /// Add a regular column.
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            column_type,
            primary_key: false,
        });
        self
    }

    /// Declare the searchable attributes.
    pub fn searchable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable = names.into_iter().map(Into::into).collect();
        self
    }

    /// Build the record type.
    pub fn build(self) -> RecordType {
        RecordType {
            name: self.name,
            columns: self.columns,
            searchable: self.searchable,
        }
    }
}

/// A single attribute value read from a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// SQL `NULL`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl FieldValue {
    /// Whether this value is `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Stringification used for index documents and primary-key terms.
///
/// `NULL` renders as the empty string.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A record instance whose attributes can be read by column name.
///
/// `attribute` returns `None` when the instance does not carry the attribute
/// at all (for example a partially loaded row); a present but empty value is
/// `Some(FieldValue::Null)`.
pub trait Record: Send + Sync {
    /// The type this record belongs to.
    fn record_type(&self) -> &RecordType;

    /// Read an attribute by column name.
    fn attribute(&self, name: &str) -> Option<FieldValue>;

    /// Stringified primary-key value, if the record carries one.
    fn primary_key_string(&self) -> Option<String> {
        let column = self.record_type().primary_key()?;
        self.attribute(&column.name).map(|v| v.to_string())
    }
}

/// Kind of relational change observed at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// A new row.
    Insert,
    /// A modified row.
    Update,
    /// A removed row.
    Delete,
}

impl Operation {
    /// Inserts and updates both become document upserts.
    pub fn is_upsert(self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One committed relational change.
#[derive(Clone)]
pub struct Change {
    /// The record as it was at commit time.
    pub record: Arc<dyn Record>,
    /// What happened to it.
    pub operation: Operation,
}

impl Change {
    /// Create a change.
    pub fn new(record: Arc<dyn Record>, operation: Operation) -> Self {
        Self { record, operation }
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("record_type", &self.record.record_type().name())
            .field("primary_key", &self.record.primary_key_string())
            .field("operation", &self.operation)
            .finish()
    }
}

/// A change reduced to what the index writer needs: upsert or delete.
#[derive(Clone)]
pub struct IndexChange {
    /// `true` for insert/update, `false` for delete.
    pub is_upsert: bool,
    /// The affected record.
    pub record: Arc<dyn Record>,
}

impl From<&Change> for IndexChange {
    fn from(change: &Change) -> Self {
        Self {
            is_upsert: change.operation.is_upsert(),
            record: Arc::clone(&change.record),
        }
    }
}

impl fmt::Debug for IndexChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexChange")
            .field("is_upsert", &self.is_upsert)
            .field("primary_key", &self.record.primary_key_string())
            .finish()
    }
}

/// Subscriber to "changes committed" notifications.
///
/// Invoked once per committed transaction with the changes in commit order.
/// An error is surfaced to whoever committed.
pub trait CommitListener: Send + Sync {
    /// Handle one committed transaction.
    fn on_commit(&self, changes: &[Change]) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
