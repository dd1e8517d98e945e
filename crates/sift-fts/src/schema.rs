//! Index schema derivation from record types.
//!
//! Each record type gets its own Tantivy schema:
//!
//! ## Identifier Field
//! - the primary-key column, `STRING | STORED` (raw token, exact-match
//!   deletes, readable from hits)
//!
//! ## Analyzed-Text Fields
//! - one per searchable column whose declared type is textual, indexed with
//!   the [`ANALYZER_NAME`] analyzer and positions (for phrase queries)
//!
//! Searchable columns that are not textual are skipped with a warning or
//! rejected, depending on [`NonTextualPolicy`].
//!
//! The derived schema doubles as the field accessor table used by the
//! indexer: for every analyzed-text field it records which record attribute
//! feeds it, validated once here instead of on every write.

use sift_core::{Error, RecordType, Result};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, SchemaBuilder, TextFieldIndexing,
    TextOptions,
};

use crate::analyzer::ANALYZER_NAME;
use crate::types::NonTextualPolicy;

/// Schema version recorded in index metadata.
///
/// Increment this when the field layout rules change.
pub const SCHEMA_VERSION: u32 = 1;

/// An analyzed-text field and the record attribute it is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    /// Column (and field) name.
    pub name: String,
    /// Tantivy field handle.
    pub field: Field,
}

/// Search schema derived from one record type.
#[derive(Clone)]
pub struct IndexSchema {
    schema: Schema,
    record_type: String,
    primary_key: String,
    id: Field,
    text_fields: Vec<TextField>,
    searchable: Vec<String>,
}

impl IndexSchema {
    /// Derive the schema for `record_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the record type has no (or several)
    /// primary-key columns, lists a searchable name that is not a column,
    /// declares the primary key itself searchable, or (under
    /// [`NonTextualPolicy::Reject`]) declares a non-textual column
    /// searchable.
    pub fn derive(record_type: &RecordType, policy: NonTextualPolicy) -> Result<Self> {
        let name = record_type.name();

        let mut keys = record_type.columns().iter().filter(|c| c.primary_key);
        let primary = keys
            .next()
            .ok_or_else(|| Error::schema(name, "no primary key column"))?;
        if keys.next().is_some() {
            return Err(Error::schema(name, "composite primary keys are not supported"));
        }

        for searchable in record_type.searchable() {
            if record_type.column(searchable).is_none() {
                return Err(Error::schema(
                    name,
                    format!("searchable attribute '{searchable}' is not a column"),
                ));
            }
            if *searchable == primary.name {
                return Err(Error::schema(
                    name,
                    format!("primary key '{searchable}' cannot also be searchable"),
                ));
            }
        }

        // Text field options with positions (for phrase queries)
        let text_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(ANALYZER_NAME)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );

        let mut builder = SchemaBuilder::new();
        let id = builder.add_text_field(&primary.name, STRING | STORED);

        let mut text_fields = Vec::new();
        for column in record_type.columns() {
            if column.primary_key || !record_type.searchable().contains(&column.name) {
                continue;
            }
            if !column.column_type.is_textual() {
                match policy {
                    NonTextualPolicy::Skip => {
                        log::warn!(
                            "{name}.{} is searchable but {:?} is not textual; not indexed",
                            column.name,
                            column.column_type
                        );
                        continue;
                    }
                    NonTextualPolicy::Reject => {
                        return Err(Error::schema(
                            name,
                            format!(
                                "searchable attribute '{}' has non-textual type {:?}",
                                column.name, column.column_type
                            ),
                        ));
                    }
                }
            }
            let field = builder.add_text_field(&column.name, text_options.clone());
            text_fields.push(TextField {
                name: column.name.clone(),
                field,
            });
        }

        Ok(Self {
            schema: builder.build(),
            record_type: name.to_string(),
            primary_key: primary.name.clone(),
            id,
            text_fields,
            searchable: record_type.searchable().to_vec(),
        })
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Name of the record type this schema was derived from.
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Primary-key field name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// The identifier field.
    pub fn id_field(&self) -> Field {
        self.id
    }

    /// Analyzed-text fields in column order.
    pub fn text_fields(&self) -> &[TextField] {
        &self.text_fields
    }

    /// Names of the analyzed-text fields in column order.
    pub fn text_field_names(&self) -> Vec<String> {
        self.text_fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Every declared searchable attribute, including skipped non-textual
    /// ones. Each must be present on a record for it to be indexed.
    pub fn searchable(&self) -> &[String] {
        &self.searchable
    }

    /// Look up an analyzed-text field by name.
    pub fn text_field(&self, name: &str) -> Option<Field> {
        self.text_fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field)
    }
}

impl std::fmt::Debug for IndexSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSchema")
            .field("record_type", &self.record_type)
            .field("primary_key", &self.primary_key)
            .field("text_fields", &self.text_field_names())
            .field("schema_version", &SCHEMA_VERSION)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
