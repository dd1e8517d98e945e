//! Index metadata stored next to each on-disk index.
//!
//! Every index directory carries a small JSON file describing the record
//! type the index was built from: primary-key field, analyzed-text fields,
//! schema version, and creation time. It is written when the index is
//! created and checked on every open, so an index built from an older record
//! type definition is reported instead of being silently queried with the
//! wrong fields.
//!
//! The metadata is also enough to reopen an index without the application's
//! record type at hand, which is what the CLI does.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sift_core::{ColumnType, Error, RecordType, Result};

use crate::schema::{IndexSchema, SCHEMA_VERSION};

/// Metadata filename stored in the index directory.
pub const METADATA_FILE: &str = "sift-index.json";

/// Description of the record type an index was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Record type name.
    pub record_type: String,

    /// Identifier (primary-key) field name.
    pub primary_key: String,

    /// Analyzed-text field names in schema order.
    pub text_fields: Vec<String>,

    /// Schema version used for this index.
    pub schema_version: u32,

    /// Creation timestamp (ISO 8601 format).
    pub created_at: String,
}

impl IndexMetadata {
    /// Describe a freshly derived schema.
    pub fn from_schema(schema: &IndexSchema) -> Self {
        Self {
            record_type: schema.record_type().to_string(),
            primary_key: schema.primary_key().to_string(),
            text_fields: schema.text_field_names(),
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Load metadata from the index directory.
    ///
    /// Returns `Ok(None)` if the metadata file doesn't exist.
    /// Returns `Err` if the file exists but cannot be parsed.
    pub fn load(index_path: &Path) -> Result<Option<Self>> {
        let metadata_path = index_path.join(METADATA_FILE);

        if !metadata_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&metadata_path)
            .map_err(|e| Error::io_with_path(e, &metadata_path))?;

        let metadata: Self = serde_json::from_str(&content)?;

        Ok(Some(metadata))
    }

    /// Save metadata to the index directory.
    pub fn save(&self, index_path: &Path) -> Result<()> {
        // Ensure directory exists
        if !index_path.exists() {
            std::fs::create_dir_all(index_path).map_err(|e| Error::io_with_path(e, index_path))?;
        }

        let metadata_path = index_path.join(METADATA_FILE);
        let content = serde_json::to_string_pretty(self)?;

        std::fs::write(&metadata_path, content)
            .map_err(|e| Error::io_with_path(e, &metadata_path))?;

        Ok(())
    }

    /// Check that an existing index matches a freshly derived schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the record type, primary key,
    /// text fields, or schema version differ.
    pub fn validate(&self, schema: &IndexSchema) -> Result<()> {
        let name = schema.record_type();

        if self.schema_version != SCHEMA_VERSION {
            return Err(Error::schema_mismatch(
                name,
                format!(
                    "schema version {} on disk, {SCHEMA_VERSION} expected",
                    self.schema_version
                ),
            ));
        }
        if self.record_type != name {
            return Err(Error::schema_mismatch(
                name,
                format!("index was built for record type '{}'", self.record_type),
            ));
        }
        if self.primary_key != schema.primary_key() {
            return Err(Error::schema_mismatch(
                name,
                format!(
                    "primary key '{}' on disk, '{}' declared",
                    self.primary_key,
                    schema.primary_key()
                ),
            ));
        }
        let declared = schema.text_field_names();
        if self.text_fields != declared {
            return Err(Error::schema_mismatch(
                name,
                format!(
                    "text fields {:?} on disk, {:?} declared",
                    self.text_fields, declared
                ),
            ));
        }

        Ok(())
    }

    /// Rebuild a record type equivalent to the one the index was built from.
    ///
    /// Column types are not recorded; the primary key comes back as a string
    /// column and every text field as a searchable text column, which derives
    /// the same index schema.
    pub fn record_type_definition(&self) -> RecordType {
        let mut builder =
            RecordType::builder(&self.record_type).primary_key(&self.primary_key, ColumnType::String);
        for field in &self.text_fields {
            builder = builder.column(field, ColumnType::Text);
        }
        builder.searchable(self.text_fields.iter().cloned()).build()
    }

    /// Get the creation timestamp as a DateTime.
    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::NonTextualPolicy;

    fn article_schema() -> IndexSchema {
        let rt = RecordType::builder("Article")
            .primary_key("id", ColumnType::Integer)
            .column("title", ColumnType::String)
            .column("body", ColumnType::Text)
            .searchable(["title", "body"])
            .build();
        IndexSchema::derive(&rt, NonTextualPolicy::Skip).unwrap()
    }

    #[test]
    fn test_from_schema() {
        let meta = IndexMetadata::from_schema(&article_schema());
        assert_eq!(meta.record_type, "Article");
        assert_eq!(meta.primary_key, "id");
        assert_eq!(meta.text_fields, ["title", "body"]);
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert!(meta.created_at_datetime().is_some());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let meta = IndexMetadata::from_schema(&article_schema());
        meta.save(dir.path()).unwrap();

        let loaded = IndexMetadata::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IndexMetadata::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE), "{not json").unwrap();
        assert!(matches!(
            IndexMetadata::load(dir.path()),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_validate_matches() {
        let schema = article_schema();
        let meta = IndexMetadata::from_schema(&schema);
        assert!(meta.validate(&schema).is_ok());
    }

    #[test]
    fn test_validate_field_change() {
        let schema = article_schema();
        let mut meta = IndexMetadata::from_schema(&schema);
        meta.text_fields = vec!["title".to_string()];

        let err = meta.validate(&schema).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_validate_version_change() {
        let schema = article_schema();
        let mut meta = IndexMetadata::from_schema(&schema);
        meta.schema_version = SCHEMA_VERSION + 1;
        assert!(meta.validate(&schema).is_err());
    }

    #[test]
    fn test_record_type_definition_derives_same_schema() {
        let schema = article_schema();
        let meta = IndexMetadata::from_schema(&schema);

        let rebuilt = meta.record_type_definition();
        let rebuilt_schema = IndexSchema::derive(&rebuilt, NonTextualPolicy::Reject).unwrap();
        assert!(meta.validate(&rebuilt_schema).is_ok());
    }
}
