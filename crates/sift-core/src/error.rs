//! Error types for sift-core and the crates built on it.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for Sift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while keeping a search index in sync with a
/// relational store.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific path (index directory, metadata file, ...).
    #[error("I/O error at {}: {source}", path.display())]
    IoWithPath {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic.
        message: String,
    },

    /// A record type cannot be turned into an index schema.
    #[error("Invalid schema for record type '{record_type}': {message}")]
    Schema {
        /// Record type name.
        record_type: String,
        /// What is wrong with the declaration.
        message: String,
    },

    /// An existing on-disk index was built from a different record type
    /// definition.
    #[error("Index for record type '{record_type}' does not match its definition: {message}")]
    SchemaMismatch {
        /// Record type name.
        record_type: String,
        /// Which part of the definition diverged.
        message: String,
    },

    /// A declared searchable attribute is absent on a record instance at
    /// index-write time.
    #[error("Record of type '{record_type}' does not have searchable field '{field}'")]
    MissingSearchableField {
        /// Record type name.
        record_type: String,
        /// The missing attribute.
        field: String,
    },

    /// A relational row was returned for a primary key that the current rank
    /// map does not know about.
    #[error(
        "Row with primary key '{primary_key}' of type '{record_type}' is not part of the search ranking"
    )]
    RankingConsistency {
        /// Record type name.
        record_type: String,
        /// Primary key of the unranked row.
        primary_key: String,
    },

    /// A search restricted to a field the index does not have.
    #[error("Record type '{record_type}' has no searchable field '{field}'")]
    UnknownSearchField {
        /// Record type name.
        record_type: String,
        /// Requested field name.
        field: String,
    },

    /// Search engine failure (open, create, write, commit, read).
    #[error("Index error: {message}")]
    Index {
        /// Human-readable description including the engine error.
        message: String,
    },

    /// Failure reported by the relational store.
    #[error("Store error: {message}")]
    Store {
        /// Human-readable description.
        message: String,
    },
}

impl Error {
    /// Creates an I/O error carrying the path that failed.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a schema derivation error.
    pub fn schema<T, M>(record_type: T, message: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Error::Schema {
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Creates a schema mismatch error for an existing index.
    pub fn schema_mismatch<T, M>(record_type: T, message: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Error::SchemaMismatch {
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Creates a missing searchable field error.
    pub fn missing_field<T, F>(record_type: T, field: F) -> Self
    where
        T: Into<String>,
        F: Into<String>,
    {
        Error::MissingSearchableField {
            record_type: record_type.into(),
            field: field.into(),
        }
    }

    /// Creates a ranking consistency error.
    pub fn ranking<T, K>(record_type: T, primary_key: K) -> Self
    where
        T: Into<String>,
        K: Into<String>,
    {
        Error::RankingConsistency {
            record_type: record_type.into(),
            primary_key: primary_key.into(),
        }
    }

    /// Creates a search engine error.
    pub fn index<S: Into<String>>(message: S) -> Self {
        Error::Index {
            message: message.into(),
        }
    }

    /// Creates a relational store error.
    pub fn store<S: Into<String>>(message: S) -> Self {
        Error::Store {
            message: message.into(),
        }
    }

    /// Returns whether this error means the index and the relational store
    /// disagree about the data they hold.
    pub fn is_consistency_fault(&self) -> bool {
        matches!(
            self,
            Error::RankingConsistency { .. }
                | Error::MissingSearchableField { .. }
                | Error::SchemaMismatch { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = Error::missing_field("Article", "summary");
        assert_eq!(
            err.to_string(),
            "Record of type 'Article' does not have searchable field 'summary'"
        );
        assert!(err.is_consistency_fault());
    }

    #[test]
    fn test_ranking_display() {
        let err = Error::ranking("Article", "42");
        assert!(err.to_string().contains("'42'"));
        assert!(err.to_string().contains("'Article'"));
        assert!(err.is_consistency_fault());
    }

    #[test]
    fn test_io_with_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(io, "/tmp/search_index/Article");
        let Error::IoWithPath { path, .. } = &err else {
            unreachable!("Expected IoWithPath error variant");
        };
        assert_eq!(path, Path::new("/tmp/search_index/Article"));
        assert!(err.to_string().contains("/tmp/search_index/Article"));
        assert!(!err.is_consistency_fault());
    }

    #[test]
    fn test_schema_error() {
        let err = Error::schema("Article", "no primary key column");
        assert_eq!(
            err.to_string(),
            "Invalid schema for record type 'Article': no primary key column"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("writer memory below minimum");
        assert_eq!(
            err.to_string(),
            "Configuration error: writer memory below minimum"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: Error = serde_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
