//! Error type shared by every stage of the ETL run.
//!
//! None of these are retried. Each one aborts the run and is reported at
//! the process boundary.

use crate::dataset::ShapeError;
use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Failure of one ETL stage.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// The page could not be fetched (bad URL, connection failure, timeout,
    /// or non-success status).
    #[error("failed to fetch {url}: {reason}")]
    Network {
        url: String,
        reason: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The fetched document contains no `<table>` element.
    #[error("no table found in document")]
    NotFound,

    /// No column name contains "GDP" or "Nominal".
    #[error("GDP column not detected among columns {columns:?}")]
    Schema { columns: Vec<String> },

    /// An extracted numeric substring could not be parsed as a float.
    #[error("cannot convert {raw:?} (row {row}) to a number")]
    Conversion { row: usize, raw: String },

    /// The SQLite store could not be opened, written, or closed.
    #[error("storage failure on {}: {reason}", path.display())]
    Storage {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// A stage produced columns of unequal length.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl EtlError {
    pub(crate) fn network(url: &str, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: source.to_string(),
            source: Some(source),
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        Self::Storage {
            path: path.into(),
            reason: source.to_string(),
            source: Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = EtlError::Schema {
            columns: vec!["Country".to_string(), "Population".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("GDP column not detected"));
        assert!(msg.contains("Population"));
    }

    #[test]
    fn test_conversion_error_message() {
        let err = EtlError::Conversion {
            row: 3,
            raw: ".".to_string(),
        };
        assert_eq!(err.to_string(), "cannot convert \".\" (row 3) to a number");
    }

    #[test]
    fn test_storage_error_carries_path() {
        let err = EtlError::Storage {
            path: PathBuf::from("/nope/gdp.db"),
            reason: "permission denied".to_string(),
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "storage failure on /nope/gdp.db: permission denied"
        );
    }
}
