//! Load stage: persist a dataset into a SQLite file.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::config::TABLE_NAME;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::progress::ProgressSink;
use std::path::Path;

/// Write `dataset` to table `country_gdp` in the store at `path`,
/// replacing any previous contents.
pub fn load(dataset: &Dataset, path: &Path, sink: &dyn ProgressSink) -> Result<usize> {
    load_table(dataset, path, TABLE_NAME, sink)
}

/// Write `dataset` to `table` in the store at `path`, replacing any
/// previous contents. Returns the number of rows written.
///
/// The connection is closed before returning, on success and on failure.
pub fn load_table(
    dataset: &Dataset,
    path: &Path,
    table: &str,
    sink: &dyn ProgressSink,
) -> Result<usize> {
    sink.progress(&format!("Loading data into {}", path.display()));

    let mut store = SqliteStore::open(path)?;
    let written = store.replace_table(table, dataset)?;
    store.close()?;

    sink.progress("Load complete");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};
    use crate::error::EtlError;
    use crate::progress::RecordingProgress;

    fn gdp_dataset(values: &[Option<f64>]) -> Dataset {
        let names = (0..values.len())
            .map(|i| Value::Text(format!("C{i}")))
            .collect();
        let gdp = values
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Real))
            .collect();
        Dataset::new(vec![
            Column::new("Country", names),
            Column::new("GDP_USD_2024", gdp),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdp_data.db");
        let ds = gdp_dataset(&[Some(29_184.9), None, Some(0.25)]);
        let sink = RecordingProgress::new();

        assert_eq!(load(&ds, &path, &sink).unwrap(), 3);

        let back = SqliteStore::open(&path)
            .unwrap()
            .read_table("country_gdp")
            .unwrap();
        assert_eq!(back.row_count(), 3);
        assert_eq!(back.column_names(), vec!["Country", "GDP_USD_2024"]);
        assert_eq!(back, ds);
        assert_eq!(
            sink.messages(),
            vec![
                format!("Loading data into {}", path.display()),
                "Load complete".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_twice_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdp_data.db");
        let sink = RecordingProgress::new();

        load(&gdp_dataset(&[Some(1.0), Some(2.0), Some(3.0)]), &path, &sink).unwrap();
        load(&gdp_dataset(&[Some(4.0)]), &path, &sink).unwrap();

        let back = SqliteStore::open(&path)
            .unwrap()
            .read_table("country_gdp")
            .unwrap();
        assert_eq!(back.row_count(), 1);
        assert_eq!(back.columns()[1].values, vec![Value::Real(4.0)]);
    }

    #[test]
    fn test_load_failure_skips_completion_message() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let sink = RecordingProgress::new();

        let err = load(&gdp_dataset(&[Some(1.0)]), &blocker.join("gdp.db"), &sink).unwrap_err();
        assert!(matches!(err, EtlError::Storage { .. }));
        assert_eq!(sink.messages().len(), 1);
    }
}
