//! Transform stage: normalize labels and clean the GDP column.

use crate::config::GDP_COLUMN;
use crate::dataset::{Dataset, Value};
use crate::error::{EtlError, Result};
use crate::progress::ProgressSink;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Substrings that mark the GDP-bearing column. Matched case-sensitively.
const GDP_MARKERS: &[&str] = &["GDP", "Nominal"];

/// Normalize labels, clean the GDP column, rename it to
/// [`GDP_COLUMN`], and drop duplicate-named columns.
///
/// Columns sharing the GDP column's label are renamed with it, so the
/// deduplication removes them and keeps the cleaned column.
pub fn transform(mut dataset: Dataset, sink: &dyn ProgressSink) -> Result<Dataset> {
    sink.progress("Starting transform step");

    dataset.rename_all(normalize_column_name);

    let names = dataset.column_names();
    let index = find_gdp_column(&names).ok_or_else(|| EtlError::Schema {
        columns: names.clone(),
    })?;
    tracing::debug!("GDP column detected: {:?}", names[index]);

    let cleaned = dataset.columns()[index]
        .values
        .iter()
        .enumerate()
        .map(|(row, value)| clean_gdp_value(row, value))
        .collect::<Result<Vec<_>>>()?;
    dataset.replace_values(index, cleaned)?;

    // Every column sharing the matched label takes the new name; the
    // cleaned column comes first and survives deduplication.
    let matched = &names[index];
    dataset.rename_all(|name| {
        if name == matched {
            GDP_COLUMN.to_string()
        } else {
            name.to_string()
        }
    });

    drop_duplicate_columns(&mut dataset);

    sink.progress("Transform step complete");
    Ok(dataset)
}

/// Trim the label and turn embedded newlines into spaces.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace('\n', " ")
}

/// Index of the first column whose name contains a GDP marker.
pub fn find_gdp_column<S: AsRef<str>>(names: &[S]) -> Option<usize> {
    names.iter().position(|name| {
        let name = name.as_ref();
        GDP_MARKERS.iter().any(|marker| name.contains(marker))
    })
}

/// Reduce one GDP cell to a float, or to a missing value if it holds no
/// number.
///
/// The cell is read as text, `$` and `,` are removed, and the first run of
/// digits with at most one decimal point is parsed. A run that does not
/// parse (a lone `.`) is a [`EtlError::Conversion`] for row `row`.
pub fn clean_gdp_value(row: usize, value: &Value) -> Result<Value> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| {
        Regex::new(r"[0-9]+(?:\.[0-9]*)?|\.[0-9]*").expect("number regex is valid")
    });

    let raw = value.to_text();
    let stripped: String = raw.chars().filter(|c| !matches!(c, '$' | ',')).collect();

    let Some(found) = re.find(&stripped) else {
        return Ok(Value::Null);
    };
    found
        .as_str()
        .parse::<f64>()
        .map(Value::Real)
        .map_err(|_| EtlError::Conversion {
            row,
            raw: found.as_str().to_string(),
        })
}

/// Remove every column whose name repeats an earlier one.
pub fn drop_duplicate_columns(dataset: &mut Dataset) {
    let mut seen = HashSet::new();
    dataset.retain_columns(|_, column| seen.insert(column.name.clone()));
}
