//! In-memory tabular dataset: ordered named columns of row-aligned values.
//!
//! Every column of a [`Dataset`] has the same length. The mutating methods
//! preserve that, so the row count read by the loader is always the row
//! count produced by the extractor.

use std::fmt;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value, distinct from zero and from the empty string.
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Coerce the cell to text the way a dataframe `astype(str)` does.
    ///
    /// Missing values become `"nan"` and floats always keep a fractional
    /// part (`1234.0`), so a numeric cell survives a text round trip.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "nan".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => format!("{f:?}"),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Storage class of a column, derived from its non-missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

impl ColumnKind {
    /// Infer the kind of a column from its values.
    ///
    /// An all-missing column is `Real`, like an all-NaN float column.
    pub fn infer(values: &[Value]) -> Self {
        let mut kind = ColumnKind::Integer;
        let mut seen = false;
        for value in values {
            match value {
                Value::Null => continue,
                Value::Integer(_) => {}
                Value::Real(_) => kind = ColumnKind::Real,
                Value::Text(_) => return ColumnKind::Text,
            }
            seen = true;
        }
        if seen {
            kind
        } else {
            ColumnKind::Real
        }
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        ColumnKind::infer(&self.values)
    }
}

/// A column whose length disagrees with the dataset's row count.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column {column:?} has {found} values, dataset has {expected} rows")]
pub struct ShapeError {
    pub column: String,
    pub expected: usize,
    pub found: usize,
}

/// Ordered named columns with a common row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, checking that all columns have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, ShapeError> {
        let mut dataset = Self::default();
        for column in columns {
            dataset.push_column(column)?;
        }
        Ok(dataset)
    }

    pub fn push_column(&mut self, column: Column) -> Result<(), ShapeError> {
        if let Some(first) = self.columns.first() {
            if first.values.len() != column.values.len() {
                return Err(ShapeError {
                    column: column.name,
                    expected: first.values.len(),
                    found: column.values.len(),
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// First column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of row `index`, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.columns.iter().map(move |c| &c.values[index])
    }

    /// Rewrite every column name with `f`.
    pub fn rename_all(&mut self, mut f: impl FnMut(&str) -> String) {
        for column in &mut self.columns {
            column.name = f(&column.name);
        }
    }

    /// Swap in new values for the column at `index`.
    pub fn replace_values(&mut self, index: usize, values: Vec<Value>) -> Result<(), ShapeError> {
        let expected = self.row_count();
        let Some(column) = self.columns.get_mut(index) else {
            return Ok(());
        };
        if values.len() != expected {
            return Err(ShapeError {
                column: column.name.clone(),
                expected,
                found: values.len(),
            });
        }
        column.values = values;
        Ok(())
    }

    /// Keep only the columns for which `keep` returns true, in order.
    pub fn retain_columns(&mut self, mut keep: impl FnMut(usize, &Column) -> bool) {
        let mut index = 0;
        self.columns.retain(|c| {
            let kept = keep(index, c);
            index += 1;
            kept
        });
    }
}
