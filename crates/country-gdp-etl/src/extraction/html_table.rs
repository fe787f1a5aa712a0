//! Convert the first `<table>` of an HTML document into a [`Dataset`].
//!
//! Follows the behaviour of a dataframe HTML reader closely enough for
//! well-formed data tables:
//!
//! 1. Header rows come from `<thead>`, or else from leading rows made only
//!    of `<th>` cells. Without either, columns are numbered `0..n`.
//! 2. `colspan`/`rowspan` repeat a cell's text over every position it covers.
//! 3. Common NA markers (`N/A`, `NaN`, empty cell, ...) become missing values.
//! 4. A column whose cells all parse as numbers (thousands separators
//!    ignored) becomes numeric; otherwise it keeps its text.

use crate::dataset::{Column, Dataset, Value};
use crate::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Cell texts read as missing values.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Upper bound on a single `colspan`/`rowspan` attribute.
const MAX_SPAN: usize = 1000;

#[derive(Debug, Clone)]
struct RawCell {
    text: Option<String>,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

#[derive(Debug, Default)]
struct RawTable {
    head: Vec<Vec<RawCell>>,
    body: Vec<Vec<RawCell>>,
    foot: Vec<Vec<RawCell>>,
}

/// Parse `html` and convert its first table, in document order.
///
/// Fails with [`EtlError::NotFound`] when the document has no `<table>`.
pub fn parse_first_table(html: &str) -> Result<Dataset> {
    static TABLE: OnceLock<Selector> = OnceLock::new();
    let selector = TABLE.get_or_init(|| Selector::parse("table").expect("table selector is valid"));

    let document = Html::parse_document(html);
    let table = document.select(selector).next().ok_or(EtlError::NotFound)?;
    table_to_dataset(collect_rows(table))
}

fn collect_rows(table: ElementRef<'_>) -> RawTable {
    let mut raw = RawTable::default();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => raw.head.extend(section_rows(child)),
            "tbody" => raw.body.extend(section_rows(child)),
            "tfoot" => raw.foot.extend(section_rows(child)),
            "tr" => raw.body.extend(row_cells(child)),
            _ => {}
        }
    }
    raw
}

fn section_rows(section: ElementRef<'_>) -> Vec<Vec<RawCell>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .filter_map(row_cells)
        .collect()
}

/// Cells of one `<tr>`, or `None` for a row without cells.
fn row_cells(tr: ElementRef<'_>) -> Option<Vec<RawCell>> {
    let cells: Vec<RawCell> = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|el| RawCell {
            text: cell_text(el),
            is_header: el.value().name() == "th",
            colspan: span_attr(el, "colspan"),
            rowspan: span_attr(el, "rowspan"),
        })
        .collect();
    (!cells.is_empty()).then_some(cells)
}

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map_or(1, |n| n.min(MAX_SPAN))
}

/// Text content of a cell with line breaks and whitespace runs collapsed.
fn cell_text(el: ElementRef<'_>) -> Option<String> {
    let raw: String = el.text().collect();
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn table_to_dataset(mut raw: RawTable) -> Result<Dataset> {
    // Without <thead>, leading all-<th> rows are the header.
    if raw.head.is_empty() {
        let header_rows = raw
            .body
            .iter()
            .take_while(|row| row.iter().all(|c| c.is_header))
            .count();
        raw.head = raw.body.drain(..header_rows).collect();
    }
    raw.body.append(&mut raw.foot);

    let header = expand_spans(&raw.head);
    let body = expand_spans(&raw.body);

    let width = header
        .iter()
        .chain(body.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    let labels = mangle_duplicates(header_labels(&header, width));

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(body.len()); width];
    for row in body {
        let mut cells = row.into_iter();
        for column in columns.iter_mut() {
            column.push(cells.next().flatten());
        }
    }

    let columns = labels
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::new(name, infer_values(cells)))
        .collect();
    Ok(Dataset::new(columns)?)
}

/// Lay rows out on a grid, repeating spanned cells.
///
/// A `rowspan` reaching past the last row adds rows made of the carried
/// cells only.
fn expand_spans(rows: &[Vec<RawCell>]) -> Vec<Vec<Option<String>>> {
    // (column, text, rows still to fill) carried down from earlier rowspans.
    let mut carried: Vec<(usize, Option<String>, usize)> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut line: Vec<Option<String>> = Vec::new();
        let mut next_carried = Vec::new();
        let mut pending = std::mem::take(&mut carried).into_iter().peekable();

        for cell in row {
            while let Some((col, text, remaining)) = pending.next_if(|p| p.0 <= line.len()) {
                if col == line.len() {
                    place(&mut line, &mut next_carried, &text, remaining);
                }
            }
            for _ in 0..cell.colspan {
                place(&mut line, &mut next_carried, &cell.text, cell.rowspan);
            }
        }
        place_remaining(&mut line, &mut next_carried, pending);

        next_carried.sort_by_key(|p| p.0);
        carried = next_carried;
        grid.push(line);
    }

    while !carried.is_empty() {
        let mut line = Vec::new();
        let mut next_carried = Vec::new();
        place_remaining(&mut line, &mut next_carried, std::mem::take(&mut carried));
        carried = next_carried;
        grid.push(line);
    }

    grid
}

/// Place carried cells to the right of what `line` already holds,
/// padding gaps with missing values.
fn place_remaining(
    line: &mut Vec<Option<String>>,
    next_carried: &mut Vec<(usize, Option<String>, usize)>,
    pending: impl IntoIterator<Item = (usize, Option<String>, usize)>,
) {
    for (col, text, remaining) in pending {
        if col < line.len() {
            continue;
        }
        line.resize(col, None);
        place(line, next_carried, &text, remaining);
    }
}

fn place(
    line: &mut Vec<Option<String>>,
    carried: &mut Vec<(usize, Option<String>, usize)>,
    text: &Option<String>,
    rowspan: usize,
) {
    if rowspan > 1 {
        carried.push((line.len(), text.clone(), rowspan - 1));
    }
    line.push(text.clone());
}

fn header_labels(header: &[Vec<Option<String>>], width: usize) -> Vec<String> {
    if header.is_empty() {
        return (0..width).map(|i| i.to_string()).collect();
    }

    (0..width)
        .map(|i| {
            let mut parts: Vec<&str> = Vec::new();
            for row in header {
                if let Some(Some(text)) = row.get(i) {
                    if !parts.contains(&text.as_str()) {
                        parts.push(text);
                    }
                }
            }
            if parts.is_empty() {
                format!("Unnamed: {i}")
            } else {
                parts.join(" ")
            }
        })
        .collect()
}

/// Rename repeated labels to `X.1`, `X.2`, ... keeping the first as `X`.
fn mangle_duplicates(labels: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    labels
        .into_iter()
        .map(|label| {
            if seen.insert(label.clone()) {
                return label;
            }
            let mut n = 1;
            loop {
                let candidate = format!("{label}.{n}");
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}

fn infer_values(cells: Vec<Option<String>>) -> Vec<Value> {
    let cells: Vec<Option<String>> = cells
        .into_iter()
        .map(|c| c.filter(|t| !NA_VALUES.contains(&t.as_str())))
        .collect();

    let numeric: Vec<Option<String>> = cells
        .iter()
        .map(|c| c.as_ref().map(|t| t.replace(',', "")))
        .collect();
    let has_missing = cells.iter().any(Option::is_none);

    let ints: Option<Vec<Option<i64>>> = numeric
        .iter()
        .map(|c| match c {
            Some(t) => t.parse::<i64>().ok().map(Some),
            None => Some(None),
        })
        .collect();
    if let Some(ints) = ints {
        // Integers with gaps widen to floats, as in a dataframe.
        return ints
            .into_iter()
            .map(|v| match v {
                Some(i) if has_missing => Value::Real(i as f64),
                Some(i) => Value::Integer(i),
                None => Value::Null,
            })
            .collect();
    }

    let floats: Option<Vec<Option<f64>>> = numeric
        .iter()
        .map(|c| match c {
            Some(t) => t.parse::<f64>().ok().filter(|f| f.is_finite()).map(Some),
            None => Some(None),
        })
        .collect();
    if let Some(floats) = floats {
        return floats
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Real))
            .collect();
    }

    cells
        .into_iter()
        .map(|c| c.map_or(Value::Null, Value::Text))
        .collect()
}
