//! Raw CSV datasets and their typed, per-measure form.

use crate::data::schema::{ColumnMap, Measure, parse_measure, parse_year, resolve_columns};
use crate::foundation::core::RecordKey;
use crate::foundation::error::{StoryError, StoryResult};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Malformed cells listed in a parse error before the rest are summarized.
const MAX_REPORTED_PROBLEMS: usize = 8;

/// Raw tabular data as loaded from a delimited text source.
///
/// Cells are kept as untyped strings; typing happens in [`MeasureTable::from_dataset`].
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one dataset row, addressable by column name.
#[derive(Clone, Copy, Debug)]
pub struct RawRow<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> RawRow<'a> {
    /// Cell under `column`, if that column exists.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.cells.get(idx).map(String::as_str)
    }

    /// Iterate `(column, cell)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }
}

impl Dataset {
    /// Build a dataset from in-memory rows. Every row must have one cell per header.
    pub fn from_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> StoryResult<Self> {
        let name = name.into();
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != headers.len())
        {
            return Err(StoryError::parse(format!(
                "dataset '{name}': row {} has {} cells, expected {}",
                i + 1,
                row.len(),
                headers.len()
            )));
        }
        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    /// Read comma-delimited text with a header row. Only header names are trimmed; cells are kept
    /// verbatim so country names compare exactly.
    pub fn from_reader<R: Read>(name: impl Into<String>, r: R) -> StoryResult<Self> {
        let name = name.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(r);

        let headers = reader
            .headers()
            .map_err(|e| StoryError::load(format!("dataset '{name}': read header row: {e}")))?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| StoryError::load(format!("dataset '{name}': {e}")))?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        tracing::debug!(dataset = %name, rows = rows.len(), "read dataset");
        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    /// Open and read a CSV file. The file name becomes the dataset name.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| StoryError::load(format!("open dataset '{}': {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_reader(name, BufReader::new(f))
    }

    /// Dataset name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return `true` when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `i`, if present.
    pub fn row(&self, i: usize) -> Option<RawRow<'_>> {
        self.rows.get(i).map(|cells| RawRow {
            headers: &self.headers,
            cells,
        })
    }

    /// Iterate rows in source order.
    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(|cells| RawRow {
            headers: &self.headers,
            cells,
        })
    }
}

/// One typed row: a key plus an optional measure value.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasureRecord {
    /// Country or entity name.
    pub country: String,
    /// Year.
    pub year: i32,
    /// Measure value; `None` when the source cell was empty.
    pub value: Option<f64>,
}

impl MeasureRecord {
    /// Create a record with a present value.
    pub fn new(country: impl Into<String>, year: i32, value: f64) -> Self {
        Self {
            country: country.into(),
            year,
            value: Some(value),
        }
    }

    /// Join key of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.country.clone(), self.year)
    }
}

/// A dataset validated and parsed for a single [`Measure`].
#[derive(Clone, Debug, PartialEq)]
pub struct MeasureTable {
    measure: Measure,
    name: String,
    records: Vec<MeasureRecord>,
}

impl MeasureTable {
    /// Wrap already-typed records.
    pub fn from_records(measure: Measure, records: Vec<MeasureRecord>) -> Self {
        Self {
            measure,
            name: measure.column().to_owned(),
            records,
        }
    }

    /// Validate every row of `ds`, then parse it.
    ///
    /// All malformed cells are collected before failing, so one error lists every problem (up to
    /// a cap). Empty measure cells are kept as absent values; empty or non-integral years are
    /// errors.
    #[tracing::instrument(skip(ds, columns), fields(dataset = ds.name()))]
    pub fn from_dataset(ds: &Dataset, measure: Measure, columns: &ColumnMap) -> StoryResult<Self> {
        let idx = resolve_columns(ds.headers(), measure, columns)
            .map_err(|e| StoryError::parse(format!("dataset '{}': {e}", ds.name())))?;
        let value_header = ds.headers()[idx.value].as_str();

        let mut problems = Vec::new();
        let mut problem_count = 0usize;
        let mut report = |line: usize, msg: String| {
            problem_count += 1;
            if problems.len() < MAX_REPORTED_PROBLEMS {
                problems.push(format!("line {line}: {msg}"));
            }
        };

        let mut records = Vec::with_capacity(ds.len());
        for (i, cells) in ds.rows.iter().enumerate() {
            // Header is line 1.
            let line = i + 2;
            let country = cells[idx.country].as_str();
            let year_cell = cells[idx.year].as_str();
            let value_cell = cells[idx.value].as_str();

            if country.trim().is_empty() {
                report(line, "empty country".to_owned());
            }
            let year = parse_year(year_cell);
            if year.is_none() {
                report(line, format!("Year {year_cell:?} is not an integer"));
            }
            let value = parse_measure(value_cell);
            if value.is_err() {
                report(
                    line,
                    format!("{value_header} {value_cell:?} is not a finite number"),
                );
            }

            if let (Some(year), Ok(value)) = (year, value) {
                records.push(MeasureRecord {
                    country: country.to_owned(),
                    year,
                    value,
                });
            }
        }

        if problem_count > 0 {
            let more = problem_count.saturating_sub(problems.len());
            let mut msg = format!(
                "dataset '{}': {problem_count} malformed cell(s): {}",
                ds.name(),
                problems.join("; ")
            );
            if more > 0 {
                msg.push_str(&format!("; and {more} more"));
            }
            return Err(StoryError::parse(msg));
        }

        tracing::debug!(%measure, records = records.len(), "parsed measure table");
        Ok(Self {
            measure,
            name: ds.name().to_owned(),
            records,
        })
    }

    /// Measure carried by every record.
    pub fn measure(&self) -> Measure {
        self.measure
    }

    /// Source name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records in source order.
    pub fn records(&self) -> &[MeasureRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` when the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest year that has at least one present value.
    pub fn latest_year(&self) -> Option<i32> {
        self.records
            .iter()
            .filter(|r| r.value.is_some())
            .map(|r| r.year)
            .max()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/dataset.rs"]
mod tests;
