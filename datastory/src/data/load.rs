//! Parallel loading of every configured source into one immutable [`StoryData`].

use crate::data::dataset::{Dataset, MeasureTable};
use crate::data::join::{JoinedRecord, join};
use crate::data::schema::{ColumnMap, Measure};
use crate::foundation::error::{StoryError, StoryResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One tabular input: which measure it carries and where to read it from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    /// Measure carried by the value column.
    pub measure: Measure,
    /// CSV path, relative to the story's base directory unless absolute.
    pub path: PathBuf,
    /// Header overrides for non-standard files.
    #[serde(default)]
    pub columns: ColumnMap,
}

impl DataSource {
    /// Source with default column resolution.
    pub fn new(measure: Measure, path: impl Into<PathBuf>) -> Self {
        Self {
            measure,
            path: path.into(),
            columns: ColumnMap::default(),
        }
    }

    fn load(&self, base_dir: &Path) -> StoryResult<MeasureTable> {
        let path = if self.path.is_absolute() {
            self.path.clone()
        } else {
            base_dir.join(&self.path)
        };
        let ds = Dataset::from_path(&path)?;
        MeasureTable::from_dataset(&ds, self.measure, &self.columns)
    }
}

/// Parsed tables plus the joined view derived from them.
///
/// Built once at startup and immutable afterwards.
#[derive(Clone, Debug)]
pub struct StoryData {
    tables: BTreeMap<Measure, MeasureTable>,
    primary: Measure,
    joined: Vec<JoinedRecord>,
}

impl StoryData {
    /// Join every table onto `primary`. Secondaries join in canonical measure order.
    pub fn new(tables: Vec<MeasureTable>, primary: Measure) -> StoryResult<Self> {
        let mut by_measure = BTreeMap::new();
        for t in tables {
            let measure = t.measure();
            if by_measure.insert(measure, t).is_some() {
                return Err(StoryError::validation(format!(
                    "more than one dataset provides {measure}"
                )));
            }
        }
        let primary_table = by_measure.get(&primary).ok_or_else(|| {
            StoryError::validation(format!("primary measure {primary} has no dataset"))
        })?;
        let secondaries: Vec<&MeasureTable> = by_measure
            .values()
            .filter(|t| t.measure() != primary)
            .collect();
        let joined = join(primary_table, &secondaries)?;

        Ok(Self {
            tables: by_measure,
            primary,
            joined,
        })
    }

    /// Table for `measure`, if it was loaded.
    pub fn table(&self, measure: Measure) -> Option<&MeasureTable> {
        self.tables.get(&measure)
    }

    /// Table for `measure`, or a render error naming it.
    pub fn require_table(&self, measure: Measure) -> StoryResult<&MeasureTable> {
        self.table(measure)
            .ok_or_else(|| StoryError::render(format!("no dataset loaded for {measure}")))
    }

    /// Measures with a loaded table.
    pub fn measures(&self) -> impl Iterator<Item = Measure> + '_ {
        self.tables.keys().copied()
    }

    /// Measure that drives the join.
    pub fn primary(&self) -> Measure {
        self.primary
    }

    /// One record per primary row, in primary order.
    pub fn joined(&self) -> &[JoinedRecord] {
        &self.joined
    }
}

/// Read and parse every source concurrently, then join.
///
/// All sources are always awaited. If any of them fails the whole load fails; the first failure
/// in source order is returned and every failure is logged.
#[tracing::instrument(skip(sources), fields(sources = sources.len()))]
pub fn load_sources(
    sources: &[DataSource],
    base_dir: &Path,
    primary: Measure,
) -> StoryResult<StoryData> {
    if sources.is_empty() {
        return Err(StoryError::validation("no data sources configured"));
    }

    let results: Vec<StoryResult<MeasureTable>> =
        sources.par_iter().map(|s| s.load(base_dir)).collect();

    let mut tables = Vec::with_capacity(results.len());
    let mut first_err = None;
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(t) => tables.push(t),
            Err(e) => {
                tracing::error!(path = %source.path.display(), error = %e, "dataset failed to load");
                first_err.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_err {
        return Err(e);
    }

    let data = StoryData::new(tables, primary)?;
    tracing::info!(
        tables = data.tables.len(),
        joined = data.joined.len(),
        "story data ready"
    );
    Ok(data)
}

#[cfg(test)]
#[path = "../../tests/unit/data/load.rs"]
mod tests;
