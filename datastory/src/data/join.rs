//! `(Country, Year)` join across measure tables.
//!
//! The primary table drives the output: one [`JoinedRecord`] per primary row, in primary order.
//! Secondary tables are indexed by key once, so a join is linear in the total row count.

use crate::data::dataset::MeasureTable;
use crate::data::schema::Measure;
use crate::foundation::core::RecordKey;
use crate::foundation::error::{StoryError, StoryResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

/// A primary row's key plus one entry per joined measure.
///
/// A measure that was joined but had no matching row (or an empty cell) is stored as `None` and
/// serializes as `null`. A measure that was never joined is not present at all.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedRecord {
    /// Country or entity name.
    pub country: String,
    /// Year.
    pub year: i32,
    measures: BTreeMap<Measure, Option<f64>>,
}

impl JoinedRecord {
    /// Create a record with no measures.
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Self {
            country: country.into(),
            year,
            measures: BTreeMap::new(),
        }
    }

    /// Builder-style setter for one measure column.
    pub fn with_measure(mut self, measure: Measure, value: Option<f64>) -> Self {
        self.measures.insert(measure, value);
        self
    }

    /// Join key.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.country.clone(), self.year)
    }

    /// Value of `measure`, or `None` when missing or never joined.
    pub fn measure(&self, measure: Measure) -> Option<f64> {
        self.measures.get(&measure).copied().flatten()
    }

    /// Return `true` when `measure` was part of the join, matched or not.
    pub fn has_column(&self, measure: Measure) -> bool {
        self.measures.contains_key(&measure)
    }

    /// Joined measure columns in canonical order.
    pub fn measures(&self) -> impl Iterator<Item = (Measure, Option<f64>)> + '_ {
        self.measures.iter().map(|(m, v)| (*m, *v))
    }

    /// Return `true` when every `required` measure has a value.
    pub fn is_complete(&self, required: &[Measure]) -> bool {
        required.iter().all(|m| self.measure(*m).is_some())
    }
}

impl Serialize for JoinedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.measures.len()))?;
        map.serialize_entry("Country", &self.country)?;
        map.serialize_entry("Year", &self.year)?;
        for (m, v) in &self.measures {
            map.serialize_entry(m.column(), v)?;
        }
        map.end()
    }
}

struct KeyIndex<'a> {
    values: HashMap<(&'a str, i32), Option<f64>>,
}

impl<'a> KeyIndex<'a> {
    fn build(table: &'a MeasureTable) -> Self {
        let mut values = HashMap::with_capacity(table.len());
        for r in table.records() {
            // First match wins on duplicate keys.
            values
                .entry((r.country.as_str(), r.year))
                .or_insert(r.value);
        }
        Self { values }
    }

    fn lookup(&self, country: &str, year: i32) -> Option<Option<f64>> {
        self.values.get(&(country, year)).copied()
    }
}

/// Join `secondaries` onto `primary` by `(Country, Year)`.
///
/// Output length always equals `primary.len()`; nothing is filtered here. Each secondary measure
/// must be distinct from the primary's and from each other.
#[tracing::instrument(skip_all, fields(primary = %primary.measure(), rows = primary.len()))]
pub fn join(primary: &MeasureTable, secondaries: &[&MeasureTable]) -> StoryResult<Vec<JoinedRecord>> {
    let mut seen = vec![primary.measure()];
    for s in secondaries {
        if seen.contains(&s.measure()) {
            return Err(StoryError::validation(format!(
                "measure {} is joined more than once",
                s.measure()
            )));
        }
        seen.push(s.measure());
    }

    let indexes: Vec<(Measure, KeyIndex<'_>)> = secondaries
        .iter()
        .map(|t| (t.measure(), KeyIndex::build(t)))
        .collect();

    let mut misses = vec![0usize; indexes.len()];
    let out: Vec<JoinedRecord> = primary
        .records()
        .iter()
        .map(|r| {
            let mut rec = JoinedRecord::new(r.country.clone(), r.year)
                .with_measure(primary.measure(), r.value);
            for (i, (measure, index)) in indexes.iter().enumerate() {
                let value = index.lookup(&r.country, r.year).unwrap_or_else(|| {
                    misses[i] += 1;
                    None
                });
                rec = rec.with_measure(*measure, value);
            }
            rec
        })
        .collect();

    for ((measure, _), missed) in indexes.iter().zip(&misses) {
        tracing::debug!(secondary = %measure, missed, "join misses");
    }
    Ok(out)
}

/// Records that carry every `required` measure.
pub fn complete<'a>(
    records: &'a [JoinedRecord],
    required: &'a [Measure],
) -> impl Iterator<Item = &'a JoinedRecord> + 'a {
    records.iter().filter(move |r| r.is_complete(required))
}

/// Drop records missing any `required` measure, in place.
pub fn retain_complete(records: &mut Vec<JoinedRecord>, required: &[Measure]) {
    records.retain(|r| r.is_complete(required));
}

#[cfg(test)]
#[path = "../../tests/unit/data/join.rs"]
mod tests;
