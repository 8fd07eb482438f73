//! Canonical column schema.
//!
//! Source files disagree on naming (`Entity` vs `Country`, `Annual CO₂ emissions` vs `CO2`, ...).
//! Everything downstream of [`crate::data::dataset::MeasureTable`] sees only the canonical names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header aliases for the country key column.
pub const COUNTRY_ALIASES: &[&str] = &["Country", "Entity"];
/// Header aliases for the year key column.
pub const YEAR_ALIASES: &[&str] = &["Year"];

/// A named numeric quantity attached to a `(Country, Year)` key.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Annual CO2 emissions.
    Co2,
    /// Life expectancy at birth, in years.
    LifeExpectancy,
    /// Share of adults with obesity, in percent.
    ObesityRate,
}

impl Measure {
    /// Every measure, in canonical column order.
    pub const ALL: [Measure; 3] = [Measure::Co2, Measure::LifeExpectancy, Measure::ObesityRate];

    /// Canonical column name used in joined output.
    pub fn column(self) -> &'static str {
        match self {
            Measure::Co2 => "CO2",
            Measure::LifeExpectancy => "LifeExpectancy",
            Measure::ObesityRate => "ObesityRate",
        }
    }

    /// Human-readable label for axes and tooltips.
    pub fn label(self) -> &'static str {
        match self {
            Measure::Co2 => "CO2",
            Measure::LifeExpectancy => "Life Expectancy",
            Measure::ObesityRate => "Obesity Rate",
        }
    }

    /// Header spellings accepted for this measure, most canonical first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Measure::Co2 => &[
                "CO2",
                "Emissions",
                "Annual CO₂ emissions",
                "Annual CO2 emissions",
            ],
            Measure::LifeExpectancy => &["LifeExpectancy", "Life expectancy"],
            Measure::ObesityRate => &["ObesityRate", "Obesity rate"],
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Per-source header overrides. Unset fields fall back to the alias tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMap {
    /// Header holding the country/entity name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Header holding the year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Header holding the measure value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Resolved column positions for one dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ColumnIndex {
    pub(crate) country: usize,
    pub(crate) year: usize,
    pub(crate) value: usize,
}

pub(crate) fn normalize_header(h: &str) -> &str {
    h.trim_start_matches('\u{feff}').trim()
}

/// Find the first header equal to `explicit` (when given) or to any alias, in alias order.
pub(crate) fn find_column(
    headers: &[String],
    explicit: Option<&str>,
    aliases: &[&str],
) -> Option<usize> {
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| normalize_header(h) == name.trim())
    };
    match explicit {
        Some(name) => position(name),
        None => aliases.iter().find_map(|&a| position(a)),
    }
}

pub(crate) fn resolve_columns(
    headers: &[String],
    measure: Measure,
    columns: &ColumnMap,
) -> Result<ColumnIndex, String> {
    let lookup = |role: &str, explicit: Option<&String>, aliases: &[&str]| {
        find_column(headers, explicit.map(String::as_str), aliases).ok_or_else(|| {
            let wanted = match explicit {
                Some(e) => format!("\"{e}\""),
                None => aliases
                    .iter()
                    .map(|a| format!("\"{a}\""))
                    .collect::<Vec<_>>()
                    .join(" or "),
            };
            format!("missing {role} column (expected {wanted})")
        })
    };

    Ok(ColumnIndex {
        country: lookup("country", columns.country.as_ref(), COUNTRY_ALIASES)?,
        year: lookup("year", columns.year.as_ref(), YEAR_ALIASES)?,
        value: lookup(measure.column(), columns.value.as_ref(), measure.aliases())?,
    })
}

/// Parse a year cell. Integral floats such as `"2005.0"` are accepted.
pub(crate) fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if let Ok(y) = cell.parse::<i32>() {
        return Some(y);
    }
    let f = cell.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}

/// Parse a measure cell. `Ok(None)` for an empty cell, `Err` for anything non-finite.
pub(crate) fn parse_measure(cell: &str) -> Result<Option<f64>, ()> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/schema.rs"]
mod tests;
