//! Parametrized chart builders shared by every scene.
//!
//! Scenes differ only in which measure they plot and how; each builder turns loaded data into a
//! [`ChartSpec`] and never touches a surface.

use crate::data::dataset::MeasureTable;
use crate::data::join::{JoinedRecord, complete};
use crate::data::schema::Measure;
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::chart::{
    Axis, BarMark, ChartSpec, LegendEntry, Marks, PointMark, Series, TickFormat,
};
use crate::render::color::Color;
use crate::render::scale::{LinearScale, extent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const NICE_TICKS: usize = 10;
const POINT_RADIUS: f64 = 3.0;
const SIZE_RANGE: (f64, f64) = (5.0, 20.0);
const SIZED_OPACITY: f64 = 0.7;

/// Line chart parameters: one line per country, x = year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineOptions {
    /// Measure on the y axis.
    pub measure: Measure,
    /// Restrict to these countries, keeping data order. `None` plots every country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
}

/// Scatter plot parameters over joined records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScatterOptions {
    /// Measure on the x axis.
    pub x: Measure,
    /// Measure on the y axis.
    pub y: Measure,
    /// Optional measure encoded as dot radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Measure>,
}

/// Bar chart parameters: one bar per country for a single year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarOptions {
    /// Measure on the y axis.
    pub measure: Measure,
    /// Year to plot; defaults to the latest year with data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Keep only the largest `limit` bars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Format a measure value for tooltips: at most two decimals, no trailing zeros.
pub fn format_value(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

/// Tooltip listing every present measure of a joined record.
pub fn tooltip(record: &JoinedRecord) -> String {
    let parts: Vec<String> = record
        .measures()
        .filter_map(|(m, v)| v.map(|v| format!("{}={}", m.label(), format_value(v))))
        .collect();
    format!("{} ({}): {}", record.country, record.year, parts.join(", "))
}

/// One line per country over the years of `table`.
pub fn line_chart(
    table: &MeasureTable,
    title: &str,
    opts: &LineOptions,
    color: Option<Color>,
) -> StoryResult<ChartSpec> {
    let measure = table.measure();
    let mut order: Vec<String> = Vec::new();
    let mut points: HashMap<&str, Vec<(f64, f64)>> = HashMap::new();

    for r in table.records() {
        let Some(v) = r.value else { continue };
        if let Some(only) = &opts.countries {
            if !only.iter().any(|c| c == &r.country) {
                continue;
            }
        }
        let entry = points.entry(r.country.as_str()).or_insert_with(|| {
            order.push(r.country.clone());
            Vec::new()
        });
        entry.push((f64::from(r.year), v));
    }

    if order.is_empty() {
        return Err(StoryError::render(format!(
            "scene '{title}': no {measure} values to plot"
        )));
    }

    let mut series = Vec::with_capacity(order.len());
    for key in order {
        let mut pts = points.remove(key.as_str()).unwrap_or_default();
        pts.sort_by(|a, b| a.0.total_cmp(&b.0));
        series.push(Series {
            color: color.unwrap_or_else(|| Color::for_key(&key)),
            key,
            points: pts,
        });
    }

    let all = || series.iter().flat_map(|s| s.points.iter().copied());
    let x_domain = extent(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = extent(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let y = LinearScale::new((y_min.min(0.0), y_max), (0.0, 1.0)).nice(NICE_TICKS);

    let legend = if series.len() > 1 {
        series
            .iter()
            .map(|s| LegendEntry {
                label: s.key.clone(),
                color: s.color,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(ChartSpec {
        title: title.to_owned(),
        x: Axis {
            label: "Year".to_owned(),
            domain: x_domain,
            format: TickFormat::Integer,
        },
        y: Axis {
            label: measure.label().to_owned(),
            domain: y.domain(),
            format: TickFormat::Auto,
        },
        marks: Marks::Lines(series),
        legend,
    })
}

/// Scatter plot of joined records that carry every measure the plot needs.
pub fn scatter_chart(
    records: &[JoinedRecord],
    title: &str,
    opts: &ScatterOptions,
    color: Option<Color>,
) -> StoryResult<ChartSpec> {
    let mut required = vec![opts.x, opts.y];
    required.extend(opts.size);
    let rows: Vec<&JoinedRecord> = complete(records, &required).collect();
    if rows.is_empty() {
        return Err(StoryError::render(format!(
            "scene '{title}': no records carry {}",
            required
                .iter()
                .map(|m| m.column())
                .collect::<Vec<_>>()
                .join(" and ")
        )));
    }

    // `complete` guarantees these are present.
    let value = |r: &JoinedRecord, m: Measure| r.measure(m).unwrap_or_default();
    let x = LinearScale::new(
        extent(rows.iter().map(|&r| value(r, opts.x))).unwrap_or((0.0, 1.0)),
        (0.0, 1.0),
    )
    .nice(NICE_TICKS);
    let y = LinearScale::new(
        extent(rows.iter().map(|&r| value(r, opts.y))).unwrap_or((0.0, 1.0)),
        (0.0, 1.0),
    )
    .nice(NICE_TICKS);
    let size = opts.size.map(|m| {
        let domain = extent(rows.iter().map(|&r| value(r, m))).unwrap_or((0.0, 1.0));
        (m, LinearScale::new(domain, SIZE_RANGE))
    });

    let color = color.unwrap_or(Color::STEELBLUE);
    let points = rows
        .iter()
        .map(|&r| {
            let (radius, opacity) = match &size {
                Some((m, scale)) => (scale.map(value(r, *m)), SIZED_OPACITY),
                None => (POINT_RADIUS, 1.0),
            };
            PointMark {
                x: value(r, opts.x),
                y: value(r, opts.y),
                radius,
                color,
                opacity,
                tooltip: tooltip(r),
            }
        })
        .collect();

    Ok(ChartSpec {
        title: title.to_owned(),
        x: Axis {
            label: opts.x.label().to_owned(),
            domain: x.domain(),
            format: TickFormat::Auto,
        },
        y: Axis {
            label: opts.y.label().to_owned(),
            domain: y.domain(),
            format: TickFormat::Auto,
        },
        marks: Marks::Points(points),
        legend: Vec::new(),
    })
}

/// Bars for one year of `table`, largest first.
pub fn bar_chart(
    table: &MeasureTable,
    title: &str,
    opts: &BarOptions,
    color: Option<Color>,
) -> StoryResult<ChartSpec> {
    let measure = table.measure();
    let year = opts.year.or_else(|| table.latest_year()).ok_or_else(|| {
        StoryError::render(format!("scene '{title}': no {measure} values to plot"))
    })?;

    let mut seen = HashMap::new();
    for r in table.records().iter().filter(|r| r.year == year) {
        if let Some(v) = r.value {
            seen.entry(r.country.as_str()).or_insert(v);
        }
    }
    let mut rows: Vec<(&str, f64)> = table
        .records()
        .iter()
        .filter_map(|r| seen.remove(r.country.as_str()).map(|v| (r.country.as_str(), v)))
        .collect();
    if rows.is_empty() {
        return Err(StoryError::render(format!(
            "scene '{title}': no {measure} values for {year}"
        )));
    }
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    if let Some(limit) = opts.limit {
        rows.truncate(limit.max(1));
    }

    let (lo, hi) = extent(rows.iter().map(|&r| r.1)).unwrap_or((0.0, 1.0));
    let y = LinearScale::new((lo.min(0.0), hi.max(0.0)), (0.0, 1.0)).nice(NICE_TICKS);

    let bars: Vec<BarMark> = rows
        .into_iter()
        .map(|(country, v)| BarMark {
            label: country.to_owned(),
            value: v,
            color: color.unwrap_or_else(|| Color::for_key(country)),
            tooltip: format!("{country} ({year}): {}={}", measure.label(), format_value(v)),
        })
        .collect();

    Ok(ChartSpec {
        title: title.to_owned(),
        x: Axis {
            label: "Country".to_owned(),
            domain: (0.0, bars.len() as f64),
            format: TickFormat::Integer,
        },
        y: Axis {
            label: format!("{} ({year})", measure.label()),
            domain: y.domain(),
            format: TickFormat::Auto,
        },
        marks: Marks::Bars(bars),
        legend: Vec::new(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/build.rs"]
mod tests;
