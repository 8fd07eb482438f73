//! Backend-agnostic chart description handed to a [`crate::render::surface::Surface`].

use crate::render::color::Color;
use serde::{Deserialize, Serialize};

/// How tick labels on an axis are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickFormat {
    /// Whole numbers without grouping (years).
    Integer,
    /// Precision derived from the tick step.
    Auto,
}

/// One chart axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    /// Axis caption.
    pub label: String,
    /// Data domain, already niced when the chart wants round ends.
    pub domain: (f64, f64),
    /// Tick label style.
    pub format: TickFormat,
}

/// A polyline for one entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    /// Entity name; also the legend label.
    pub key: String,
    /// Stroke color.
    pub color: Color,
    /// `(x, y)` data points, in drawing order.
    pub points: Vec<(f64, f64)>,
}

/// A scatter-plot dot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointMark {
    /// X in data space.
    pub x: f64,
    /// Y in data space.
    pub y: f64,
    /// Radius in pixels.
    pub radius: f64,
    /// Fill color.
    pub color: Color,
    /// Fill opacity in `[0, 1]`.
    pub opacity: f64,
    /// Hover text.
    pub tooltip: String,
}

/// One categorical bar.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarMark {
    /// Category label.
    pub label: String,
    /// Bar height in data space.
    pub value: f64,
    /// Fill color.
    pub color: Color,
    /// Hover text.
    pub tooltip: String,
}

/// The drawable content of a chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marks {
    /// Line chart over a numeric x axis.
    Lines(Vec<Series>),
    /// Scatter plot.
    Points(Vec<PointMark>),
    /// Bar chart over categories; the x axis domain is ignored.
    Bars(Vec<BarMark>),
}

impl Marks {
    /// Number of drawn marks (series, dots or bars).
    pub fn len(&self) -> usize {
        match self {
            Marks::Lines(s) => s.len(),
            Marks::Points(p) => p.len(),
            Marks::Bars(b) => b.len(),
        }
    }

    /// Return `true` when nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A legend row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendEntry {
    /// Label text.
    pub label: String,
    /// Swatch color; always the color of the mark it describes.
    pub color: Color,
}

/// Everything a surface needs to draw one scene's chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Title drawn above the plot.
    pub title: String,
    /// Horizontal axis.
    pub x: Axis,
    /// Vertical axis.
    pub y: Axis,
    /// Marks to draw.
    pub marks: Marks,
    /// Legend rows, top to bottom.
    pub legend: Vec<LegendEntry>,
}

/// Free text placed on a chart, optionally pinned to a data coordinate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Annotation {
    /// Text to show.
    pub text: String,
    /// Data-space anchor. Unanchored notes stack in the top-left corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<(f64, f64)>,
}

impl Annotation {
    /// Unanchored note.
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            at: None,
        }
    }

    /// Note pinned at `(x, y)` in data space.
    pub fn at(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            at: Some((x, y)),
        }
    }
}
