use crate::foundation::error::{StoryError, StoryResult};

pub use kurbo::{BezPath, Point, Rect};

/// `(Country, Year)` join key shared by every dataset.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    /// Country or entity name, compared by exact string equality.
    pub country: String,
    /// Calendar year, normalized to an integer during parsing.
    pub year: i32,
}

impl RecordKey {
    /// Create a key.
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Self {
            country: country.into(),
            year,
        }
    }
}

/// Output document size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 960,
            height: 500,
        }
    }
}

/// Space reserved around the plot area for axes, title and legend.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Margin {
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 30.0,
            bottom: 40.0,
            left: 50.0,
        }
    }
}

/// Canvas plus margin, resolved into a plot rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Layout {
    /// Full document size.
    pub canvas: Canvas,
    /// Margin around the plot area.
    pub margin: Margin,
}

impl Layout {
    /// Create a layout, rejecting margins that leave no room to plot.
    pub fn new(canvas: Canvas, margin: Margin) -> StoryResult<Self> {
        let edges = [margin.top, margin.right, margin.bottom, margin.left];
        if edges.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(StoryError::validation("margin edges must be finite and >= 0"));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(StoryError::validation("canvas width/height must be > 0"));
        }
        let layout = Self { canvas, margin };
        if layout.inner_width() <= 0.0 || layout.inner_height() <= 0.0 {
            return Err(StoryError::validation(
                "margin leaves no plot area inside the canvas",
            ));
        }
        Ok(layout)
    }

    /// Plot width between the left and right margins.
    pub fn inner_width(&self) -> f64 {
        f64::from(self.canvas.width) - self.margin.left - self.margin.right
    }

    /// Plot height between the top and bottom margins.
    pub fn inner_height(&self) -> f64 {
        f64::from(self.canvas.height) - self.margin.top - self.margin.bottom
    }

    /// Plot rectangle in document coordinates.
    pub fn plot_area(&self) -> Rect {
        Rect::new(
            self.margin.left,
            self.margin.top,
            self.margin.left + self.inner_width(),
            self.margin.top + self.inner_height(),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
