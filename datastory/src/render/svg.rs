//! Standalone SVG output for charts, plus `usvg` validation and `resvg` rasterization.

use anyhow::Context as _;
use crate::foundation::core::{BezPath, Layout, Point};
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::chart::{Annotation, Axis, BarMark, ChartSpec, Marks, PointMark, Series, TickFormat};
use crate::render::color::Color;
use crate::render::scale::{LinearScale, format_tick};
use crate::render::surface::{ControlState, Surface};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::{Arc, OnceLock};

const TICK_COUNT: usize = 10;
const TICK_SIZE: f64 = 6.0;
const LEGEND_ROW: f64 = 20.0;
const LEGEND_SWATCH: f64 = 18.0;
const BAR_PADDING: f64 = 0.1;
const ERROR_COLOR: Color = Color::rgb(0xb0, 0x00, 0x20);

#[derive(Clone, Debug, Default)]
struct ContainerState {
    chart: Option<ChartSpec>,
    annotations: Vec<Annotation>,
    error: Option<String>,
    note: Option<String>,
}

/// Surface that keeps per-container chart state and emits SVG documents on demand.
#[derive(Debug)]
pub struct SvgSurface {
    layout: Layout,
    containers: BTreeMap<String, ContainerState>,
    controls: ControlState,
}

impl SvgSurface {
    /// Create a surface drawing every container with `layout`.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            containers: BTreeMap::new(),
            controls: ControlState::default(),
        }
    }

    /// Layout used for every document.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Chart currently drawn in `container_id`.
    pub fn chart(&self, container_id: &str) -> Option<&ChartSpec> {
        self.containers.get(container_id)?.chart.as_ref()
    }

    /// Error currently shown in `container_id`.
    pub fn error(&self, container_id: &str) -> Option<&str> {
        self.containers.get(container_id)?.error.as_deref()
    }

    /// Last control state pushed by the controller.
    pub fn controls(&self) -> ControlState {
        self.controls
    }

    /// Serialize `container_id` as a standalone SVG document.
    ///
    /// Unknown containers produce an empty canvas.
    pub fn document(&self, container_id: &str) -> StoryResult<String> {
        let empty = ContainerState::default();
        let state = self.containers.get(container_id).unwrap_or(&empty);
        render_document(
            &self.layout,
            state.chart.as_ref(),
            &state.annotations,
            state.error.as_deref(),
            state.note.as_deref(),
        )
    }

    /// Write `container_id` as an `.svg` file.
    pub fn write_svg(&self, container_id: &str, path: impl AsRef<Path>) -> StoryResult<()> {
        let path = path.as_ref();
        let svg = self.document(container_id)?;
        std::fs::write(path, svg).with_context(|| format!("write svg '{}'", path.display()))?;
        Ok(())
    }

    /// Rasterize `container_id` and write it as a `.png` file.
    pub fn write_png(&self, container_id: &str, path: impl AsRef<Path>) -> StoryResult<()> {
        let svg = self.document(container_id)?;
        rasterize_png(&svg, path.as_ref())
    }

    fn state_mut(&mut self, container_id: &str) -> &mut ContainerState {
        self.containers.entry(container_id.to_owned()).or_default()
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, container_id: &str) -> StoryResult<()> {
        let state = self.state_mut(container_id);
        state.chart = None;
        state.annotations.clear();
        state.error = None;
        Ok(())
    }

    fn render(&mut self, container_id: &str, chart: &ChartSpec) -> StoryResult<()> {
        tracing::debug!(container = container_id, title = %chart.title, marks = chart.marks.len(), "svg render");
        self.state_mut(container_id).chart = Some(chart.clone());
        Ok(())
    }

    fn annotate(&mut self, container_id: &str, notes: &[Annotation]) -> StoryResult<()> {
        self.state_mut(container_id)
            .annotations
            .extend_from_slice(notes);
        Ok(())
    }

    fn show_error(&mut self, container_id: &str, message: &str) -> StoryResult<()> {
        self.state_mut(container_id).error = Some(message.to_owned());
        Ok(())
    }

    fn set_note(&mut self, container_id: &str, note: Option<&str>) -> StoryResult<()> {
        self.state_mut(container_id).note = note.map(str::to_owned);
        Ok(())
    }

    fn update_controls(&mut self, controls: ControlState) -> StoryResult<()> {
        self.controls = controls;
        Ok(())
    }
}

/// Data-to-pixel mapping inside the plot group.
struct Frame {
    x: LinearScale,
    y: LinearScale,
    width: f64,
    height: f64,
}

impl Frame {
    fn new(layout: &Layout, chart: &ChartSpec) -> Self {
        let width = layout.inner_width();
        let height = layout.inner_height();
        Self {
            x: LinearScale::new(chart.x.domain, (0.0, width)),
            y: LinearScale::new(chart.y.domain, (height, 0.0)),
            width,
            height,
        }
    }

    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(self.x.map(x), self.y.map(y))
    }
}

/// Build a complete SVG document.
pub fn render_document(
    layout: &Layout,
    chart: Option<&ChartSpec>,
    annotations: &[Annotation],
    error: Option<&str>,
    note: Option<&str>,
) -> StoryResult<String> {
    let mut out = String::new();
    write_document(&mut out, layout, chart, annotations, error, note)
        .map_err(|_| StoryError::render("format svg document"))?;
    Ok(out)
}

fn write_document(
    out: &mut String,
    layout: &Layout,
    chart: Option<&ChartSpec>,
    annotations: &[Annotation],
    error: Option<&str>,
    note: Option<&str>,
) -> fmt::Result {
    let (w, h) = (layout.canvas.width, layout.canvas.height);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="10">"#
    )?;
    writeln!(out, r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##)?;

    if let Some(chart) = chart {
        let frame = Frame::new(layout, chart);
        writeln!(
            out,
            r#"<text class="title" x="{:.2}" y="{:.2}" text-anchor="middle" font-size="16" fill="{}">{}</text>"#,
            layout.margin.left + frame.width / 2.0,
            (layout.margin.top / 2.0).max(12.0),
            Color::INK,
            escape(&chart.title)
        )?;
        writeln!(
            out,
            r#"<g class="plot" transform="translate({:.2},{:.2})">"#,
            layout.margin.left, layout.margin.top
        )?;
        match &chart.marks {
            Marks::Lines(series) => {
                write_x_axis(out, &frame, &chart.x)?;
                write_y_axis(out, &frame, &chart.y)?;
                write_lines(out, &frame, series)?;
            }
            Marks::Points(points) => {
                write_x_axis(out, &frame, &chart.x)?;
                write_y_axis(out, &frame, &chart.y)?;
                write_points(out, &frame, points)?;
            }
            Marks::Bars(bars) => {
                write_bars(out, &frame, bars)?;
                write_y_axis(out, &frame, &chart.y)?;
            }
        }
        write_legend(out, &frame, chart)?;
        write_annotations(out, &frame, annotations)?;
        writeln!(out, "</g>")?;
    }

    if let Some(msg) = error {
        writeln!(
            out,
            r#"<text class="error" x="{:.2}" y="{:.2}" text-anchor="middle" font-size="14" fill="{ERROR_COLOR}">Error: {}</text>"#,
            f64::from(w) / 2.0,
            f64::from(h) / 2.0,
            escape(msg)
        )?;
    }

    if let Some(note) = note {
        writeln!(
            out,
            r#"<text class="note" x="{:.2}" y="{:.2}" font-size="11" fill="{}">{}</text>"#,
            layout.margin.left,
            f64::from(h) - 4.0,
            Color::INK,
            escape(note)
        )?;
    }

    writeln!(out, "</svg>")
}

fn axis_ticks(scale: &LinearScale, format: TickFormat) -> Vec<(f64, String)> {
    let step = scale.tick_step(TICK_COUNT);
    scale
        .ticks(TICK_COUNT)
        .into_iter()
        .filter(|v| format == TickFormat::Auto || v.fract() == 0.0)
        .map(|v| {
            let label = match format {
                TickFormat::Integer => format!("{v:.0}"),
                TickFormat::Auto => format_tick(v, step),
            };
            (v, label)
        })
        .collect()
}

fn write_x_axis(out: &mut String, frame: &Frame, axis: &Axis) -> fmt::Result {
    writeln!(
        out,
        r#"<g class="x-axis" transform="translate(0,{:.2})">"#,
        frame.height
    )?;
    writeln!(
        out,
        r#"<line x1="0" x2="{:.2}" y1="0" y2="0" stroke="{}"/>"#,
        frame.width,
        Color::INK
    )?;
    for (v, label) in axis_ticks(&frame.x, axis.format) {
        let x = frame.x.map(v);
        writeln!(
            out,
            r#"<line x1="{x:.2}" x2="{x:.2}" y1="0" y2="{TICK_SIZE}" stroke="{}"/><text x="{x:.2}" y="{:.2}" text-anchor="middle" fill="{}">{label}</text>"#,
            Color::INK,
            TICK_SIZE + 12.0,
            Color::INK
        )?;
    }
    writeln!(
        out,
        r#"<text class="axis-label" x="{:.2}" y="34" text-anchor="middle" fill="{}">{}</text>"#,
        frame.width / 2.0,
        Color::INK,
        escape(&axis.label)
    )?;
    writeln!(out, "</g>")
}

fn write_y_axis(out: &mut String, frame: &Frame, axis: &Axis) -> fmt::Result {
    writeln!(out, r#"<g class="y-axis">"#)?;
    writeln!(
        out,
        r#"<line x1="0" x2="0" y1="0" y2="{:.2}" stroke="{}"/>"#,
        frame.height,
        Color::INK
    )?;
    for (v, label) in axis_ticks(&frame.y, axis.format) {
        let y = frame.y.map(v);
        writeln!(
            out,
            r#"<line x1="-{TICK_SIZE}" x2="0" y1="{y:.2}" y2="{y:.2}" stroke="{}"/><text x="{:.2}" y="{y:.2}" dy="0.32em" text-anchor="end" fill="{}">{label}</text>"#,
            Color::INK,
            -(TICK_SIZE + 3.0),
            Color::INK
        )?;
    }
    writeln!(
        out,
        r#"<text class="axis-label" transform="rotate(-90)" x="{:.2}" y="-38" text-anchor="middle" fill="{}">{}</text>"#,
        -frame.height / 2.0,
        Color::INK,
        escape(&axis.label)
    )?;
    writeln!(out, "</g>")
}

fn write_lines(out: &mut String, frame: &Frame, series: &[Series]) -> fmt::Result {
    for s in series {
        let mut path = BezPath::new();
        for (i, &(x, y)) in s.points.iter().enumerate() {
            let p = frame.point(x, y);
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        if path.elements().is_empty() {
            continue;
        }
        writeln!(
            out,
            r#"<path class="series" d="{}" fill="none" stroke="{}" stroke-width="1.5"><title>{}</title></path>"#,
            path.to_svg(),
            s.color,
            escape(&s.key)
        )?;
    }
    Ok(())
}

fn write_points(out: &mut String, frame: &Frame, points: &[PointMark]) -> fmt::Result {
    for p in points {
        let c = frame.point(p.x, p.y);
        writeln!(
            out,
            r#"<circle class="dot" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{:.2}"><title>{}</title></circle>"#,
            c.x,
            c.y,
            p.radius,
            p.color,
            p.opacity,
            escape(&p.tooltip)
        )?;
    }
    Ok(())
}

fn write_bars(out: &mut String, frame: &Frame, bars: &[BarMark]) -> fmt::Result {
    writeln!(
        out,
        r#"<line x1="0" x2="{:.2}" y1="{:.2}" y2="{:.2}" stroke="{}"/>"#,
        frame.width,
        frame.height,
        frame.height,
        Color::INK
    )?;
    if bars.is_empty() {
        return Ok(());
    }
    let band = frame.width / bars.len() as f64;
    let bar_w = band * (1.0 - 2.0 * BAR_PADDING);
    let base = frame.y.map(0.0_f64.max(frame.y.domain().0));
    for (i, b) in bars.iter().enumerate() {
        let x = i as f64 * band + band * BAR_PADDING;
        let top = frame.y.map(b.value);
        let (y, h) = if top <= base {
            (top, base - top)
        } else {
            (base, top - base)
        };
        let cx = x + bar_w / 2.0;
        writeln!(
            out,
            r#"<rect class="bar" x="{x:.2}" y="{y:.2}" width="{bar_w:.2}" height="{h:.2}" fill="{}"><title>{}</title></rect>"#,
            b.color,
            escape(&b.tooltip)
        )?;
        writeln!(
            out,
            r#"<text x="{cx:.2}" y="{:.2}" transform="rotate(-35 {cx:.2} {:.2})" text-anchor="end" fill="{}">{}</text>"#,
            frame.height + 12.0,
            frame.height + 12.0,
            Color::INK,
            escape(&b.label)
        )?;
    }
    Ok(())
}

fn write_legend(out: &mut String, frame: &Frame, chart: &ChartSpec) -> fmt::Result {
    for (i, entry) in chart.legend.iter().enumerate() {
        writeln!(
            out,
            r#"<g class="legend" transform="translate(0,{:.2})"><rect x="{:.2}" width="{LEGEND_SWATCH}" height="{LEGEND_SWATCH}" fill="{}"/><text x="{:.2}" y="9" dy="0.35em" text-anchor="end" fill="{}">{}</text></g>"#,
            i as f64 * LEGEND_ROW,
            frame.width - LEGEND_SWATCH,
            entry.color,
            frame.width - LEGEND_SWATCH - 6.0,
            Color::INK,
            escape(&entry.label)
        )?;
    }
    Ok(())
}

fn write_annotations(out: &mut String, frame: &Frame, notes: &[Annotation]) -> fmt::Result {
    let mut stacked = 0usize;
    for note in notes {
        match note.at {
            Some((x, y)) => {
                let p = frame.point(x, y);
                writeln!(
                    out,
                    r#"<g class="annotation"><circle cx="{:.2}" cy="{:.2}" r="4" fill="none" stroke="{}"/><text x="{:.2}" y="{:.2}" fill="{}">{}</text></g>"#,
                    p.x,
                    p.y,
                    Color::INK,
                    p.x + 6.0,
                    p.y - 6.0,
                    Color::INK,
                    escape(&note.text)
                )?;
            }
            None => {
                writeln!(
                    out,
                    r#"<text class="annotation" x="10" y="{:.2}" font-size="12" fill="{}">{}</text>"#,
                    16.0 + stacked as f64 * 16.0,
                    Color::INK,
                    escape(&note.text)
                )?;
                stacked += 1;
            }
        }
    }
    Ok(())
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn svg_options() -> usvg::Options<'static> {
    static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    let fontdb = FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone();
    usvg::Options {
        fontdb,
        ..Default::default()
    }
}

/// Parse an SVG document, failing on anything `usvg` rejects.
pub fn parse_svg(svg: &str) -> StoryResult<usvg::Tree> {
    usvg::Tree::from_data(svg.as_bytes(), &svg_options())
        .map_err(|e| StoryError::render(format!("parse svg: {e}")))
}

/// Rasterize an SVG document into a PNG file.
pub fn rasterize_png(svg: &str, path: &Path) -> StoryResult<()> {
    let tree = parse_svg(svg)?;
    let size = tree.size();
    let (w, h) = (size.width().ceil() as u32, size.height().ceil() as u32);
    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| StoryError::render(format!("failed to allocate {w}x{h} pixmap")))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    let mut rgba = Vec::with_capacity((w as usize) * (h as usize) * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image::save_buffer_with_format(
        path,
        &rgba,
        w,
        h,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
