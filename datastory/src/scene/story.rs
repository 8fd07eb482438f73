//! JSON story definition: datasets, layout, navigation policy and the scene list.

use crate::data::load::DataSource;
use crate::data::schema::Measure;
use crate::foundation::core::{Canvas, Layout, Margin};
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::chart::Annotation;
use crate::render::color::Color;
use crate::scene::build::{BarOptions, LineOptions, ScatterOptions, bar_chart, line_chart, scatter_chart};
use crate::scene::descriptor::SceneDescriptor;
use crate::session::controller::NavigationPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Story format version accepted by this crate.
pub const STORY_VERSION: &str = "1";

fn default_container() -> String {
    "chart".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StoryDef {
    pub(crate) version: String,
    #[serde(default = "default_container")]
    pub(crate) container: String,
    #[serde(default)]
    pub(crate) canvas: Canvas,
    #[serde(default)]
    pub(crate) margin: Margin,
    #[serde(default)]
    pub(crate) navigation: NavigationPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) source_note: Option<String>,
    pub(crate) datasets: Vec<DataSource>,
    pub(crate) primary: Measure,
    pub(crate) scenes: Vec<SceneDef>,
}

/// Chart kind and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartDef {
    /// One line per country over time.
    Line(LineOptions),
    /// Joined-measure scatter plot.
    Scatter(ScatterOptions),
    /// One bar per country for a year.
    Bar(BarOptions),
}

impl ChartDef {
    /// Measures this chart reads.
    pub fn measures(&self) -> Vec<Measure> {
        match self {
            ChartDef::Line(o) => vec![o.measure],
            ChartDef::Bar(o) => vec![o.measure],
            ChartDef::Scatter(o) => {
                let mut v = vec![o.x, o.y];
                v.extend(o.size);
                v.sort();
                v.dedup();
                v
            }
        }
    }
}

/// One scene of a story file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDef {
    /// Chart title.
    pub title: String,
    /// What to plot.
    pub chart: ChartDef,
    /// Single color for every mark instead of per-entity colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Notes drawn over the chart.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl SceneDef {
    /// Turn the definition into a render function (and annotation function, if any).
    pub fn descriptor(&self) -> SceneDescriptor {
        let title = self.title.clone();
        let chart = self.chart.clone();
        let color = self.color;
        let desc = SceneDescriptor::new(self.title.clone(), move |data| match &chart {
            ChartDef::Line(o) => line_chart(data.require_table(o.measure)?, &title, o, color),
            ChartDef::Bar(o) => bar_chart(data.require_table(o.measure)?, &title, o, color),
            ChartDef::Scatter(o) => scatter_chart(data.joined(), &title, o, color),
        });
        if self.annotations.is_empty() {
            desc
        } else {
            let notes = self.annotations.clone();
            desc.with_annotations(move |_| notes.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct StoryIssue {
    pub(crate) path: Vec<PathElem>,
    pub(crate) message: String,
}

impl StoryIssue {
    fn at(path: &[PathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for StoryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::from("$");
        for p in &self.path {
            match *p {
                PathElem::Field(name) => {
                    s.push('.');
                    s.push_str(name);
                }
                PathElem::Index(i) => {
                    s.push('[');
                    s.push_str(&i.to_string());
                    s.push(']');
                }
            }
        }
        write!(f, "{s}: {}", self.message)
    }
}

/// A parsed story file.
#[derive(Debug, Clone)]
pub struct Story {
    def: StoryDef,
}

impl Story {
    /// Parse a story from a JSON reader. Call [`Story::validate`] before use.
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        let def: StoryDef = serde_json::from_reader(r)
            .map_err(|e| StoryError::serde(format!("parse story JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a story from a JSON string.
    pub fn from_json(s: &str) -> StoryResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a story from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::load(format!("open story JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the whole definition, reporting every problem at once.
    pub fn validate(&self) -> StoryResult<()> {
        let issues = validate_story(&self.def);
        if issues.is_empty() {
            return Ok(());
        }
        let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
        Err(StoryError::validation(format!(
            "story validation failed:\n{}",
            lines.join("\n")
        )))
    }

    /// Container the story draws into.
    pub fn container(&self) -> &str {
        &self.def.container
    }

    /// Canvas and margin.
    pub fn layout(&self) -> StoryResult<Layout> {
        Layout::new(self.def.canvas, self.def.margin)
    }

    /// Boundary navigation policy.
    pub fn navigation(&self) -> NavigationPolicy {
        self.def.navigation
    }

    /// Attribution shown under the chart while a scene is on screen.
    pub fn source_note(&self) -> Option<&str> {
        self.def.source_note.as_deref()
    }

    /// Dataset sources.
    pub fn sources(&self) -> &[DataSource] {
        &self.def.datasets
    }

    /// Measure that drives the join.
    pub fn primary(&self) -> Measure {
        self.def.primary
    }

    /// Scene definitions, in navigation order.
    pub fn scene_defs(&self) -> &[SceneDef] {
        &self.def.scenes
    }

    /// Scene list ready for a controller.
    pub fn scenes(&self) -> Vec<SceneDescriptor> {
        self.def.scenes.iter().map(SceneDef::descriptor).collect()
    }
}

pub(crate) fn validate_story(def: &StoryDef) -> Vec<StoryIssue> {
    let mut issues = Vec::new();
    let f = PathElem::Field;

    if def.version != STORY_VERSION {
        issues.push(StoryIssue::at(
            &[f("version")],
            format!("version must be \"{STORY_VERSION}\""),
        ));
    }
    if def.container.trim().is_empty() {
        issues.push(StoryIssue::at(&[f("container")], "must not be empty"));
    }
    if let Err(e) = Layout::new(def.canvas, def.margin) {
        issues.push(StoryIssue::at(&[f("margin")], e.to_string()));
    }

    if def.datasets.is_empty() {
        issues.push(StoryIssue::at(&[f("datasets")], "at least one dataset is required"));
    }
    let mut loaded = HashSet::new();
    for (i, ds) in def.datasets.iter().enumerate() {
        let path = [f("datasets"), PathElem::Index(i)];
        if !loaded.insert(ds.measure) {
            issues.push(StoryIssue::at(
                &path,
                format!("measure {} is provided by more than one dataset", ds.measure),
            ));
        }
        if ds.path.as_os_str().is_empty() {
            issues.push(StoryIssue::at(&path, "path must not be empty"));
        }
    }
    if !loaded.contains(&def.primary) {
        issues.push(StoryIssue::at(
            &[f("primary")],
            format!("primary measure {} has no dataset", def.primary),
        ));
    }

    if def.scenes.is_empty() {
        issues.push(StoryIssue::at(&[f("scenes")], "at least one scene is required"));
    }
    for (i, scene) in def.scenes.iter().enumerate() {
        let path = [f("scenes"), PathElem::Index(i)];
        if scene.title.trim().is_empty() {
            issues.push(StoryIssue::at(&path, "title must not be empty"));
        }
        let chart_path = [f("scenes"), PathElem::Index(i), f("chart")];
        for m in scene.chart.measures() {
            if !loaded.contains(&m) {
                issues.push(StoryIssue::at(
                    &chart_path,
                    format!("measure {m} has no dataset"),
                ));
            }
        }
        match &scene.chart {
            ChartDef::Scatter(o) if o.x == o.y => {
                issues.push(StoryIssue::at(&chart_path, "scatter x and y must differ"));
            }
            ChartDef::Bar(o) if o.limit == Some(0) => {
                issues.push(StoryIssue::at(&chart_path, "bar limit must be > 0"));
            }
            ChartDef::Line(o) if o.countries.as_ref().is_some_and(Vec::is_empty) => {
                issues.push(StoryIssue::at(&chart_path, "countries must not be empty when set"));
            }
            _ => {}
        }
        for (j, note) in scene.annotations.iter().enumerate() {
            let note_path = [f("scenes"), PathElem::Index(i), f("annotations"), PathElem::Index(j)];
            if note.text.trim().is_empty() {
                issues.push(StoryIssue::at(&note_path, "text must not be empty"));
            }
            if note.at.is_some_and(|(x, y)| !x.is_finite() || !y.is_finite()) {
                issues.push(StoryIssue::at(&note_path, "anchor must be finite"));
            }
        }
    }

    issues
}

#[cfg(test)]
#[path = "../../tests/unit/scene/story.rs"]
mod tests;
