use super::*;
use crate::data::dataset::{MeasureRecord, MeasureTable};
use crate::data::load::StoryData;
use crate::render::chart::Marks;

const STORY: &str = r##"{
  "version": "1",
  "source_note": "Source: Our World in Data",
  "datasets": [
    { "measure": "co2", "path": "C02emissions.csv" },
    { "measure": "life_expectancy", "path": "life-expectancy.csv" }
  ],
  "primary": "co2",
  "scenes": [
    { "title": "Global CO2 Emissions Over Time", "chart": { "line": { "measure": "co2" } } },
    {
      "title": "CO2 vs Life Expectancy",
      "chart": { "scatter": { "x": "co2", "y": "life_expectancy" } },
      "color": "#4682b4",
      "annotations": [{ "text": "Richer, longer lives", "at": [10.0, 75.0] }]
    },
    { "title": "Top Emitters", "chart": { "bar": { "measure": "co2", "limit": 2 } } }
  ]
}"##;

fn data() -> StoryData {
    let co2 = MeasureTable::from_records(
        Measure::Co2,
        vec![
            MeasureRecord::new("A", 2000, 10.0),
            MeasureRecord::new("B", 2000, 20.0),
            MeasureRecord::new("C", 2000, 5.0),
        ],
    );
    let life = MeasureTable::from_records(
        Measure::LifeExpectancy,
        vec![
            MeasureRecord::new("A", 2000, 70.0),
            MeasureRecord::new("B", 2000, 80.0),
        ],
    );
    StoryData::new(vec![co2, life], Measure::Co2).unwrap()
}

#[test]
fn defaults_fill_in_layout_and_navigation() {
    let story = Story::from_json(STORY).unwrap();
    story.validate().unwrap();
    assert_eq!(story.container(), "chart");
    assert_eq!(story.navigation(), NavigationPolicy::Clamp);
    assert_eq!(story.source_note(), Some("Source: Our World in Data"));
    let layout = story.layout().unwrap();
    assert_eq!(layout.canvas.width, 960);
    assert_eq!(layout.canvas.height, 500);
    assert_eq!(story.sources().len(), 2);
    assert_eq!(story.primary(), Measure::Co2);
}

#[test]
fn scene_defs_parse_each_chart_kind() {
    let story = Story::from_json(STORY).unwrap();
    let defs = story.scene_defs();
    assert!(matches!(defs[0].chart, ChartDef::Line(_)));
    assert!(matches!(defs[1].chart, ChartDef::Scatter(_)));
    assert_eq!(defs[1].color, Some(Color::STEELBLUE));
    assert_eq!(defs[1].annotations[0].at, Some((10.0, 75.0)));
    match &defs[2].chart {
        ChartDef::Bar(o) => {
            assert_eq!(o.limit, Some(2));
            assert_eq!(o.year, None);
        }
        other => panic!("expected bar, got {other:?}"),
    }
}

#[test]
fn descriptors_render_against_loaded_data() {
    let story = Story::from_json(STORY).unwrap();
    let scenes = story.scenes();
    assert_eq!(scenes.len(), 3);
    let data = data();

    let line = scenes[0].render(&data).unwrap();
    assert_eq!(line.title, "Global CO2 Emissions Over Time");
    assert!(matches!(line.marks, Marks::Lines(ref s) if s.len() == 3));
    assert!(scenes[0].annotate(&data).is_none());

    let scatter = scenes[1].render(&data).unwrap();
    match &scatter.marks {
        Marks::Points(p) => {
            assert_eq!(p.len(), 2);
            assert!(p.iter().all(|m| m.color == Color::STEELBLUE));
        }
        other => panic!("expected points, got {other:?}"),
    }
    let notes = scenes[1].annotate(&data).unwrap();
    assert_eq!(notes, vec![Annotation::at("Richer, longer lives", 10.0, 75.0)]);

    let bars = scenes[2].render(&data).unwrap();
    match &bars.marks {
        Marks::Bars(b) => {
            let labels: Vec<&str> = b.iter().map(|m| m.label.as_str()).collect();
            assert_eq!(labels, ["B", "A"]);
        }
        other => panic!("expected bars, got {other:?}"),
    }
}

#[test]
fn missing_table_is_a_render_error() {
    let story = Story::from_json(
        r#"{
          "version": "1",
          "datasets": [{ "measure": "co2", "path": "a.csv" }],
          "primary": "co2",
          "scenes": [{ "title": "Obesity", "chart": { "line": { "measure": "obesity_rate" } } }]
        }"#,
    )
    .unwrap();
    let scenes = story.scenes();
    let err = scenes[0].render(&data()).unwrap_err();
    assert!(matches!(err, StoryError::Render(_)), "{err}");
}

#[test]
fn validation_reports_every_problem_with_its_path() {
    let story = Story::from_json(
        r#"{
          "version": "2",
          "datasets": [
            { "measure": "co2", "path": "a.csv" },
            { "measure": "co2", "path": "b.csv" }
          ],
          "primary": "life_expectancy",
          "scenes": [
            { "title": "ok", "chart": { "line": { "measure": "co2" } } },
            { "title": " ", "chart": { "bar": { "measure": "co2", "limit": 0 } } },
            {
              "title": "same axes",
              "chart": { "scatter": { "x": "obesity_rate", "y": "obesity_rate" } },
              "annotations": [{ "text": "" }]
            }
          ]
        }"#,
    )
    .unwrap();
    let msg = story.validate().unwrap_err().to_string();
    for expected in [
        "$.version: version must be \"1\"",
        "$.datasets[1]: measure CO2 is provided by more than one dataset",
        "$.primary: primary measure LifeExpectancy has no dataset",
        "$.scenes[1]: title must not be empty",
        "$.scenes[1].chart: bar limit must be > 0",
        "$.scenes[2].chart: measure ObesityRate has no dataset",
        "$.scenes[2].chart: scatter x and y must differ",
        "$.scenes[2].annotations[0]: text must not be empty",
    ] {
        assert!(msg.contains(expected), "missing {expected:?} in:\n{msg}");
    }
}

#[test]
fn empty_story_lists_are_rejected() {
    let story = Story::from_json(
        r#"{ "version": "1", "datasets": [], "primary": "co2", "scenes": [] }"#,
    )
    .unwrap();
    let msg = story.validate().unwrap_err().to_string();
    assert!(msg.contains("$.datasets: at least one dataset is required"));
    assert!(msg.contains("$.scenes: at least one scene is required"));
}

#[test]
fn unknown_fields_and_chart_kinds_fail_to_parse() {
    let err = Story::from_json(
        r#"{ "version": "1", "datasets": [], "primary": "co2", "scenes": [], "theme": "dark" }"#,
    )
    .unwrap_err();
    assert!(matches!(err, StoryError::Serde(_)));

    let err = Story::from_json(
        r#"{ "version": "1", "datasets": [], "primary": "co2",
             "scenes": [{ "title": "t", "chart": { "pie": { "measure": "co2" } } }] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, StoryError::Serde(_)));
}

#[test]
fn wrap_navigation_and_named_color_parse() {
    let story = Story::from_json(
        r#"{
          "version": "1",
          "container": "viz",
          "navigation": "wrap",
          "canvas": { "width": 640, "height": 360 },
          "datasets": [{ "measure": "co2", "path": "a.csv" }],
          "primary": "co2",
          "scenes": [{ "title": "t", "chart": { "line": { "measure": "co2" } }, "color": "tomato" }]
        }"#,
    )
    .unwrap();
    story.validate().unwrap();
    assert_eq!(story.container(), "viz");
    assert_eq!(story.navigation(), NavigationPolicy::Wrap);
    assert_eq!(story.layout().unwrap().canvas.width, 640);
    assert!(story.scene_defs()[0].color.is_some());
}

#[test]
fn missing_story_file_is_a_load_error() {
    let err = Story::from_path("target/unit_story/does-not-exist.json").unwrap_err();
    assert!(matches!(err, StoryError::Load(_)));
}
