use super::*;
use crate::data::dataset::MeasureRecord;
use crate::data::join::join;

fn co2() -> MeasureTable {
    MeasureTable::from_records(
        Measure::Co2,
        vec![
            MeasureRecord::new("B", 2001, 20.0),
            MeasureRecord::new("A", 2001, 12.0),
            MeasureRecord::new("A", 2000, 10.0),
            MeasureRecord::new("B", 2000, 18.0),
            MeasureRecord {
                country: "C".to_string(),
                year: 2000,
                value: None,
            },
        ],
    )
}

fn line(measure: Measure) -> LineOptions {
    LineOptions {
        measure,
        countries: None,
    }
}

#[test]
fn line_chart_groups_by_country_in_first_appearance_order() {
    let chart = line_chart(&co2(), "CO2 over time", &line(Measure::Co2), None).unwrap();
    let Marks::Lines(series) = &chart.marks else {
        panic!("expected lines");
    };
    let keys: Vec<_> = series.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ["B", "A"]);
    // Points are sorted by year within a series.
    assert_eq!(series[1].points, vec![(2000.0, 10.0), (2001.0, 12.0)]);
    assert_eq!(chart.x.domain, (2000.0, 2001.0));
    assert_eq!(chart.x.format, TickFormat::Integer);
    assert_eq!(chart.y.domain, (0.0, 20.0));
    assert_eq!(chart.y.label, "CO2");
}

#[test]
fn legend_colors_match_series_and_are_stable() {
    let a = line_chart(&co2(), "t", &line(Measure::Co2), None).unwrap();
    let b = line_chart(&co2(), "t", &line(Measure::Co2), None).unwrap();
    assert_eq!(a, b);
    let Marks::Lines(series) = &a.marks else {
        panic!("expected lines");
    };
    assert_eq!(a.legend.len(), 2);
    for (s, l) in series.iter().zip(&a.legend) {
        assert_eq!(s.key, l.label);
        assert_eq!(s.color, l.color);
        assert_eq!(s.color, Color::for_key(&s.key));
    }
}

#[test]
fn single_series_with_color_override_has_no_legend() {
    let opts = LineOptions {
        measure: Measure::Co2,
        countries: Some(vec!["A".to_string()]),
    };
    let chart = line_chart(&co2(), "A only", &opts, Some(Color::STEELBLUE)).unwrap();
    let Marks::Lines(series) = &chart.marks else {
        panic!("expected lines");
    };
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].color, Color::STEELBLUE);
    assert!(chart.legend.is_empty());
}

#[test]
fn line_chart_without_values_is_a_render_error() {
    let opts = LineOptions {
        measure: Measure::Co2,
        countries: Some(vec!["C".to_string()]),
    };
    let err = line_chart(&co2(), "empty", &opts, None).unwrap_err();
    assert!(matches!(err, StoryError::Render(_)));
}

#[test]
fn scatter_drops_incomplete_records_and_sizes_dots() {
    let life = MeasureTable::from_records(
        Measure::LifeExpectancy,
        vec![
            MeasureRecord::new("A", 2000, 70.0),
            MeasureRecord::new("B", 2000, 75.0),
            MeasureRecord::new("A", 2001, 71.0),
        ],
    );
    let obesity = MeasureTable::from_records(
        Measure::ObesityRate,
        vec![
            MeasureRecord::new("A", 2000, 10.0),
            MeasureRecord::new("B", 2000, 30.0),
        ],
    );
    let joined = join(&co2(), &[&life, &obesity]).unwrap();

    let plain = ScatterOptions {
        x: Measure::Co2,
        y: Measure::LifeExpectancy,
        size: None,
    };
    let chart = scatter_chart(&joined, "CO2 vs life", &plain, None).unwrap();
    let Marks::Points(points) = &chart.marks else {
        panic!("expected points");
    };
    assert_eq!(points.len(), 3);
    assert!(points.iter().all(|p| p.radius == 3.0 && p.opacity == 1.0));
    assert!(points.iter().all(|p| p.color == Color::STEELBLUE));

    let sized = ScatterOptions {
        size: Some(Measure::ObesityRate),
        ..plain
    };
    let chart = scatter_chart(&joined, "bubbles", &sized, None).unwrap();
    let Marks::Points(points) = &chart.marks else {
        panic!("expected points");
    };
    assert_eq!(points.len(), 2);
    let radii: Vec<_> = points.iter().map(|p| p.radius).collect();
    assert_eq!(radii, [5.0, 20.0]);
    assert!(points.iter().all(|p| p.opacity == 0.7));
    assert_eq!(
        points[0].tooltip,
        "A (2000): CO2=10, Life Expectancy=70, Obesity Rate=10"
    );
}

#[test]
fn scatter_with_no_complete_records_errors() {
    let joined = join(&co2(), &[]).unwrap();
    let opts = ScatterOptions {
        x: Measure::Co2,
        y: Measure::ObesityRate,
        size: None,
    };
    let err = scatter_chart(&joined, "none", &opts, None).unwrap_err();
    assert!(err.to_string().contains("CO2 and ObesityRate"));
}

#[test]
fn bar_chart_defaults_to_latest_year_sorted_descending() {
    let opts = BarOptions {
        measure: Measure::Co2,
        year: None,
        limit: None,
    };
    let chart = bar_chart(&co2(), "2001", &opts, None).unwrap();
    let Marks::Bars(bars) = &chart.marks else {
        panic!("expected bars");
    };
    let labels: Vec<_> = bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, ["B", "A"]);
    assert_eq!(bars[0].tooltip, "B (2001): CO2=20");
    assert_eq!(chart.y.label, "CO2 (2001)");
    assert_eq!(chart.y.domain.0, 0.0);
}

#[test]
fn bar_chart_limit_and_missing_year() {
    let opts = BarOptions {
        measure: Measure::Co2,
        year: Some(2000),
        limit: Some(1),
    };
    let chart = bar_chart(&co2(), "top", &opts, None).unwrap();
    assert_eq!(chart.marks.len(), 1);

    let opts = BarOptions {
        measure: Measure::Co2,
        year: Some(1990),
        limit: None,
    };
    assert!(bar_chart(&co2(), "none", &opts, None).is_err());
}

#[test]
fn value_formatting_trims_zeros() {
    assert_eq!(format_value(10.0), "10");
    assert_eq!(format_value(3.10), "3.1");
    assert_eq!(format_value(0.126), "0.13");
    assert_eq!(format_value(-0.001), "0");
}
