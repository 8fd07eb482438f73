use super::*;
use crate::data::dataset::{Dataset, MeasureRecord};
use crate::data::schema::ColumnMap;
use std::io::Cursor;

fn table(measure: Measure, rows: &[(&str, i32, f64)]) -> MeasureTable {
    MeasureTable::from_records(
        measure,
        rows.iter()
            .map(|(c, y, v)| MeasureRecord::new(*c, *y, *v))
            .collect(),
    )
}

#[test]
fn join_matches_worked_example() {
    let co2 = table(Measure::Co2, &[("A", 2000, 10.0), ("B", 2001, 20.0)]);
    let obesity = table(Measure::ObesityRate, &[("A", 2000, 15.0)]);

    let joined = join(&co2, &[&obesity]).unwrap();

    assert_eq!(
        joined,
        vec![
            JoinedRecord::new("A", 2000)
                .with_measure(Measure::Co2, Some(10.0))
                .with_measure(Measure::ObesityRate, Some(15.0)),
            JoinedRecord::new("B", 2001)
                .with_measure(Measure::Co2, Some(20.0))
                .with_measure(Measure::ObesityRate, None),
        ]
    );
    let json = serde_json::to_value(&joined).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"Country": "A", "Year": 2000, "CO2": 10.0, "ObesityRate": 15.0},
            {"Country": "B", "Year": 2001, "CO2": 20.0, "ObesityRate": null},
        ])
    );
}

#[test]
fn join_preserves_primary_length_and_order() {
    let co2 = table(
        Measure::Co2,
        &[("C", 2003, 3.0), ("A", 2001, 1.0), ("B", 2002, 2.0), ("A", 2001, 9.0)],
    );
    let life = table(Measure::LifeExpectancy, &[("B", 2002, 70.0)]);
    let joined = join(&co2, &[&life]).unwrap();
    assert_eq!(joined.len(), 4);
    let keys: Vec<_> = joined.iter().map(|r| (r.country.as_str(), r.year)).collect();
    assert_eq!(keys, [("C", 2003), ("A", 2001), ("B", 2002), ("A", 2001)]);
    assert_eq!(joined[3].measure(Measure::Co2), Some(9.0));
}

#[test]
fn join_miss_is_none_not_zero() {
    let co2 = table(Measure::Co2, &[("A", 2000, 1.0)]);
    let life = table(Measure::LifeExpectancy, &[("A", 2001, 70.0), ("a", 2000, 71.0)]);
    let joined = join(&co2, &[&life]).unwrap();
    assert!(joined[0].has_column(Measure::LifeExpectancy));
    assert_eq!(joined[0].measure(Measure::LifeExpectancy), None);
}

#[test]
fn first_duplicate_secondary_row_wins() {
    let co2 = table(Measure::Co2, &[("A", 2000, 1.0)]);
    let life = table(Measure::LifeExpectancy, &[("A", 2000, 70.0), ("A", 2000, 99.0)]);
    let joined = join(&co2, &[&life]).unwrap();
    assert_eq!(joined[0].measure(Measure::LifeExpectancy), Some(70.0));
}

#[test]
fn year_matching_is_numeric_across_spellings() {
    let co2_csv = "Country,Year,CO2\nA,2010,5\n";
    let life_csv = "Entity,Year,Life expectancy\nA,2010.0,80.5\n";
    let co2 = MeasureTable::from_dataset(
        &Dataset::from_reader("co2", Cursor::new(co2_csv)).unwrap(),
        Measure::Co2,
        &ColumnMap::default(),
    )
    .unwrap();
    let life = MeasureTable::from_dataset(
        &Dataset::from_reader("life", Cursor::new(life_csv)).unwrap(),
        Measure::LifeExpectancy,
        &ColumnMap::default(),
    )
    .unwrap();

    let joined = join(&co2, &[&life]).unwrap();
    assert_eq!(joined[0].measure(Measure::LifeExpectancy), Some(80.5));
}

#[test]
fn country_names_match_exactly_after_loading() {
    let co2_csv = " Country , Year ,CO2\nA,2010,5\nB,2010,6\n";
    let life_csv = "Entity,Year,Life expectancy\nA ,2010,80.5\nB, 2010 ,70\n";
    let co2 = MeasureTable::from_dataset(
        &Dataset::from_reader("co2", Cursor::new(co2_csv)).unwrap(),
        Measure::Co2,
        &ColumnMap::default(),
    )
    .unwrap();
    let life = MeasureTable::from_dataset(
        &Dataset::from_reader("life", Cursor::new(life_csv)).unwrap(),
        Measure::LifeExpectancy,
        &ColumnMap::default(),
    )
    .unwrap();
    assert_eq!(life.records()[0].country, "A ");

    let joined = join(&co2, &[&life]).unwrap();
    assert_eq!(joined[0].measure(Measure::LifeExpectancy), None);
    assert_eq!(joined[1].measure(Measure::LifeExpectancy), Some(70.0));
}

#[test]
fn three_way_join_and_completeness_filter() {
    let co2 = table(Measure::Co2, &[("A", 2000, 1.0), ("B", 2000, 2.0), ("C", 2000, 3.0)]);
    let life = table(Measure::LifeExpectancy, &[("A", 2000, 70.0), ("C", 2000, 72.0)]);
    let obesity = table(Measure::ObesityRate, &[("C", 2000, 20.0), ("B", 2000, 25.0)]);

    let mut joined = join(&co2, &[&life, &obesity]).unwrap();
    let required = [Measure::LifeExpectancy, Measure::ObesityRate];
    let complete_countries: Vec<_> = complete(&joined, &required)
        .map(|r| r.country.as_str())
        .collect();
    assert_eq!(complete_countries, ["C"]);

    retain_complete(&mut joined, &[Measure::LifeExpectancy]);
    assert_eq!(joined.len(), 2);
    assert_eq!(joined[1].measure(Measure::ObesityRate), Some(20.0));
}

#[test]
fn join_without_secondaries_copies_primary() {
    let co2 = table(Measure::Co2, &[("A", 2000, 1.0)]);
    let joined = join(&co2, &[]).unwrap();
    assert_eq!(joined.len(), 1);
    assert!(!joined[0].has_column(Measure::ObesityRate));
}

#[test]
fn joining_the_same_measure_twice_is_rejected() {
    let co2 = table(Measure::Co2, &[("A", 2000, 1.0)]);
    let life = table(Measure::LifeExpectancy, &[]);
    assert!(join(&co2, &[&co2]).is_err());
    assert!(join(&co2, &[&life, &life]).is_err());
}
