use super::*;
use std::io::Cursor;

const OWID_CO2: &str = "\
Entity,Code,Year,Annual CO₂ emissions
Albania,ALB,2000,3.02
Albania,ALB,2001,3.22
Brazil,BRA,2000,
";

#[test]
fn reads_headers_and_rows_in_order() {
    let ds = Dataset::from_reader("co2.csv", Cursor::new(OWID_CO2)).unwrap();
    assert_eq!(ds.name(), "co2.csv");
    assert_eq!(ds.headers().len(), 4);
    assert_eq!(ds.len(), 3);
    let first = ds.row(0).unwrap();
    assert_eq!(first.get("Entity"), Some("Albania"));
    assert_eq!(first.get("Year"), Some("2000"));
    assert_eq!(first.get("Nope"), None);
    let countries: Vec<_> = ds.rows().filter_map(|r| r.get("Entity")).collect();
    assert_eq!(countries, ["Albania", "Albania", "Brazil"]);
}

#[test]
fn ragged_csv_is_a_load_error() {
    let err = Dataset::from_reader("bad.csv", Cursor::new("Country,Year\nA,2000,9\n")).unwrap_err();
    assert!(matches!(err, StoryError::Load(_)), "{err}");
}

#[test]
fn from_rows_rejects_ragged_rows() {
    let headers = vec!["Country".to_string(), "Year".to_string()];
    let rows = vec![vec!["A".to_string()]];
    assert!(Dataset::from_rows("mem", headers, rows).is_err());
}

#[test]
fn measure_table_normalizes_owid_columns() {
    let ds = Dataset::from_reader("co2.csv", Cursor::new(OWID_CO2)).unwrap();
    let table = MeasureTable::from_dataset(&ds, Measure::Co2, &ColumnMap::default()).unwrap();
    assert_eq!(table.measure(), Measure::Co2);
    assert_eq!(table.len(), 3);
    assert_eq!(table.records()[0], MeasureRecord::new("Albania", 2000, 3.02));
    // Empty measure cells are absent values, not zeros.
    assert_eq!(table.records()[2].value, None);
    assert_eq!(table.latest_year(), Some(2001));
}

#[test]
fn measure_table_reports_every_malformed_row() {
    let csv = "Country,Year,CO2\nA,20x0,1\nB,2001,abc\nC,2002,3\n,2003,4\n";
    let ds = Dataset::from_reader("co2.csv", Cursor::new(csv)).unwrap();
    let err = MeasureTable::from_dataset(&ds, Measure::Co2, &ColumnMap::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("parse error:"), "{msg}");
    assert!(msg.contains("3 malformed cell(s)"), "{msg}");
    assert!(msg.contains("line 2: Year \"20x0\""), "{msg}");
    assert!(msg.contains("line 3: CO2 \"abc\""), "{msg}");
    assert!(msg.contains("line 5: empty country"), "{msg}");
}

#[test]
fn measure_table_caps_reported_problems() {
    let mut csv = String::from("Country,Year,CO2\n");
    for i in 0..12 {
        csv.push_str(&format!("C{i},bad,1\n"));
    }
    let ds = Dataset::from_reader("co2.csv", Cursor::new(csv)).unwrap();
    let msg = MeasureTable::from_dataset(&ds, Measure::Co2, &ColumnMap::default())
        .unwrap_err()
        .to_string();
    assert!(msg.contains("12 malformed cell(s)"), "{msg}");
    assert!(msg.contains("and 4 more"), "{msg}");
}

#[test]
fn measure_table_missing_column_is_parse_error() {
    let ds = Dataset::from_reader("le.csv", Cursor::new("Country,Year,GDP\nA,2000,1\n")).unwrap();
    let err = MeasureTable::from_dataset(&ds, Measure::LifeExpectancy, &ColumnMap::default())
        .unwrap_err();
    assert!(matches!(err, StoryError::Parse(_)));
    assert!(err.to_string().contains("le.csv"));
}
