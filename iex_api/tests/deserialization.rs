use chrono::NaiveDate;
use iex_api::types::{BatchResponse, ChartBar};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_chart_batch() {
    let json = load_fixture("chart_batch.json");
    let resp: BatchResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.len(), 2);

    let aapl = &resp["AAPL"].chart;
    assert_eq!(aapl.len(), 3);
    assert_eq!(aapl[0].date, NaiveDate::from_ymd_opt(2024, 6, 12).unwrap());
    assert_eq!(aapl[0].close, 213.07);
    assert_eq!(aapl[0].volume, 198134293);
    assert_eq!(aapl[0].label.as_deref(), Some("Jun 12, 24"));
    assert_eq!(aapl[2].change, Some(-1.75));
}

#[test]
fn deserialize_bar_without_optional_fields() {
    let json = load_fixture("chart_batch.json");
    let resp: BatchResponse = serde_json::from_str(&json).unwrap();

    let msft = &resp["MSFT"].chart;
    assert_eq!(msft.len(), 2);
    assert_eq!(msft[1].high, 443.39);
    assert!(msft[1].vwap.is_none());
    assert!(msft[1].unadjusted_volume.is_none());
}

#[test]
fn deserialize_entry_without_chart() {
    let resp: BatchResponse = serde_json::from_str(r#"{"AAPL": {}}"#).unwrap();
    assert!(resp["AAPL"].chart.is_empty());
}

#[test]
fn bar_with_bad_date_is_rejected() {
    let json = r#"{"date": "06/12/2024", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1}"#;
    assert!(serde_json::from_str::<ChartBar>(json).is_err());
}
