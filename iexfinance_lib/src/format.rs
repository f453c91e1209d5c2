//! Record-oriented JSON views of historical rows.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::series::{CloseRow, Dated, TimeSeriesRow};

fn keyed_by_date<R: Dated>(rows: &[R], fields: impl Fn(&R) -> Value) -> Value {
    let mut out = Map::with_capacity(rows.len());
    for row in rows {
        out.insert(row.date().format("%Y-%m-%d").to_string(), fields(row));
    }
    Value::Object(out)
}

fn keyed_by_symbol<R>(data: &BTreeMap<String, Vec<R>>, by_date: impl Fn(&[R]) -> Value) -> Value {
    let out: Map<String, Value> = data
        .iter()
        .map(|(symbol, rows)| (symbol.clone(), by_date(rows)))
        .collect();
    Value::Object(out)
}

/// Renders rows as `{"YYYY-MM-DD": {"open": .., "high": .., ..}}`.
pub fn records_by_date(rows: &[TimeSeriesRow]) -> Value {
    keyed_by_date(rows, |row| {
        json!({
            "open": row.open,
            "high": row.high,
            "low": row.low,
            "close": row.close,
            "volume": row.volume,
        })
    })
}

/// Renders a batch result as `{"SYM": {"YYYY-MM-DD": {..}}}`.
pub fn records_by_symbol(data: &BTreeMap<String, Vec<TimeSeriesRow>>) -> Value {
    keyed_by_symbol(data, records_by_date)
}

/// Renders close-only rows as `{"YYYY-MM-DD": {"close": .., "volume": ..}}`.
pub fn close_records_by_date(rows: &[CloseRow]) -> Value {
    keyed_by_date(rows, |row| json!({"close": row.close, "volume": row.volume}))
}

pub fn close_records_by_symbol(data: &BTreeMap<String, Vec<CloseRow>>) -> Value {
    keyed_by_symbol(data, close_records_by_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, close: f64) -> TimeSeriesRow {
        TimeSeriesRow {
            date: NaiveDate::from_ymd_opt(2017, 2, day).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close,
            volume: 42,
        }
    }

    #[test]
    fn keyed_by_iso_date() {
        let value = records_by_date(&[row(9, 821.36), row(10, 823.0)]);
        assert_eq!(value["2017-02-09"]["close"], json!(821.36));
        assert_eq!(value["2017-02-10"]["volume"], json!(42));
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn empty_rows_give_empty_object() {
        assert_eq!(records_by_date(&[]), json!({}));
    }

    #[test]
    fn nested_by_symbol() {
        let mut data = BTreeMap::new();
        data.insert("AMZN".to_string(), vec![row(9, 821.36)]);
        data.insert("AAPL".to_string(), vec![]);
        let value = records_by_symbol(&data);
        assert_eq!(value["AMZN"]["2017-02-09"]["close"], json!(821.36));
        assert_eq!(value["AAPL"], json!({}));
    }

    #[test]
    fn close_records_have_only_close_and_volume() {
        let rows = crate::series::close_only(&[row(9, 821.36)]);
        let value = close_records_by_date(&rows);
        let record = value["2017-02-09"].as_object().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["close"], json!(821.36));
        assert!(record.get("open").is_none());

        let mut data = BTreeMap::new();
        data.insert("AMZN".to_string(), rows);
        assert_eq!(close_records_by_symbol(&data)["AMZN"], value);
    }
}
