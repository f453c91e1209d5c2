use std::collections::BTreeMap;

use anyhow::Result;
use iexfinance_lib::{CloseRow, TimeSeriesRow};
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct HistoryRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Open")]
    #[serde(rename = "Open")]
    open: String,
    #[tabled(rename = "High")]
    #[serde(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    #[serde(rename = "Low")]
    low: String,
    #[tabled(rename = "Close")]
    #[serde(rename = "Close")]
    close: String,
    #[tabled(rename = "Volume")]
    #[serde(rename = "Volume")]
    volume: u64,
}

#[derive(Tabled, Serialize)]
struct CloseHistoryRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Close")]
    #[serde(rename = "Close")]
    close: String,
    #[tabled(rename = "Volume")]
    #[serde(rename = "Volume")]
    volume: u64,
}

/// One cached symbol and its coverage.
#[derive(Tabled, Serialize)]
pub struct CacheEntryRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[tabled(rename = "From")]
    #[serde(rename = "From")]
    pub from: String,
    #[tabled(rename = "To")]
    #[serde(rename = "To")]
    pub to: String,
    #[tabled(rename = "Rows")]
    #[serde(rename = "Rows")]
    pub rows: usize,
}

// -- Row builders --

fn build_history_rows(data: &BTreeMap<String, Vec<TimeSeriesRow>>) -> Vec<HistoryRow> {
    data.iter()
        .flat_map(|(symbol, rows)| {
            rows.iter().map(move |r| HistoryRow {
                symbol: symbol.clone(),
                date: r.date.to_string(),
                open: format_price(r.open),
                high: format_price(r.high),
                low: format_price(r.low),
                close: format_price(r.close),
                volume: r.volume,
            })
        })
        .collect()
}

fn build_close_rows(data: &BTreeMap<String, Vec<CloseRow>>) -> Vec<CloseHistoryRow> {
    data.iter()
        .flat_map(|(symbol, rows)| {
            rows.iter().map(move |r| CloseHistoryRow {
                symbol: symbol.clone(),
                date: r.date.to_string(),
                close: format_price(r.close),
                volume: r.volume,
            })
        })
        .collect()
}

/// Flattens a JSON object, or an array of objects, into a header row plus
/// string cells. Columns follow first appearance. Anything else is `None`.
fn flatten_records(value: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let objects: Vec<&serde_json::Map<String, Value>> = match value {
        Value::Object(map) => vec![map],
        Value::Array(items) if !items.is_empty() => {
            items.iter().map(Value::as_object).collect::<Option<_>>()?
        }
        _ => return None,
    };

    let mut headers: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let rows = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();
    Some((headers, rows))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn dynamic_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    builder.build()
}

// -- Table output --

pub fn print_history_table(data: &BTreeMap<String, Vec<TimeSeriesRow>>) {
    println!("{}", Table::new(build_history_rows(data)));
}

pub fn print_closes_table(data: &BTreeMap<String, Vec<CloseRow>>) {
    println!("{}", Table::new(build_close_rows(data)));
}

pub fn print_cache_table(entries: &[CacheEntryRow]) {
    println!("{}", Table::new(entries));
}

// -- Markdown output --

pub fn print_history_markdown(data: &BTreeMap<String, Vec<TimeSeriesRow>>) {
    let mut table = Table::new(build_history_rows(data));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_closes_markdown(data: &BTreeMap<String, Vec<CloseRow>>) {
    let mut table = Table::new(build_close_rows(data));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_cache_markdown(entries: &[CacheEntryRow]) {
    let mut table = Table::new(entries);
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_history_csv(data: &BTreeMap<String, Vec<TimeSeriesRow>>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_history_rows(data) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_closes_csv(data: &BTreeMap<String, Vec<CloseRow>>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_close_rows(data) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_cache_csv(entries: &[CacheEntryRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for entry in entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- Raw resources --

/// Prints a non-historical response. Flat objects and arrays of objects get
/// tabular output; other shapes fall back to JSON.
pub fn print_value(value: &Value, format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        print_json(value);
        return Ok(());
    }
    let Some((headers, rows)) = flatten_records(value) else {
        print_json(value);
        return Ok(());
    };
    match format {
        OutputFormat::Table => println!("{}", dynamic_table(headers, rows)),
        OutputFormat::Markdown => {
            let mut table = dynamic_table(headers, rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(&headers)?;
            for row in rows {
                wtr.write_record(&row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(value),
    }
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}
