use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse lookback window accepted by the chart endpoint's `range` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartRange {
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl ChartRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::FiveDays => "5d",
            ChartRange::OneMonth => "1m",
            ChartRange::ThreeMonths => "3m",
            ChartRange::SixMonths => "6m",
            ChartRange::YearToDate => "ytd",
            ChartRange::OneYear => "1y",
            ChartRange::TwoYears => "2y",
            ChartRange::FiveYears => "5y",
            ChartRange::Max => "max",
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5d" => Ok(ChartRange::FiveDays),
            "1m" => Ok(ChartRange::OneMonth),
            "3m" => Ok(ChartRange::ThreeMonths),
            "6m" => Ok(ChartRange::SixMonths),
            "ytd" => Ok(ChartRange::YearToDate),
            "1y" => Ok(ChartRange::OneYear),
            "2y" => Ok(ChartRange::TwoYears),
            "5y" => Ok(ChartRange::FiveYears),
            "max" => Ok(ChartRange::Max),
            _ => Err(format!("invalid chart range '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("5Y".parse::<ChartRange>(), Ok(ChartRange::FiveYears));
        assert_eq!("ytd".parse::<ChartRange>(), Ok(ChartRange::YearToDate));
        assert!("7y".parse::<ChartRange>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ChartRange::TwoYears).unwrap();
        assert_eq!(json, "\"2y\"");
    }
}
