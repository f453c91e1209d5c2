use chrono::NaiveDate;
use regex::Regex;

use crate::error::IexFinanceError;

/// Most symbols the batch endpoint accepts in one call.
pub const MAX_BATCH_SYMBOLS: usize = 100;

// Letters, digits, and the class/share separators IEX uses (BRK.B, BF-B).
const SYMBOL_PATTERN: &str = r"^[A-Z0-9][A-Z0-9.\-]{0,15}$";

fn symbol_regex() -> Result<Regex, IexFinanceError> {
    Regex::new(SYMBOL_PATTERN)
        .map_err(|e| IexFinanceError::InvalidInput(format!("bad symbol pattern: {}", e)))
}

/// Validate a ticker: trim, uppercase, check against the allowed characters.
pub fn validate_symbol(input: &str) -> Result<String, IexFinanceError> {
    check_symbol(&symbol_regex()?, input)
}

fn check_symbol(re: &Regex, input: &str) -> Result<String, IexFinanceError> {
    let upper = input.trim().to_uppercase();
    if re.is_match(&upper) {
        Ok(upper)
    } else {
        Err(IexFinanceError::InvalidInput(format!(
            "invalid symbol '{}'. Expected 1-16 letters, digits, '.', or '-' (e.g., AAPL, BRK.B)",
            input
        )))
    }
}

/// Validate a list of tickers: non-empty, at most [`MAX_BATCH_SYMBOLS`],
/// duplicates removed with the first occurrence's position kept.
pub fn validate_symbols<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>, IexFinanceError> {
    if inputs.is_empty() {
        return Err(IexFinanceError::InvalidInput(
            "please provide a symbol or list of symbols".to_string(),
        ));
    }
    if inputs.len() > MAX_BATCH_SYMBOLS {
        return Err(IexFinanceError::InvalidInput(format!(
            "at most {} symbols may be requested at once, got {}",
            MAX_BATCH_SYMBOLS,
            inputs.len()
        )));
    }
    let re = symbol_regex()?;
    let mut out: Vec<String> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let symbol = check_symbol(&re, input.as_ref())?;
        if !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    Ok(out)
}

/// Validate a YYYY-MM-DD date string.
pub fn validate_date(input: &str) -> Result<NaiveDate, IexFinanceError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        IexFinanceError::InvalidInput(format!(
            "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2017-02-09)",
            trimmed
        ))
    })
}

/// Validate a region code: 2-letter ISO code, normalized to lowercase.
pub fn validate_region(input: &str) -> Result<String, IexFinanceError> {
    let trimmed = input.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_lowercase())
    } else {
        Err(IexFinanceError::InvalidInput(format!(
            "invalid region '{}'. Expected 2-letter ISO code (e.g., us, ca)",
            input
        )))
    }
}

/// Validate an exchange code: letters only, normalized to lowercase.
pub fn validate_exchange(input: &str) -> Result<String, IexFinanceError> {
    let trimmed = input.trim();
    if (2..=8).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_lowercase())
    } else {
        Err(IexFinanceError::InvalidInput(format!(
            "invalid exchange '{}'. Expected 2-8 letters (e.g., tse, lon)",
            input
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_uppercased() {
        assert_eq!(validate_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(validate_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(validate_symbol("BTCUSDT").unwrap(), "BTCUSDT");
    }

    #[test]
    fn symbol_rejects_garbage() {
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("AA PL").is_err());
        assert!(validate_symbol("../etc").is_err());
        assert!(validate_symbol(&"A".repeat(17)).is_err());
    }

    #[test]
    fn symbols_dedup_preserves_order() {
        let out = validate_symbols(&["msft", "AAPL", "MSFT"]).unwrap();
        assert_eq!(out, vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn symbols_empty_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            validate_symbols(&empty),
            Err(IexFinanceError::InvalidInput(_))
        ));
    }

    #[test]
    fn symbols_over_limit_rejected() {
        let many: Vec<String> = (0..=MAX_BATCH_SYMBOLS).map(|i| format!("S{}", i)).collect();
        assert!(validate_symbols(&many).is_err());
    }

    #[test]
    fn date_parses_iso() {
        assert_eq!(
            validate_date("2017-02-09").unwrap(),
            NaiveDate::from_ymd_opt(2017, 2, 9).unwrap()
        );
        assert!(validate_date("02/09/2017").is_err());
    }

    #[test]
    fn region_and_exchange() {
        assert_eq!(validate_region("US").unwrap(), "us");
        assert!(validate_region("USA").is_err());
        assert_eq!(validate_exchange("TSE").unwrap(), "tse");
        assert!(validate_exchange("t5e").is_err());
    }
}
