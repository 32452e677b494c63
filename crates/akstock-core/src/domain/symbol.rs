use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{BatchRejection, ValidationError};

const SYMBOL_LEN: usize = 6;

/// Maximum number of symbols accepted by one batch request.
pub const MAX_BATCH_SYMBOLS: usize = 20;

/// Six-digit A-share security code, kept in string form so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Trim and validate a symbol.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if !is_six_digits(trimmed) {
            return Err(ValidationError::InvalidSymbol {
                value: input.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exchange suffix used by the Eastmoney datacenter (`SH`, `SZ` or `BJ`).
    pub fn exchange(&self) -> &'static str {
        match self.0.as_bytes()[0] {
            b'6' | b'9' => "SH",
            b'4' | b'8' => "BJ",
            _ => "SZ",
        }
    }

    /// `600519.SH` style security code.
    pub fn secucode(&self) -> String {
        format!("{}.{}", self.0, self.exchange())
    }

    /// `1.600519` style market-prefixed id used by quote endpoints.
    pub fn secid(&self) -> String {
        let market = if self.exchange() == "SH" { 1 } else { 0 };
        format!("{market}.{}", self.0)
    }
}

fn is_six_digits(value: &str) -> bool {
    value.len() == SYMBOL_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

/// True when the trimmed input is exactly six ASCII digits.
pub fn validate_symbol(input: &str) -> bool {
    is_six_digits(input.trim())
}

/// Check count and format constraints for a batch of raw symbols.
pub fn validate_symbol_batch(symbols: &[String], max_count: usize) -> Result<(), BatchRejection> {
    if symbols.is_empty() {
        return Err(BatchRejection::EmptyInput);
    }

    if symbols.len() > max_count {
        return Err(BatchRejection::TooMany {
            count: symbols.len(),
            max: max_count,
        });
    }

    let invalid: Vec<String> = symbols
        .iter()
        .filter(|symbol| !validate_symbol(symbol))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(BatchRejection::InvalidFormat { symbols: invalid });
    }

    Ok(())
}

pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    symbols.iter().map(|s| s.trim().to_owned()).collect()
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims_symbol() {
        let parsed = Symbol::parse(" 000001 ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "000001");
    }

    #[test]
    fn validate_symbol_requires_exactly_six_ascii_digits() {
        assert!(validate_symbol("600519"));
        assert!(validate_symbol("\t600519\n"));
        assert!(!validate_symbol("60051"));
        assert!(!validate_symbol("6005190"));
        assert!(!validate_symbol("60051a"));
        assert!(!validate_symbol(""));
        assert!(!validate_symbol("６００５１９"));
        assert!(!validate_symbol("600 519"));
    }

    #[test]
    fn trimming_is_idempotent() {
        let once = normalize_symbols(&[String::from("  600519 ")]);
        let twice = normalize_symbols(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn batch_of_twenty_one_is_rejected_regardless_of_content() {
        let symbols: Vec<String> = (0..21).map(|_| String::from("bad")).collect();
        assert_eq!(
            validate_symbol_batch(&symbols, MAX_BATCH_SYMBOLS),
            Err(BatchRejection::TooMany { count: 21, max: 20 })
        );
    }

    #[test]
    fn batch_names_malformed_entries_in_order() {
        let symbols = vec![
            String::from("x1"),
            String::from("000001"),
            String::from("abcde"),
        ];
        assert_eq!(
            validate_symbol_batch(&symbols, MAX_BATCH_SYMBOLS),
            Err(BatchRejection::InvalidFormat {
                symbols: vec![String::from("x1"), String::from("abcde")],
            })
        );
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_eq!(
            validate_symbol_batch(&[], MAX_BATCH_SYMBOLS),
            Err(BatchRejection::EmptyInput)
        );
    }

    #[test]
    fn maps_exchanges() {
        assert_eq!(Symbol::parse("600519").expect("valid").secucode(), "600519.SH");
        assert_eq!(Symbol::parse("000001").expect("valid").secid(), "0.000001");
        assert_eq!(Symbol::parse("830799").expect("valid").exchange(), "BJ");
    }
}
