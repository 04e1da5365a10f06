//! Tracked currency symbols and the ordered set that defines row layout.

use std::collections::HashSet;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::ConfigError;

/// A validated ticker such as `BTC` or `USDe`.
///
/// Symbols are ASCII alphanumeric and keep the case they were configured with, since a
/// few listed tickers are mixed case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Borrow the ticker text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidSymbol(s.to_string()));
        }
        Ok(Symbol(trimmed.to_string()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty ordered set of distinct symbols.
///
/// Order is significant: column `i + 1` of every sync row belongs to `symbols[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet(Vec<Symbol>);

impl SymbolSet {
    /// Build a set, rejecting empty input and duplicates. `eth` and `ETH` count as the
    /// same symbol: the quote API resolves them to one listing.
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::EmptySymbols);
        }
        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str().to_ascii_uppercase()) {
                return Err(ConfigError::DuplicateSymbol(symbol.to_string()));
            }
        }
        Ok(SymbolSet(symbols))
    }

    /// Parse a list separated by commas and/or whitespace, e.g. `"BTC, ETH SOL"`.
    pub fn parse_list(raw: &str) -> Result<Self, ConfigError> {
        let symbols = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(Symbol::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(symbols)
    }

    /// Number of tracked symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in column order.
    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.0.iter()
    }

    /// Comma-joined form used in the quote request (`BTC,ETH`).
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// File parsing for symbol sets.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Each non-empty line is one symbol; lines starting with `#` are skipped.
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<SymbolSet, ConfigError>;
}

impl SymbolParser for SymbolSet {
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<SymbolSet, ConfigError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(|e| ConfigError::SymbolsFile(e.to_string()))?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            symbols.push(trimmed_line.parse::<Symbol>()?);
        }
        SymbolSet::new(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn symbols_are_trimmed_and_keep_their_case() {
        let symbol: Symbol = " USDe ".parse().unwrap();
        assert_eq!(symbol.as_str(), "USDe");
        assert_eq!(symbol.to_string(), "USDe");
    }

    #[test]
    fn rejects_non_alphanumeric_symbols() {
        assert_eq!(
            "BTC-USD".parse::<Symbol>(),
            Err(ConfigError::InvalidSymbol("BTC-USD".to_string()))
        );
        assert!("".parse::<Symbol>().is_err());
    }

    #[test]
    fn parse_list_keeps_order() {
        let set = SymbolSet::parse_list("ARB, STRK ZK,W").unwrap();
        let names: Vec<&str> = set.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["ARB", "STRK", "ZK", "W"]);
        assert_eq!(set.joined(), "ARB,STRK,ZK,W");
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn empty_and_duplicate_sets_are_rejected() {
        assert_eq!(SymbolSet::parse_list(" , "), Err(ConfigError::EmptySymbols));
        assert_eq!(
            SymbolSet::parse_list("BTC,ETH,BTC"),
            Err(ConfigError::DuplicateSymbol("BTC".to_string()))
        );
    }

    #[test]
    fn duplicates_are_detected_ignoring_case() {
        assert_eq!(
            SymbolSet::parse_list("BTC,USDe,usde"),
            Err(ConfigError::DuplicateSymbol("usde".to_string()))
        );
    }

    #[test]
    fn reader_skips_blank_lines_and_comments() {
        let input = Cursor::new("# majors\nBTC\n\n  ETH  \nUSDe\n");
        let set = SymbolSet::parse_from_reader(input).unwrap();
        assert_eq!(set.joined(), "BTC,ETH,USDe");
    }
}
