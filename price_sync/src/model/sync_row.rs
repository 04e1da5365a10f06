//! One spreadsheet row: a minute-resolution timestamp followed by one price per symbol.

use std::fmt;

use chrono::NaiveDateTime;
use price_common::SymbolSet;

use crate::model::price_quote::{PriceEntry, PriceQuote};

/// Timestamp layout of the first column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Immutable row appended exactly once to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRow {
    timestamp: String,
    cells: Vec<PriceEntry>,
}

impl SyncRow {
    /// Build a row in `symbols` order, whatever the quote actually contains.
    pub fn build(at: NaiveDateTime, symbols: &SymbolSet, quote: &PriceQuote) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            cells: symbols.iter().map(|symbol| quote.entry(symbol)).collect(),
        }
    }

    /// Formatted timestamp column.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Price columns in symbol order.
    pub fn cells(&self) -> &[PriceEntry] {
        &self.cells
    }

    /// Column count, timestamp included.
    pub fn len(&self) -> usize {
        1 + self.cells.len()
    }

    /// Values as sent to the spreadsheet API.
    pub fn to_json_values(&self) -> Vec<serde_json::Value> {
        std::iter::once(serde_json::Value::String(self.timestamp.clone()))
            .chain(self.cells.iter().map(PriceEntry::to_json))
            .collect()
    }
}

impl fmt::Display for SyncRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.timestamp)?;
        for cell in &self.cells {
            write!(f, ", {}", cell)?;
        }
        f.write_str("]")
    }
}
