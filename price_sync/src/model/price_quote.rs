//! Prices obtained for one cycle.
//!
//! A `PriceQuote` is built once from an upstream response and never mutated. Lookups are
//! total: any symbol the upstream did not return resolves to `PriceEntry::Unavailable`.

use std::collections::HashMap;
use std::fmt;

use price_common::{Symbol, SymbolSet};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Decimal places kept for every price.
pub const PRICE_SCALE: u32 = 4;
/// Text written in place of a missing price.
pub const UNAVAILABLE: &str = "unavailable";

/// Either a rounded price or the unavailable sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceEntry {
    /// Price in the base currency, rounded to `PRICE_SCALE` places.
    Price(Decimal),
    /// The upstream response had no usable price for this symbol.
    Unavailable,
}

impl PriceEntry {
    /// Round a raw upstream price. Non-finite input becomes `Unavailable`.
    pub fn from_f64(raw: f64) -> Self {
        match Decimal::from_f64_retain(raw) {
            Some(value) => PriceEntry::Price(value.round_dp(PRICE_SCALE).normalize()),
            None => PriceEntry::Unavailable,
        }
    }

    /// JSON cell for the spreadsheet: a number, or the sentinel string.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PriceEntry::Price(value) => value
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(value.to_string())),
            PriceEntry::Unavailable => serde_json::Value::String(UNAVAILABLE.to_string()),
        }
    }
}

impl fmt::Display for PriceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceEntry::Price(value) => write!(f, "{}", value),
            PriceEntry::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Symbol to price mapping for one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuote {
    prices: HashMap<Symbol, Decimal>,
}

impl PriceQuote {
    /// Build from whatever the upstream returned; symbols with no entry stay unavailable.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, PriceEntry)>,
    {
        let prices = entries
            .into_iter()
            .filter_map(|(symbol, entry)| match entry {
                PriceEntry::Price(value) => Some((symbol, value)),
                PriceEntry::Unavailable => None,
            })
            .collect();
        Self { prices }
    }

    /// Total lookup; never fails.
    pub fn entry(&self, symbol: &Symbol) -> PriceEntry {
        self.prices
            .get(symbol)
            .copied()
            .map_or(PriceEntry::Unavailable, PriceEntry::Price)
    }

    /// Requested symbols with no price, in set order.
    pub fn missing<'a>(&'a self, symbols: &'a SymbolSet) -> impl Iterator<Item = &'a Symbol> + 'a {
        symbols.iter().filter(move |s| !self.prices.contains_key(*s))
    }
}
