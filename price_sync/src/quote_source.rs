//! Price retrieval from the quote API.
//!
//! One request covers the whole symbol set. Prices live at
//! `data.<SYMBOL>.quote.USD.price`; a symbol missing from `data` (or carrying a null
//! price) degrades to unavailable instead of failing the request. Keys are matched
//! exactly first, then ignoring ASCII case.
use std::time::Duration;

use log::{debug, info};
use price_common::net::{BASE_CURRENCY, FETCH_TIMEOUT, QUOTES_URL};
use price_common::{FetchError, Symbol, SymbolSet, SyncError};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::Config;
use crate::model::price_quote::{PriceEntry, PriceQuote};

/// Longest slice of an upstream body kept in error messages.
const MAX_DIAGNOSTIC_LEN: usize = 512;

/// Source of current prices for a symbol set.
pub trait QuoteSource {
    /// Fetch prices for every symbol in one call. No retries.
    fn fetch(&self, symbols: &SymbolSet) -> Result<PriceQuote, FetchError>;
}

/// CoinMarketCap `quotes/latest` client.
pub struct CoinMarketCapSource {
    client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl CoinMarketCapSource {
    /// Build a client with the fixed request timeout.
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        Self::with_url(config, QUOTES_URL, FETCH_TIMEOUT)
    }

    /// Same as `new` but against another endpoint (sandbox, proxy).
    pub fn with_url(config: &Config, url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Setup(format!("quote HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl QuoteSource for CoinMarketCapSource {
    fn fetch(&self, symbols: &SymbolSet) -> Result<PriceQuote, FetchError> {
        info!("Requesting {} quotes for {}", BASE_CURRENCY, symbols.joined());

        let response = self
            .client
            .get(&self.url)
            .header("Accepts", "application/json")
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .query(&[("symbol", symbols.joined().as_str()), ("convert", BASE_CURRENCY)])
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let body = response.bytes().map_err(|e| self.transport_error(e))?;
        debug!("Quote response: {} bytes", body.len());
        parse_quotes(&body, symbols)
    }
}

/// Turn a response body into a quote covering every requested symbol.
pub fn parse_quotes(body: &[u8], symbols: &SymbolSet) -> Result<PriceQuote, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        FetchError::MalformedResponse(format!(
            "{}: {}",
            e,
            truncate(&String::from_utf8_lossy(body))
        ))
    })?;

    let data = value
        .get("data")
        .filter(|data| data.is_object())
        .ok_or_else(|| {
            FetchError::MalformedResponse(format!("missing `data` key: {}", truncate(&value.to_string())))
        })?;

    let entries = symbols
        .iter()
        .map(|symbol| (symbol.clone(), price_for(data, symbol)))
        .collect::<Vec<_>>();
    Ok(PriceQuote::from_entries(entries))
}

/// Total lookup into `data`; the v2 API wraps each symbol in an array, so take the first.
fn price_for(data: &Value, symbol: &Symbol) -> PriceEntry {
    let keyed = data.get(symbol.as_str()).or_else(|| {
        data.as_object()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(symbol.as_str()))
            .map(|(_, value)| value)
    });
    let entry = match keyed {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    entry
        .and_then(|e| e.get("quote"))
        .and_then(|q| q.get(BASE_CURRENCY))
        .and_then(|usd| usd.get("price"))
        .and_then(Value::as_f64)
        .map_or(PriceEntry::Unavailable, PriceEntry::from_f64)
}

/// Cap `text` at `MAX_DIAGNOSTIC_LEN` characters for error messages.
pub(crate) fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_DIAGNOSTIC_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
