//! Shared networking constants and helpers.
use std::time::Duration;

/// TCP port for the manual-trigger command channel.
pub const COMMAND_PORT: u16 = 8080;
/// Quote endpoint (CoinMarketCap latest quotes, v1 shape keyed by symbol).
pub const QUOTES_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";
/// Google Sheets REST root.
pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
/// All prices are requested in this currency.
pub const BASE_CURRENCY: &str = "USD";
/// Upper bound on a single quote request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Helper to format an IPv4 address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
