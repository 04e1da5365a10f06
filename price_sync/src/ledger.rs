//! Append-only spreadsheet destination.
//!
//! A `Destination` is the fixed, addressable target; `open` validates that it is reachable
//! with the current credentials and yields a `Ledger` handle for the cycle. The handle
//! appends rows as given: no reads, no deduplication, no shape checks.
//!
//! The Google Sheets implementation authenticates with a bearer access token read from
//! the credentials file on every `open`, so an external refresher can rotate it.
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use price_common::net::SHEETS_API_URL;
use price_common::{AppendError, SyncError};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::model::sync_row::SyncRow;
use crate::quote_source::truncate;

/// Range anchor for appends: the table on the first sheet.
const APPEND_RANGE: &str = "A1";

/// Handle to an opened destination.
pub trait Ledger {
    /// Append `row` after the last row of the destination.
    fn append_row(&mut self, row: &SyncRow) -> Result<(), AppendError>;
}

/// Fixed destination that can be opened once per cycle.
pub trait Destination {
    /// Handle produced by a successful `open`.
    type Ledger: Ledger;

    /// Authenticate and check the destination exists.
    fn open(&self) -> Result<Self::Ledger, AppendError>;
}

/// Contents of the credentials file.
#[derive(Debug, Deserialize)]
struct Credentials {
    #[serde(alias = "token")]
    access_token: String,
}

impl Credentials {
    fn from_json(raw: &str) -> Result<Self, AppendError> {
        let credentials: Credentials = serde_json::from_str(raw)
            .map_err(|e| AppendError::Auth(format!("invalid credentials file: {}", e)))?;
        if credentials.access_token.trim().is_empty() {
            return Err(AppendError::Auth("empty access token".to_string()));
        }
        Ok(credentials)
    }

    fn load(path: &Path) -> Result<Self, AppendError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppendError::Auth(format!("cannot read credentials {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }
}

/// Google Sheets spreadsheet addressed by id.
pub struct SheetsDestination {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    credentials_location: PathBuf,
}

impl SheetsDestination {
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        Self::with_base_url(config, SHEETS_API_URL)
    }

    /// Same as `new` but against another API root.
    pub fn with_base_url(config: &Config, base_url: &str) -> Result<Self, SyncError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SyncError::Setup(format!("sheets HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.destination_id.clone(),
            credentials_location: config.credentials_location.clone(),
        })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/{}", self.base_url, self.spreadsheet_id)
    }
}

impl Destination for SheetsDestination {
    type Ledger = SheetsLedger;

    fn open(&self) -> Result<SheetsLedger, AppendError> {
        let credentials = Credentials::load(&self.credentials_location)?;
        let url = self.spreadsheet_url();
        debug!("Opening spreadsheet {}", self.spreadsheet_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&credentials.access_token)
            .query(&[("fields", "spreadsheetId")])
            .send()
            .map_err(|e| AppendError::Io(e.to_string()))?;
        check_status(response)?;

        Ok(SheetsLedger {
            client: self.client.clone(),
            append_url: format!("{}/values/{}:append", url, APPEND_RANGE),
            access_token: credentials.access_token,
        })
    }
}

/// Opened spreadsheet ready for appends.
pub struct SheetsLedger {
    client: Client,
    append_url: String,
    access_token: String,
}

impl Ledger for SheetsLedger {
    fn append_row(&mut self, row: &SyncRow) -> Result<(), AppendError> {
        let body = serde_json::json!({ "values": [row.to_json_values()] });
        let response = self
            .client
            .post(&self.append_url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body)
            .send()
            .map_err(|e| AppendError::Io(e.to_string()))?;
        check_status(response)
    }
}

fn check_status(response: reqwest::blocking::Response) -> Result<(), AppendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().unwrap_or_default();
    Err(status_error(status.as_u16(), &body))
}

/// Classify a failed destination response.
fn status_error(status: u16, body: &str) -> AppendError {
    let detail = format!("HTTP {}: {}", status, truncate(body.trim()));
    match status {
        401 | 403 => AppendError::Auth(detail),
        429 => AppendError::Quota(detail),
        _ => AppendError::Io(detail),
    }
}
