//! In-memory fakes and a local HTTP stub shared by unit tests.
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crossbeam_channel::{Receiver, unbounded};
use price_common::{AppendError, FetchError, SymbolSet};

use crate::clock::Clock;
use crate::config::Config;
use crate::ledger::{Destination, Ledger};
use crate::model::price_quote::{PriceEntry, PriceQuote};
use crate::model::sync_row::SyncRow;
use crate::quote_source::QuoteSource;

pub fn test_config(symbols: &str) -> Config {
    Config {
        api_key: "test-key".to_string(),
        destination_id: "sheet".to_string(),
        symbols: SymbolSet::parse_list(symbols).unwrap(),
        credentials_location: PathBuf::from("creds.json"),
        daily_trigger_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        command_port: 0,
        poll_interval: Duration::from_secs(60),
        failure_alert_threshold: 3,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn new_year_8am() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
    )
}

/// Returns the same canned result on every fetch and counts calls.
pub struct StubSource {
    result: Result<PriceQuote, FetchError>,
    pub calls: Arc<AtomicUsize>,
}

impl StubSource {
    pub fn ok(prices: &[(&str, f64)]) -> Self {
        let entries = prices
            .iter()
            .map(|(symbol, price)| (symbol.parse().unwrap(), PriceEntry::from_f64(*price)));
        Self {
            result: Ok(PriceQuote::from_entries(entries)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(err: FetchError) -> Self {
        Self {
            result: Err(err),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl QuoteSource for StubSource {
    fn fetch(&self, _symbols: &SymbolSet) -> Result<PriceQuote, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Destination that keeps appended rows in memory.
#[derive(Default)]
pub struct RecordingDestination {
    pub open_error: Option<AppendError>,
    pub append_error: Option<AppendError>,
    pub rows: Arc<Mutex<Vec<SyncRow>>>,
    pub appends: Arc<AtomicUsize>,
}

impl Destination for RecordingDestination {
    type Ledger = RecordingLedger;

    fn open(&self) -> Result<RecordingLedger, AppendError> {
        if let Some(e) = &self.open_error {
            return Err(e.clone());
        }
        Ok(RecordingLedger {
            append_error: self.append_error.clone(),
            rows: Arc::clone(&self.rows),
            appends: Arc::clone(&self.appends),
        })
    }
}

pub struct RecordingLedger {
    append_error: Option<AppendError>,
    rows: Arc<Mutex<Vec<SyncRow>>>,
    appends: Arc<AtomicUsize>,
}

impl Ledger for RecordingLedger {
    fn append_row(&mut self, row: &SyncRow) -> Result<(), AppendError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.append_error {
            return Err(e.clone());
        }
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }
}

/// Plain HTTP/1.1 server on a loopback port answering one canned response per connection.
///
/// Every request is forwarded raw (request line, headers, body) on `requests`.
pub struct HttpStub {
    pub url: String,
    pub requests: Receiver<String>,
}

impl HttpStub {
    /// Answer the next `responses.len()` connections in order, then stop listening.
    pub fn serve(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (requests_tx, requests) = unbounded();

        thread::spawn(move || {
            for (status, body) in responses {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(&stream);
                let Some(request) = read_request(&mut reader) else {
                    return;
                };
                let _ = requests_tx.send(request);
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = (&stream).write_all(reply.as_bytes());
            }
        });

        Self { url, requests }
    }

    /// Accept one connection, read the request and never answer it within `hold`.
    pub fn silent(hold: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (requests_tx, requests) = unbounded();

        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                if let Some(request) = read_request(&mut BufReader::new(&stream)) {
                    let _ = requests_tx.send(request);
                }
                thread::sleep(hold);
            }
        });

        Self { url, requests }
    }

    /// Next request seen by the stub.
    pub fn next_request(&self) -> String {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("stub should have received a request")
    }
}

fn read_request<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut head = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok()?;
            }
        }
        let end_of_head = line == "\r\n";
        head.push_str(&line);
        if end_of_head {
            break;
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;
    head.push_str(&String::from_utf8_lossy(&body));
    Some(head)
}

/// Loopback URL with nothing listening behind it.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

/// Credentials file in the temp directory, unique per test name.
pub fn write_credentials(name: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "price_sync_{}_{}.json",
        name,
        std::process::id()
    ));
    std::fs::write(&path, json).unwrap();
    path
}
