//! Error types shared across the workspace.
//!
//! Errors are split by the scope in which they can occur:
//! - `ConfigError` — startup only; the process refuses to arm the scheduler.
//! - `FetchError` / `AppendError` — scoped to a single sync cycle and never fatal.
//! - `ConcurrencyRejected` — a trigger that arrived while a cycle was running.
//! - `SyncError` — process plumbing (sockets, HTTP clients, signal handler) used with
//!   `result::Result`.
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Invalid or missing configuration detected at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required option was not supplied through flags, environment or `.env`.
    #[error("missing required option `{0}`")]
    Missing(&'static str),

    /// An option was supplied but could not be interpreted.
    #[error("invalid value for `{option}`: {reason}")]
    Invalid {
        /// Option name as exposed to users.
        option: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// A symbol string is not a valid ticker.
    #[error("invalid symbol `{0}`")]
    InvalidSymbol(String),

    /// The symbol set was empty.
    #[error("symbol set must not be empty")]
    EmptySymbols,

    /// The same symbol was listed twice.
    #[error("duplicate symbol `{0}`")]
    DuplicateSymbol(String),

    /// The symbols file could not be read.
    #[error("cannot read symbols file: {0}")]
    SymbolsFile(String),
}

/// Failure of a single quote request. Never retried inside the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within the fixed timeout.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure (DNS, TLS, reset, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The quote API answered with a non-success status code.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// The body was not JSON or lacked the top-level `data` key.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure while opening or appending to the ledger destination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppendError {
    /// Credentials missing, unreadable or rejected (401/403).
    #[error("Auth error: {0}")]
    Auth(String),

    /// Transport failure or unexpected status from the destination.
    #[error("I/O error: {0}")]
    Io(String),

    /// The destination refused the write because of a quota (429).
    #[error("Quota exceeded: {0}")]
    Quota(String),
}

/// A trigger was refused because another cycle holds the guard.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("a sync cycle is already in progress")]
pub struct ConcurrencyRejected;

/// Unified error type for process plumbing.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Wrapper for underlying `std::io::Error` values (sockets, log file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration was rejected at startup.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Free-form setup failure (signal handler, HTTP client construction).
    #[error("Setup error: {0}")]
    Setup(String),
}
