//!
//! Common types shared by the price sync daemon and anything that drives it.
//!
//! This crate aggregates:
//! - `error` — cycle-scoped, startup and plumbing error types.
//! - `result` — handy `Result<T, SyncError>` alias.
//! - `symbols` — validated tickers and the ordered `SymbolSet`.
//! - `command` — text commands accepted on the manual-trigger port.
//! - `net` — endpoints, ports and timeouts.
#![warn(missing_docs)]
pub mod command;
pub mod error;
pub mod net;
pub mod result;
pub mod symbols;

pub use error::{AppendError, ConcurrencyRejected, ConfigError, FetchError, SyncError};
pub use result::Result;
pub use symbols::{Symbol, SymbolSet};
