//! One synchronization cycle: open the ledger, fetch prices, build a row, append it.
//!
//! A cycle is all-or-nothing from the caller's view: either a full row lands or nothing
//! is written. Fetch and append errors never escape `run`; they become
//! `JobResult::Failure` and are logged in full. There are no retries here, a failed cycle
//! waits for the next trigger.
//!
//! The job also counts consecutive failures. Once the count reaches the configured
//! threshold every further failure is logged as an escalation until a cycle succeeds.
use std::fmt;

use log::{error, info, warn};
use price_common::{AppendError, FetchError, SymbolSet};
use thiserror::Error;

use crate::clock::Clock;
use crate::config::Config;
use crate::ledger::{Destination, Ledger};
use crate::model::price_quote::UNAVAILABLE;
use crate::model::sync_row::SyncRow;
use crate::quote_source::QuoteSource;

/// Why a cycle did not write its row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleFailure {
    /// The destination could not be opened; prices were not requested.
    #[error("ledger unreachable: {0}")]
    LedgerUnreachable(AppendError),

    /// The quote request failed; nothing was written.
    #[error("{0}")]
    Fetch(FetchError),

    /// The row was built but the destination refused it.
    #[error("append failed: {source}")]
    Append {
        /// The row that was not written, kept for manual recovery.
        row: SyncRow,
        source: AppendError,
    },
}

/// Outcome of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum JobResult {
    Success(SyncRow),
    Failure(CycleFailure),
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success(_))
    }
}

/// One-line acknowledgement, suitable for a dialog or a reply line.
impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobResult::Success(row) => write!(f, "OK {}", row),
            JobResult::Failure(failure) => write!(f, "FAILED {}", failure),
        }
    }
}

/// Anything the scheduler can run under its guard.
pub trait Cycle {
    fn run(&mut self) -> JobResult;
}

/// The price sync job.
pub struct SyncJob<Q, D, C> {
    symbols: SymbolSet,
    source: Q,
    destination: D,
    clock: C,
    failure_alert_threshold: u32,
    consecutive_failures: u32,
}

impl<Q, D, C> SyncJob<Q, D, C>
where
    Q: QuoteSource,
    D: Destination,
    C: Clock,
{
    pub fn new(config: &Config, source: Q, destination: D, clock: C) -> Self {
        Self {
            symbols: config.symbols.clone(),
            source,
            destination,
            clock,
            failure_alert_threshold: config.failure_alert_threshold,
            consecutive_failures: 0,
        }
    }

    /// Failed cycles since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn cycle(&self) -> JobResult {
        let mut ledger = match self.destination.open() {
            Ok(ledger) => ledger,
            Err(e) => {
                error!("Ledger unreachable, skipping quote request: {}", e);
                return JobResult::Failure(CycleFailure::LedgerUnreachable(e));
            }
        };

        let quote = match self.source.fetch(&self.symbols) {
            Ok(quote) => quote,
            Err(e) => {
                error!("Quote request failed: {}", e);
                return JobResult::Failure(CycleFailure::Fetch(e));
            }
        };

        for symbol in quote.missing(&self.symbols) {
            warn!("No price for {} in quote response, writing `{}`", symbol, UNAVAILABLE);
        }

        let row = SyncRow::build(self.clock.now(), &self.symbols, &quote);
        match ledger.append_row(&row) {
            Ok(()) => {
                info!("Row appended: {}", row);
                JobResult::Success(row)
            }
            Err(e) => {
                error!("Append failed: {}. Unwritten row for manual recovery: {}", e, row);
                JobResult::Failure(CycleFailure::Append { row, source: e })
            }
        }
    }

    fn record(&mut self, result: &JobResult) {
        match result {
            JobResult::Success(_) => {
                if self.consecutive_failures > 0 {
                    info!(
                        "Sync recovered after {} failed cycle(s)",
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;
            }
            JobResult::Failure(failure) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.failure_alert_threshold > 0
                    && self.consecutive_failures >= self.failure_alert_threshold
                {
                    error!(
                        "Sync has failed {} consecutive cycles (alert threshold {}), last failure: {}",
                        self.consecutive_failures, self.failure_alert_threshold, failure
                    );
                }
            }
        }
    }
}

impl<Q, D, C> Cycle for SyncJob<Q, D, C>
where
    Q: QuoteSource,
    D: Destination,
    C: Clock,
{
    fn run(&mut self) -> JobResult {
        info!("Sync cycle started for {} symbols", self.symbols.len());
        let result = self.cycle();
        self.record(&result);
        result
    }
}
