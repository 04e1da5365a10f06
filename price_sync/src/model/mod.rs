//! Domain models for the sync daemon.
//!
//! - `price_quote` — per-cycle prices with total symbol lookup.
//! - `sync_row` — the row written to the ledger.
//! - `daily_schedule` — once-a-day firing decision used by the ticker.

pub mod daily_schedule;
pub mod price_quote;
pub mod sync_row;
