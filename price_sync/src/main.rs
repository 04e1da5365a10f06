//! Price sync daemon.
//!
//! Fetches a fixed set of cryptocurrency prices and appends one timestamped row to a
//! spreadsheet, once a day at a configured time and whenever a manual trigger asks for it.
//! The building blocks:
//!
//! - `CoinMarketCapSource` — one quote request per cycle for the whole symbol set.
//! - `SheetsDestination` — opens the spreadsheet and appends rows through its ledger handle.
//! - `SyncJob` — a single cycle: open ledger, fetch, build row, append, report.
//! - `Scheduler` — the guard around the job plus the daily ticker thread.
//! - `TriggerReceiver` — local TCP port turning `SYNC` lines into manual triggers.
//!
//! Concurrency and shutdown:
//! - The ticker and each trigger connection run on their own threads; all of them call
//!   into the scheduler, which lets exactly one cycle run at a time and rejects the rest.
//! - Ctrl+C signals the ticker over a crossbeam channel; once it stops, the process waits
//!   for any manual cycle still holding the guard and then exits.
//!
//! Configuration is read once from flags, environment and `.env` (see `args`), validated
//! into `Config`, and passed to constructors. Invalid configuration stops the process
//! before anything is armed.
#![warn(missing_docs)]
use crate::args::Args;
use crate::clock::{Clock, LocalClock};
use crate::config::Config;
use crate::job::SyncJob;
use crate::ledger::SheetsDestination;
use crate::model::daily_schedule::DailySchedule;
use crate::quote_source::CoinMarketCapSource;
use crate::receiver::TriggerReceiver;
use crate::scheduler::Scheduler;
use clap::Parser;
use crossbeam_channel::bounded;
use log::{error, info};
use price_common::Result;
use price_common::SyncError;
use price_common::net::addr;
use std::fs::OpenOptions;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::thread;

mod args;
mod clock;
mod config;
mod job;
mod ledger;
pub mod model;
mod quote_source;
mod receiver;
mod scheduler;
#[cfg(test)]
mod testing;

fn main() -> Result<(), SyncError> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logger(args.log_file.as_deref())?;
    info!("Starting price sync...");

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Tracking {} symbols: {}",
        config.symbols.len(),
        config.symbols.joined()
    );

    let job = SyncJob::new(
        &config,
        CoinMarketCapSource::new(&config)?,
        SheetsDestination::new(&config)?,
        LocalClock,
    );
    let scheduler = Arc::new(Scheduler::new(job));

    if args.once {
        let succeeded = match scheduler.manual_trigger() {
            Ok(result) => {
                println!("{}", result);
                result.is_success()
            }
            Err(rejected) => {
                println!("BUSY {}", rejected);
                false
            }
        };
        if !succeeded {
            process::exit(1);
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down...");
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| SyncError::Setup(format!("Ctrl+C handler: {}", e)))?;

    let receiver = TriggerReceiver::new(&addr("127.0.0.1", config.command_port))?;
    let trigger_scheduler = Arc::clone(&scheduler);
    thread::spawn(move || {
        if let Err(e) = receiver.serve(trigger_scheduler) {
            error!("Trigger receiver failed: {:?}", e);
        }
    });

    let schedule = DailySchedule::new(config.daily_trigger_time, LocalClock.now());
    let ticker = scheduler.spawn_ticker(schedule, config.poll_interval, LocalClock, shutdown_rx);
    ticker
        .join()
        .map_err(|_| SyncError::Setup("ticker thread panicked".to_string()))?;
    scheduler.wait_idle();

    info!("Price sync stopped");
    Ok(())
}

fn init_logger(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env();
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
