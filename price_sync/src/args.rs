//! Command-line arguments for the price sync daemon.
//!
//! Every option can also come from the environment (or a `.env` file loaded at startup),
//! using the variable named next to it. Required options are `Option`s here so that a
//! missing one is reported by `Config::from_args` as a configuration error.
use std::path::PathBuf;

use clap::Parser;
use price_common::net::COMMAND_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Quote API key.
    #[clap(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Spreadsheet id rows are appended to.
    #[clap(long, env = "SPREADSHEET_ID")]
    pub destination_id: Option<String>,

    /// Symbols to track, separated by commas or spaces. Order defines column order.
    #[clap(long, env = "SYMBOLS")]
    pub symbols: Option<String>,

    /// File with one symbol per line; takes precedence over `--symbols`.
    #[clap(long, env = "SYMBOLS_FILE")]
    pub symbols_file: Option<PathBuf>,

    /// JSON file holding the spreadsheet access token.
    #[clap(long, env = "CREDENTIALS_FILE")]
    pub credentials_location: Option<PathBuf>,

    /// Daily trigger time, `HH:MM` in 24h local time.
    #[clap(long, env = "UPDATE_TIME")]
    pub daily_trigger_time: Option<String>,

    /// Local TCP port accepting manual `SYNC` requests.
    #[clap(long, env = "COMMAND_PORT", default_value_t = COMMAND_PORT)]
    pub command_port: u16,

    /// How often the background ticker checks the schedule, in seconds.
    #[clap(long, env = "POLL_INTERVAL_SECS", default_value_t = 60)]
    pub poll_interval_secs: u64,

    /// Consecutive failed cycles before each failure is escalated; 0 disables.
    #[clap(long, env = "FAILURE_ALERT_THRESHOLD", default_value_t = 3)]
    pub failure_alert_threshold: u32,

    /// Append log output to this file instead of stderr.
    #[clap(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Run a single manual cycle, print the outcome and exit.
    #[clap(long)]
    pub once: bool,
}
