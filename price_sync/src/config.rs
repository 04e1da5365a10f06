//! Immutable process configuration.
//!
//! Built once from `Args` before anything is started and passed by reference to each
//! component constructor. Nothing reads the environment after this point.
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use price_common::ConfigError;
use price_common::SymbolSet;
use price_common::symbols::SymbolParser;

use crate::args::Args;

/// Layout of `dailyTriggerTime`.
const TRIGGER_TIME_FORMAT: &str = "%H:%M";

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub destination_id: String,
    pub symbols: SymbolSet,
    pub credentials_location: PathBuf,
    pub daily_trigger_time: NaiveTime,
    pub command_port: u16,
    pub poll_interval: Duration,
    pub failure_alert_threshold: u32,
}

impl Config {
    /// Validate every option; the first problem found is returned.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_key = required(&args.api_key, "apiKey")?;
        let destination_id = required(&args.destination_id, "destinationId")?;
        let symbols = load_symbols(args)?;
        let credentials_location = args
            .credentials_location
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::Missing("credentialsLocation"))?;
        let daily_trigger_time = parse_trigger_time(&required(
            &args.daily_trigger_time,
            "dailyTriggerTime",
        )?)?;

        if args.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                option: "pollIntervalSecs",
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(Config {
            api_key,
            destination_id,
            symbols,
            credentials_location,
            daily_trigger_time,
            command_port: args.command_port,
            poll_interval: Duration::from_secs(args.poll_interval_secs),
            failure_alert_threshold: args.failure_alert_threshold,
        })
    }
}

fn required(value: &Option<String>, option: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or(ConfigError::Missing(option))
}

fn load_symbols(args: &Args) -> Result<SymbolSet, ConfigError> {
    if let Some(path) = &args.symbols_file {
        let file = File::open(path)
            .map_err(|e| ConfigError::SymbolsFile(format!("{}: {}", path.display(), e)))?;
        return SymbolSet::parse_from_reader(BufReader::new(file));
    }
    let raw = required(&args.symbols, "symbols")?;
    SymbolSet::parse_list(&raw)
}

fn parse_trigger_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw, TRIGGER_TIME_FORMAT).map_err(|e| ConfigError::Invalid {
        option: "dailyTriggerTime",
        reason: format!("expected HH:MM (24h), got `{}`: {}", raw, e),
    })
}
