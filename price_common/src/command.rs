//! Text protocol for the manual-trigger command port.
//!
//! A client opens a TCP connection, writes one command line and reads one reply line.
//! Commands are matched case-insensitively.
use strum_macros::{Display, EnumString};

/// Reply to `PING`.
pub const PONG: &str = "PONG";
/// Reply prefix for an unparseable command line.
pub const UNKNOWN_COMMAND: &str = "ERROR unknown command";

/// Commands accepted on the trigger port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TriggerCommand {
    /// Run one sync cycle now and report the outcome.
    Sync,
    /// Liveness probe.
    Ping,
}
