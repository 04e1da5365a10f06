use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};
use price_common::Result;
use price_common::command::{PONG, TriggerCommand, UNKNOWN_COMMAND};

use crate::job::Cycle;
use crate::scheduler::Scheduler;

/// How long a client may take to send its command line.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest command line read from a client; the rest is ignored.
const MAX_COMMAND_LEN: u64 = 64;

/// TCP listener for manual trigger requests.
///
/// Each connection carries one command line and gets one reply line. Connections are
/// handled on their own thread so a `SYNC` that arrives while another is running is
/// answered with `BUSY` right away instead of waiting in the accept queue.
pub struct TriggerReceiver {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
}

impl TriggerReceiver {
    /// Bind a new receiver to `bind_addr` (e.g., `127.0.0.1:8080`).
    pub fn new(bind_addr: &str) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocking accept loop. A failing client is logged and does not stop the loop.
    pub fn serve<J>(self, scheduler: Arc<Scheduler<J>>) -> Result<()>
    where
        J: Cycle + Send + 'static,
    {
        info!("Manual trigger port listening on {}", self.local_addr()?);

        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let scheduler = Arc::clone(&scheduler);
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &scheduler) {
                            warn!("Trigger client error: {}", e);
                        }
                    });
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}

fn handle_connection<J: Cycle>(stream: TcpStream, scheduler: &Scheduler<J>) -> Result<()> {
    let peer = stream.peer_addr()?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let mut line = String::new();
    BufReader::new((&stream).take(MAX_COMMAND_LEN)).read_line(&mut line)?;
    debug!("Command from {}: {:?}", peer, line.trim());

    let reply = reply_to(line.trim(), scheduler);
    (&stream).write_all(format!("{}\n", reply).as_bytes())?;
    Ok(())
}

/// Execute one command line and produce the reply text.
pub fn reply_to<J: Cycle>(line: &str, scheduler: &Scheduler<J>) -> String {
    match line.parse::<TriggerCommand>() {
        Ok(TriggerCommand::Sync) => match scheduler.manual_trigger() {
            Ok(result) => result.to_string(),
            Err(rejected) => format!("BUSY {}", rejected),
        },
        Ok(TriggerCommand::Ping) => PONG.to_string(),
        Err(_) => format!("{}: {}", UNKNOWN_COMMAND, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::SyncJob;
    use crate::testing::{RecordingDestination, StubSource, new_year_8am, test_config};

    fn scheduler() -> Scheduler<SyncJob<StubSource, RecordingDestination, crate::testing::FixedClock>> {
        Scheduler::new(SyncJob::new(
            &test_config("BTC,ETH"),
            StubSource::ok(&[("BTC", 50000.1234), ("ETH", 2500.0)]),
            RecordingDestination::default(),
            new_year_8am(),
        ))
    }

    #[test]
    fn sync_command_replies_with_acknowledgement() {
        assert_eq!(
            reply_to("sync", &scheduler()),
            "OK [2024-01-01 08:00, 50000.1234, 2500]"
        );
    }

    #[test]
    fn ping_and_unknown_commands() {
        let scheduler = scheduler();
        assert_eq!(reply_to("PING", &scheduler), "PONG");
        assert_eq!(
            reply_to("STREAM BTC", &scheduler),
            "ERROR unknown command: STREAM BTC"
        );
    }

    #[test]
    fn serves_commands_over_tcp() {
        let receiver = TriggerReceiver::new("127.0.0.1:0").unwrap();
        let addr = receiver.local_addr().unwrap();
        let scheduler = Arc::new(scheduler());
        thread::spawn(move || receiver.serve(scheduler));

        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"sync\n").unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();

        assert_eq!(reply, "OK [2024-01-01 08:00, 50000.1234, 2500]\n");
    }

    #[test]
    fn overlong_command_without_newline_is_cut_off() {
        let receiver = TriggerReceiver::new("127.0.0.1:0").unwrap();
        let addr = receiver.local_addr().unwrap();
        let scheduler = Arc::new(scheduler());
        thread::spawn(move || receiver.serve(scheduler));

        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let flood = "x".repeat(MAX_COMMAND_LEN as usize);
        stream.write_all(flood.as_bytes()).unwrap();

        let mut reply = String::new();
        BufReader::new(&stream).read_line(&mut reply).unwrap();
        assert_eq!(reply, format!("{}: {}\n", UNKNOWN_COMMAND, flood));
    }
}
