//! JSON-lines transport between the editor and the session.
//!
//! A reader thread frames inbound lines and a writer thread serializes
//! outbound messages, so a slow consumer never blocks dispatch. Messages
//! are handled and written in arrival order.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use tracing::{debug, info, warn};

use crate::protocol::{Inbound, Outbound};
use crate::protocol_io::{read_message, write_message};
use crate::session::Session;

pub struct TransportBridge {
    session: Session,
}

impl TransportBridge {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run_stdio(&self) -> io::Result<()> {
        self.run(BufReader::new(io::stdin()), BufWriter::new(io::stdout()))
    }

    /// Relay until the input closes or an `exit` command arrives.
    pub fn run<R, W>(&self, reader: R, writer: W) -> io::Result<()>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let inbound = spawn_reader(reader);
        let (out_tx, out_rx) = unbounded::<Outbound>();
        let writer_thread = thread::spawn(move || write_loop(writer, out_rx));

        while let Ok(next) = inbound.recv() {
            let payload = match next {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("input closed with error: {err}");
                    break;
                }
            };
            let message: Inbound = match serde_json::from_str(&payload) {
                Ok(message) => message,
                Err(err) => {
                    warn!("unrecognized message: {err}");
                    let diagnostic = Outbound::diagnostic(None, format!("invalid message: {err}"));
                    if out_tx.send(diagnostic).is_err() {
                        break;
                    }
                    continue;
                }
            };
            let outcome = self.session.dispatch(message);
            debug!("dispatch produced {} messages", outcome.messages.len());
            if outcome
                .messages
                .into_iter()
                .any(|message| out_tx.send(message).is_err())
            {
                break;
            }
            if outcome.should_exit {
                info!("exit requested");
                break;
            }
        }

        drop(out_tx);
        writer_thread
            .join()
            .map_err(|_| io::Error::other("writer thread panicked"))?
    }
}

fn spawn_reader<R: BufRead + Send + 'static>(mut reader: R) -> Receiver<io::Result<String>> {
    let (tx, rx) = unbounded();
    thread::spawn(move || loop {
        match read_message(&mut reader) {
            Ok(Some(payload)) => {
                if tx.send(Ok(payload)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                let _ = tx.send(Err(err));
                break;
            }
        }
    });
    rx
}

fn write_loop<W: Write>(mut writer: W, messages: Receiver<Outbound>) -> io::Result<()> {
    for message in messages {
        let serialized = serde_json::to_string(&message)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        write_message(&mut writer, &serialized)?;
    }
    Ok(())
}
