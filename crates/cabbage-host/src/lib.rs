//! Editor host relay for Cabbage panels.
//!
//! - config: `cabbage.toml` workspace settings
//! - protocol: inbound and outbound message contract
//! - session: open documents, mode and clipboard, message dispatch
//! - panel: rendering-side endpoint driving the live widget graph
//! - bridge: JSON-lines stdio transport

mod error;
pub mod bridge;
pub mod config;
pub mod panel;
pub mod protocol;
mod protocol_io;
pub mod session;

pub use bridge::TransportBridge;
pub use config::HostConfig;
pub use error::SessionError;
pub use panel::Panel;
pub use protocol::{Inbound, Mode, Outbound};
pub use session::{DispatchOutcome, Session};
