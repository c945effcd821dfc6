//! Real-time multi-party chat relay
//!
//! Clients hold a persistent duplex session, register an identity, and
//! exchange broadcast, private, group-scoped, and file messages through a
//! central relay. The relay tracks which identity owns which live session,
//! maintains dynamic group membership, and announces presence changes to
//! everyone.
//!
//! # Architecture
//!
//! ```text
//!   TCP clients ──► RelayServer ──► Connection (reader/writer tasks)
//!                                       │ decode ClientCommand
//!                                       ▼
//!                                    Relay ◄── on_connect / on_disconnect
//!                                  ┌────┴─────┐
//!                                  ▼          ▼
//!                          SessionRegistry  GroupIndex
//!                                  └────┬─────┘
//!                                       ▼
//!                               MessageRouter ──► SessionSender queues
//!                                       │             (per session)
//!                                       ▼
//!                               PresenceNotifier
//! ```
//!
//! The core ([`Relay`]) is transport-agnostic: it works against per-session
//! delivery queues, so it can be driven by the bundled TCP server or
//! directly from tests with in-process channels. Delivery is best-effort:
//! no acknowledgment, no retry, no ordering guarantee across recipients.
//!
//! # Example
//!
//! ```no_run
//! use chat_relay::{RelayServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> chat_relay::Result<()> {
//!     let config = ServerConfig::default().max_connections(1000);
//!     let server = RelayServer::new(config);
//!     server.run().await
//! }
//! ```

pub mod error;
pub mod registry;
pub mod relay;
pub mod routing;
pub mod server;
pub mod session;
pub mod stats;
pub mod wire;

pub use error::{FrameError, RelayError, Result};
pub use registry::{GroupIndex, RegistryError, SessionRegistry};
pub use relay::Relay;
pub use routing::{MessageRouter, PresenceNotifier, ServerEvent};
pub use server::{RelayServer, ServerConfig};
pub use session::{session_channel, SessionHandle, SessionSender};
pub use stats::{RelayStats, StatsSnapshot};
