//! Session and group registries
//!
//! Shared mutable state of the relay: who is online and which groups each
//! session has joined.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<SessionRegistry>
//!                  ┌────────────────────────────┐
//!                  │ by_identity: name → handle │
//!                  │ by_handle:   handle →      │
//!                  │   { identity, sender }     │
//!                  └─────────────┬──────────────┘
//!                                │ resolve targets
//!                                ▼
//!                          MessageRouter ──► SessionSender.try_deliver()
//!                                ▲
//!                  ┌─────────────┴──────────────┐
//!                  │ members:    group → {h}    │
//!                  │ by_session: h → {group}    │
//!                  └────────────────────────────┘
//!                         Arc<GroupIndex>
//! ```
//!
//! Each structure keeps both of its directions under a single `RwLock`, so
//! concurrent sessions can bind/unbind/join/leave without a reader ever
//! seeing one direction updated and not the other.

pub mod error;
pub mod groups;
pub mod sessions;

pub use error::RegistryError;
pub use groups::GroupIndex;
pub use sessions::SessionRegistry;
