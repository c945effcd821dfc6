//! Message routing
//!
//! This module provides:
//! - The typed event set sessions receive
//! - Target resolution and fire-and-forget dispatch
//! - Presence notifications on registry changes

pub mod event;
pub mod presence;
pub mod router;

pub use event::{ServerEvent, SYSTEM_SENDER};
pub use presence::PresenceNotifier;
pub use router::MessageRouter;
