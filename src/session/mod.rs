//! Session types
//!
//! This module provides:
//! - Opaque session handles and the per-session delivery channel
//! - The connection lifecycle state machine

pub mod handle;
pub mod state;

pub use handle::{session_channel, SessionHandle, SessionSender};
pub use state::{SessionPhase, SessionState};
