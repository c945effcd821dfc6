//! Wire protocol
//!
//! Typed events and commands are encoded to length-prefixed binary frames
//! only at this edge; everything inside the relay works with the typed
//! representations.

pub mod frame;

pub use frame::{
    decode_command, decode_event, encodable_event, encode_command, encode_event, ClientCommand,
};
