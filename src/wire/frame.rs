//! Wire frame codec
//!
//! Requests and events travel as length-prefixed binary frames. The
//! transport reads/writes the 4-byte big-endian payload length; this module
//! encodes and decodes the payload itself.
//!
//! Payload layout:
//! ```text
//! [opcode: u8] [fields...]
//!
//! string field: u16 length + UTF-8 bytes
//! blob field:   u32 length + raw bytes
//! option field: u8 flag (0/1) + value if 1
//! ```
//!
//! Opcodes:
//! ```text
//! client → server                    server → client
//! 0x01 - Hello (identity)            0x10 - Online
//! 0x02 - SendMessage                 0x11 - Offline
//! 0x03 - SendPrivateMessage          0x12 - Message
//! 0x04 - SendGroupMessage            0x13 - PrivateMessage
//! 0x05 - JoinGroup                   0x14 - GroupMessage
//! 0x06 - LeaveGroup                  0x15 - File
//! 0x07 - SendFile
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::routing::ServerEvent;

// Client → server opcodes
const OP_HELLO: u8 = 0x01;
const OP_SEND_MESSAGE: u8 = 0x02;
const OP_SEND_PRIVATE: u8 = 0x03;
const OP_SEND_GROUP: u8 = 0x04;
const OP_JOIN_GROUP: u8 = 0x05;
const OP_LEAVE_GROUP: u8 = 0x06;
const OP_SEND_FILE: u8 = 0x07;

/// Largest string a u16-prefixed field can carry
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Largest blob a u32-prefixed field can carry
pub const MAX_BLOB_LEN: usize = u32::MAX as usize;

// Server → client opcodes
const OP_ONLINE: u8 = 0x10;
const OP_OFFLINE: u8 = 0x11;
const OP_MESSAGE: u8 = 0x12;
const OP_PRIVATE_MESSAGE: u8 = 0x13;
const OP_GROUP_MESSAGE: u8 = 0x14;
const OP_FILE: u8 = 0x15;

/// A request decoded from a client frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// First frame of every connection: the identity to bind
    Hello { identity: String },
    /// Broadcast a text message
    SendMessage { from: String, text: String },
    /// Send a text message to one identity
    SendPrivateMessage {
        from: String,
        to: String,
        text: String,
    },
    /// Send a text message to a group
    SendGroupMessage {
        group: String,
        from: String,
        text: String,
    },
    /// Join a group
    JoinGroup { group: String },
    /// Leave a group
    LeaveGroup { group: String },
    /// Send a binary blob, optionally to one recipient
    SendFile {
        name: String,
        content: Bytes,
        recipient: Option<String>,
    },
}

/// Decode one client command from a frame payload
pub fn decode_command(buf: &mut Bytes) -> Result<ClientCommand, FrameError> {
    if buf.is_empty() {
        return Err(FrameError::UnexpectedEof);
    }

    let opcode = buf.get_u8();
    match opcode {
        OP_HELLO => Ok(ClientCommand::Hello {
            identity: get_string(buf)?,
        }),
        OP_SEND_MESSAGE => Ok(ClientCommand::SendMessage {
            from: get_string(buf)?,
            text: get_string(buf)?,
        }),
        OP_SEND_PRIVATE => Ok(ClientCommand::SendPrivateMessage {
            from: get_string(buf)?,
            to: get_string(buf)?,
            text: get_string(buf)?,
        }),
        OP_SEND_GROUP => Ok(ClientCommand::SendGroupMessage {
            group: get_string(buf)?,
            from: get_string(buf)?,
            text: get_string(buf)?,
        }),
        OP_JOIN_GROUP => Ok(ClientCommand::JoinGroup {
            group: get_string(buf)?,
        }),
        OP_LEAVE_GROUP => Ok(ClientCommand::LeaveGroup {
            group: get_string(buf)?,
        }),
        OP_SEND_FILE => Ok(ClientCommand::SendFile {
            name: get_string(buf)?,
            content: get_blob(buf)?,
            recipient: get_optional_string(buf)?,
        }),
        other => Err(FrameError::InvalidOpcode(other)),
    }
}

/// Encode a client command into a frame payload
pub fn encode_command(command: &ClientCommand, buf: &mut BytesMut) {
    match command {
        ClientCommand::Hello { identity } => {
            buf.put_u8(OP_HELLO);
            put_string(buf, identity);
        }
        ClientCommand::SendMessage { from, text } => {
            buf.put_u8(OP_SEND_MESSAGE);
            put_string(buf, from);
            put_string(buf, text);
        }
        ClientCommand::SendPrivateMessage { from, to, text } => {
            buf.put_u8(OP_SEND_PRIVATE);
            put_string(buf, from);
            put_string(buf, to);
            put_string(buf, text);
        }
        ClientCommand::SendGroupMessage { group, from, text } => {
            buf.put_u8(OP_SEND_GROUP);
            put_string(buf, group);
            put_string(buf, from);
            put_string(buf, text);
        }
        ClientCommand::JoinGroup { group } => {
            buf.put_u8(OP_JOIN_GROUP);
            put_string(buf, group);
        }
        ClientCommand::LeaveGroup { group } => {
            buf.put_u8(OP_LEAVE_GROUP);
            put_string(buf, group);
        }
        ClientCommand::SendFile {
            name,
            content,
            recipient,
        } => {
            buf.put_u8(OP_SEND_FILE);
            put_string(buf, name);
            put_blob(buf, content);
            put_optional_string(buf, recipient.as_deref());
        }
    }
}

/// Encode a server event into a frame payload
pub fn encode_event(event: &ServerEvent, buf: &mut BytesMut) {
    match event {
        ServerEvent::Online { identity } => {
            buf.put_u8(OP_ONLINE);
            put_string(buf, identity);
        }
        ServerEvent::Offline { identity } => {
            buf.put_u8(OP_OFFLINE);
            put_string(buf, identity);
        }
        ServerEvent::Message { from, text } => {
            buf.put_u8(OP_MESSAGE);
            put_string(buf, from);
            put_string(buf, text);
        }
        ServerEvent::PrivateMessage { from, text } => {
            buf.put_u8(OP_PRIVATE_MESSAGE);
            put_string(buf, from);
            put_string(buf, text);
        }
        ServerEvent::GroupMessage { group, from, text } => {
            buf.put_u8(OP_GROUP_MESSAGE);
            put_string(buf, group);
            put_string(buf, from);
            put_string(buf, text);
        }
        ServerEvent::File { name, content } => {
            buf.put_u8(OP_FILE);
            put_string(buf, name);
            put_blob(buf, content);
        }
    }
}

/// Whether an event's fields fit the frame's length prefixes
///
/// Everything arriving off the wire fits by construction, but a library
/// caller can hand the relay an arbitrarily large string or blob. The
/// transport checks here before encoding and drops what cannot be framed.
pub fn encodable_event(event: &ServerEvent) -> bool {
    match event {
        ServerEvent::Online { identity } | ServerEvent::Offline { identity } => {
            identity.len() <= MAX_STRING_LEN
        }
        ServerEvent::Message { from, text } | ServerEvent::PrivateMessage { from, text } => {
            from.len() <= MAX_STRING_LEN && text.len() <= MAX_STRING_LEN
        }
        ServerEvent::GroupMessage { group, from, text } => {
            group.len() <= MAX_STRING_LEN
                && from.len() <= MAX_STRING_LEN
                && text.len() <= MAX_STRING_LEN
        }
        ServerEvent::File { name, content } => {
            name.len() <= MAX_STRING_LEN && content.len() <= MAX_BLOB_LEN
        }
    }
}

/// Decode one server event from a frame payload (client side)
pub fn decode_event(buf: &mut Bytes) -> Result<ServerEvent, FrameError> {
    if buf.is_empty() {
        return Err(FrameError::UnexpectedEof);
    }

    let opcode = buf.get_u8();
    match opcode {
        OP_ONLINE => Ok(ServerEvent::Online {
            identity: get_string(buf)?,
        }),
        OP_OFFLINE => Ok(ServerEvent::Offline {
            identity: get_string(buf)?,
        }),
        OP_MESSAGE => Ok(ServerEvent::Message {
            from: get_string(buf)?,
            text: get_string(buf)?,
        }),
        OP_PRIVATE_MESSAGE => Ok(ServerEvent::PrivateMessage {
            from: get_string(buf)?,
            text: get_string(buf)?,
        }),
        OP_GROUP_MESSAGE => Ok(ServerEvent::GroupMessage {
            group: get_string(buf)?,
            from: get_string(buf)?,
            text: get_string(buf)?,
        }),
        OP_FILE => Ok(ServerEvent::File {
            name: get_string(buf)?,
            content: get_blob(buf)?,
        }),
        other => Err(FrameError::InvalidOpcode(other)),
    }
}

fn get_string(buf: &mut Bytes) -> Result<String, FrameError> {
    if buf.remaining() < 2 {
        return Err(FrameError::UnexpectedEof);
    }
    let len = buf.get_u16() as usize;
    if buf.remaining() < len {
        return Err(FrameError::UnexpectedEof);
    }
    let raw = buf.split_to(len);
    String::from_utf8(raw.to_vec()).map_err(|_| FrameError::InvalidUtf8)
}

fn put_string(buf: &mut BytesMut, s: &str) {
    // Callers check `encodable_event` first; a longer string would
    // corrupt the length prefix
    debug_assert!(s.len() <= MAX_STRING_LEN);
    buf.put_u16(s.len() as u16);
    buf.put_slice(s.as_bytes());
}

fn get_blob(buf: &mut Bytes) -> Result<Bytes, FrameError> {
    if buf.remaining() < 4 {
        return Err(FrameError::UnexpectedEof);
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(FrameError::UnexpectedEof);
    }
    Ok(buf.split_to(len))
}

fn put_blob(buf: &mut BytesMut, data: &Bytes) {
    debug_assert!(data.len() <= MAX_BLOB_LEN);
    buf.put_u32(data.len() as u32);
    buf.put_slice(data);
}

fn get_optional_string(buf: &mut Bytes) -> Result<Option<String>, FrameError> {
    if buf.remaining() < 1 {
        return Err(FrameError::UnexpectedEof);
    }
    match buf.get_u8() {
        0 => Ok(None),
        _ => Ok(Some(get_string(buf)?)),
    }
}

fn put_optional_string(buf: &mut BytesMut, value: Option<&str>) {
    match value {
        Some(s) => {
            buf.put_u8(1);
            put_string(buf, s);
        }
        None => buf.put_u8(0),
    }
}
