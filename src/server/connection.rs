//! Per-connection handling
//!
//! Each accepted socket gets one reader task (this type's `run`) and one
//! writer task draining the session's event queue. The first frame must be
//! `Hello` with a valid identity; until then no other command is accepted.
//! Whatever ends the reader loop (clean close, error, idle timeout) funnels
//! into a single teardown that unwinds the registry and group memberships.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::error::{FrameError, RelayError, Result};
use crate::relay::Relay;
use crate::routing::ServerEvent;
use crate::session::{session_channel, SessionHandle, SessionSender, SessionState};
use crate::server::config::ServerConfig;
use crate::wire::{decode_command, encodable_event, encode_event, ClientCommand};

/// One client connection
pub struct Connection {
    state: SessionState,
    socket: Option<TcpStream>,
    config: ServerConfig,
    relay: Arc<Relay>,
}

impl Connection {
    /// Create a connection handler for an accepted socket
    pub fn new(
        handle: SessionHandle,
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: ServerConfig,
        relay: Arc<Relay>,
    ) -> Self {
        Self {
            state: SessionState::new(handle, peer_addr),
            socket: Some(socket),
            config,
            relay,
        }
    }

    /// Drive the connection until it closes
    ///
    /// Always runs teardown before returning, whatever ended the session.
    pub async fn run(&mut self) -> Result<()> {
        let socket = self.socket.take().expect("connection run twice");
        let (read_half, write_half) = socket.into_split();

        let (sender, event_rx) = session_channel(self.config.session_queue_capacity);
        let writer = tokio::spawn(Self::write_loop(write_half, event_rx));

        let result = self.read_loop(read_half, sender).await;

        // Teardown: unbind + vacate groups + Offline, exactly once
        if self.state.disconnect() {
            self.relay.on_disconnect(self.state.handle).await;
        }

        // Reader owned the only SessionSender clone outside the registry;
        // the unbind above dropped the registry's copy, so the queue closes
        // and the writer drains out.
        let _ = writer.await;

        tracing::debug!(
            session_id = self.state.handle.id(),
            duration_secs = self.state.duration().as_secs(),
            "Session ended"
        );

        result
    }

    async fn read_loop(
        &mut self,
        mut read_half: OwnedReadHalf,
        sender: SessionSender,
    ) -> Result<()> {
        let mut sender = Some(sender);

        loop {
            let mut payload = match self.read_frame(&mut read_half).await? {
                Some(payload) => payload,
                None => return Ok(()), // Clean EOF
            };

            let command = match decode_command(&mut payload) {
                Ok(command) => command,
                Err(e) => {
                    // A malformed frame means we lost framing; close
                    tracing::warn!(
                        session_id = self.state.handle.id(),
                        error = %e,
                        "Malformed frame, closing connection"
                    );
                    return Err(RelayError::Frame(e));
                }
            };

            if !self.state.is_bound() {
                match command {
                    ClientCommand::Hello { identity } => {
                        let sender = sender.take().expect("hello handled twice");
                        match self
                            .relay
                            .on_connect(self.state.handle, &identity, sender)
                            .await
                        {
                            Ok(()) => self.state.bind(identity),
                            Err(e) => {
                                // Rejected: close without presence or session
                                tracing::warn!(
                                    session_id = self.state.handle.id(),
                                    peer = %self.state.peer_addr,
                                    error = %e,
                                    "Connection rejected"
                                );
                                return Err(RelayError::Registry(e));
                            }
                        }
                    }
                    other => {
                        tracing::warn!(
                            session_id = self.state.handle.id(),
                            command = ?other,
                            "Command before Hello, closing connection"
                        );
                        return Ok(());
                    }
                }
                continue;
            }

            self.dispatch(command).await;
        }
    }

    /// Apply one bound-session command to the relay
    async fn dispatch(&self, command: ClientCommand) {
        let handle = self.state.handle;

        match command {
            ClientCommand::Hello { identity } => {
                // Rebinding a live session is not part of the protocol
                tracing::warn!(
                    session_id = handle.id(),
                    identity = %identity,
                    "Duplicate Hello ignored"
                );
            }
            ClientCommand::SendMessage { from, text } => {
                self.relay.send_message(&from, &text).await;
            }
            ClientCommand::SendPrivateMessage { from, to, text } => {
                self.relay.send_private_message(&from, &to, &text).await;
            }
            ClientCommand::SendGroupMessage { group, from, text } => {
                self.relay.send_group_message(&group, &from, &text).await;
            }
            ClientCommand::JoinGroup { group } => {
                self.relay.join_group(&group, handle).await;
            }
            ClientCommand::LeaveGroup { group } => {
                self.relay.leave_group(&group, handle).await;
            }
            ClientCommand::SendFile {
                name,
                content,
                recipient,
            } => {
                self.relay
                    .send_file(&name, content, recipient.as_deref())
                    .await;
            }
        }
    }

    /// Read one length-prefixed frame; `None` on clean EOF
    async fn read_frame(&self, read_half: &mut OwnedReadHalf) -> Result<Option<Bytes>> {
        let idle = self.config.idle_timeout;

        let mut len_buf = [0u8; 4];
        match tokio::time::timeout(idle, read_half.read_exact(&mut len_buf)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::debug!(session_id = self.state.handle.id(), "Idle timeout");
                return Ok(None);
            }
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > self.config.max_frame_size {
            return Err(FrameError::FrameTooLarge {
                size: len,
                max: self.config.max_frame_size,
            }
            .into());
        }

        let mut payload = vec![0u8; len];
        match tokio::time::timeout(idle, read_half.read_exact(&mut payload)).await {
            Ok(Ok(_)) => Ok(Some(Bytes::from(payload))),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(None),
        }
    }

    /// Drain the session's event queue onto the socket
    async fn write_loop(
        mut write_half: OwnedWriteHalf,
        mut event_rx: mpsc::Receiver<ServerEvent>,
    ) {
        let mut buf = BytesMut::new();

        while let Some(event) = event_rx.recv().await {
            if !encodable_event(&event) {
                tracing::warn!(event = event.kind(), "Event too large to frame, dropped");
                continue;
            }

            buf.clear();
            encode_event(&event, &mut buf);

            let len = (buf.len() as u32).to_be_bytes();
            if write_half.write_all(&len).await.is_err() {
                break;
            }
            if write_half.write_all(&buf).await.is_err() {
                break;
            }
        }

        let _ = write_half.shutdown().await;
    }
}
