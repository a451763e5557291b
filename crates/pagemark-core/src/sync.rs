//! WebSocket client for the collaboration channel.
//!
//! Wire messages are JSON, tagged by `type`. The native client runs the
//! socket on a background thread and hands events back through
//! `poll_events`, so the host's frame loop never blocks on the network.

use crate::collab::{ConnectionState, CursorPos, RemoteUser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent to the relay server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a document room.
    Join {
        room: String,
        name: String,
        color: String,
    },
    /// Leave the current room.
    Leave,
    /// Throttled cursor position.
    Cursor { page: u32, x: f64, y: f64 },
    /// A document mutation, as serialized command JSON. The relay treats
    /// it as opaque and fans it out to the other peers.
    NodeChange { data: String },
    /// Claim the edit lock on a node.
    EditStart { node: Uuid },
    /// Release the edit lock on a node.
    EditEnd { node: Uuid },
}

/// Messages received from the relay server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Join confirmed, with the current participant list.
    Joined {
        room: String,
        peer_id: String,
        peers: Vec<RemoteUser>,
    },
    PeerJoined { user: RemoteUser },
    PeerLeft { peer_id: String },
    Cursor {
        from: String,
        page: u32,
        x: f64,
        y: f64,
    },
    NodeChange { from: String, data: String },
    EditStarted { from: String, node: Uuid },
    EditEnded { from: String, node: Uuid },
    Error { message: String },
}

/// Events surfaced to the host by `poll_events`.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Connected,
    Disconnected,
    JoinedRoom {
        room: String,
        peer_id: String,
        peers: Vec<RemoteUser>,
    },
    PeerJoined { user: RemoteUser },
    PeerLeft { peer_id: String },
    CursorReceived { from: String, pos: CursorPos },
    NodeChangeReceived { from: String, data: String },
    EditStarted { from: String, node: Uuid },
    EditEnded { from: String, node: Uuid },
    Error { message: String },
}

impl SyncEvent {
    fn from_server(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::Joined {
                room,
                peer_id,
                peers,
            } => SyncEvent::JoinedRoom {
                room,
                peer_id,
                peers,
            },
            ServerMessage::PeerJoined { user } => SyncEvent::PeerJoined { user },
            ServerMessage::PeerLeft { peer_id } => SyncEvent::PeerLeft { peer_id },
            ServerMessage::Cursor { from, page, x, y } => SyncEvent::CursorReceived {
                from,
                pos: CursorPos { page, x, y },
            },
            ServerMessage::NodeChange { from, data } => {
                SyncEvent::NodeChangeReceived { from, data }
            }
            ServerMessage::EditStarted { from, node } => SyncEvent::EditStarted { from, node },
            ServerMessage::EditEnded { from, node } => SyncEvent::EditEnded { from, node },
            ServerMessage::Error { message } => SyncEvent::Error { message },
        }
    }
}

mod native_client {
    use super::*;
    use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{connect, Message};
    use url::Url;

    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket client running the socket on a background thread.
    ///
    /// There is no automatic reconnect: once the thread exits the client
    /// reports `Disconnected` and stays there until `connect` is called
    /// again.
    pub struct NativeSocket {
        state: ConnectionState,
        events: Vec<SyncEvent>,
        cmd_tx: Option<Sender<WsCommand>>,
        event_rx: Option<Receiver<SyncEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeSocket {
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                events: Vec::new(),
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        /// Connect to a relay server.
        pub fn connect(&mut self, url: &str) -> Result<(), String> {
            if self.cmd_tx.is_some() {
                return Err("already connected".to_string());
            }

            let parsed = Url::parse(url).map_err(|e| format!("invalid URL: {e}"))?;
            if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                return Err(format!("invalid WebSocket scheme: {}", parsed.scheme()));
            }

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<SyncEvent>();
            let url = url.to_string();

            let handle = thread::spawn(move || {
                log::info!("socket thread: connecting to {url}");
                match connect(&url) {
                    Ok((mut socket, response)) => {
                        log::info!("socket connected, status: {}", response.status());
                        let _ = event_tx.send(SyncEvent::Connected);

                        // Short read timeout so the loop can interleave
                        // outgoing commands with incoming frames.
                        if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
                            let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                            let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                        }

                        loop {
                            match cmd_rx.try_recv() {
                                Ok(WsCommand::Send(msg)) => {
                                    if let Err(e) = socket.send(Message::Text(msg)) {
                                        log::error!("socket send error: {e}");
                                        break;
                                    }
                                }
                                Ok(WsCommand::Close) => {
                                    let _ = socket.close(None);
                                    break;
                                }
                                Err(TryRecvError::Disconnected) => break,
                                Err(TryRecvError::Empty) => {}
                            }

                            match socket.read() {
                                Ok(Message::Text(txt)) => {
                                    match serde_json::from_str::<ServerMessage>(&txt) {
                                        Ok(msg) => {
                                            let _ = event_tx.send(SyncEvent::from_server(msg));
                                        }
                                        Err(e) => {
                                            log::warn!("unparseable server message: {e}");
                                        }
                                    }
                                }
                                Ok(Message::Ping(data)) => {
                                    let _ = socket.send(Message::Pong(data));
                                }
                                Ok(Message::Close(_)) => break,
                                Ok(_) => {}
                                Err(tungstenite::Error::Io(ref e))
                                    if e.kind() == std::io::ErrorKind::WouldBlock
                                        || e.kind() == std::io::ErrorKind::TimedOut =>
                                {
                                    continue;
                                }
                                Err(e) => {
                                    log::error!("socket read error: {e}");
                                    break;
                                }
                            }
                        }

                        log::info!("socket thread exiting");
                        let _ = event_tx.send(SyncEvent::Disconnected);
                    }
                    Err(e) => {
                        log::error!("socket connection failed: {e}");
                        let _ = event_tx.send(SyncEvent::Error {
                            message: format!("connection failed: {e}"),
                        });
                        let _ = event_tx.send(SyncEvent::Disconnected);
                    }
                }
            });

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);
            Ok(())
        }

        pub fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        /// Serialize and queue a message for the socket thread.
        pub fn send(&self, msg: &ClientMessage) -> Result<(), String> {
            let tx = self.cmd_tx.as_ref().ok_or("not connected")?;
            let json = serde_json::to_string(msg).map_err(|e| format!("serialize: {e}"))?;
            tx.send(WsCommand::Send(json))
                .map_err(|e| format!("send failed: {e}"))
        }

        /// Drain pending events without blocking, updating the connection
        /// state as lifecycle events pass through.
        pub fn poll_events(&mut self) -> Vec<SyncEvent> {
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    match &event {
                        SyncEvent::Connected => self.state = ConnectionState::Connected,
                        SyncEvent::Disconnected => self.state = ConnectionState::Disconnected,
                        _ => {}
                    }
                    self.events.push(event);
                }
            }
            std::mem::take(&mut self.events)
        }

        pub fn state(&self) -> ConnectionState {
            self.state
        }

        pub fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }
    }

    impl Default for NativeSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

pub use native_client::NativeSocket;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_serialize() {
        let msg = ClientMessage::Join {
            room: "doc-7".to_string(),
            name: "alice".to_string(),
            color: "#ff0000".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"join\""));
        assert!(json.contains("doc-7"));
    }

    #[test]
    fn test_server_message_deserialize() {
        let json = r#"{"type":"cursor","from":"u1","page":2,"x":0.5,"y":0.25}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        let event = SyncEvent::from_server(msg);
        let SyncEvent::CursorReceived { from, pos } = event else {
            panic!("wrong event");
        };
        assert_eq!(from, "u1");
        assert_eq!(pos.page, 2);
        assert_eq!(pos.x, 0.5);
    }

    #[test]
    fn test_connect_rejects_bad_scheme() {
        let mut socket = NativeSocket::new();
        assert!(socket.connect("http://example.com").is_err());
        assert_eq!(socket.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_send_without_connection_fails() {
        let socket = NativeSocket::new();
        assert!(socket.send(&ClientMessage::Leave).is_err());
    }
}
