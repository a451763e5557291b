//! Pagemark WebSocket relay server.
//!
//! Relays annotation changes, cursor positions and edit locks between
//! clients viewing the same document. The server holds no document state
//! beyond who is connected and which nodes they are editing; changes are
//! opaque payloads fanned out to the other peers (last write wins).
//!
//! ## Protocol
//!
//! Messages are JSON tagged by `type`:
//! ```json
//! { "type": "join", "room": "doc-42", "name": "alice", "color": "#e91e63" }
//! { "type": "cursor", "page": 3, "x": 0.41, "y": 0.18 }
//! { "type": "node_change", "data": "<serialized command>" }
//! { "type": "edit_start", "node": "<uuid>" }
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// A connected participant, as shared with other peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PeerInfo {
    id: String,
    name: String,
    color: String,
}

/// Messages from clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Join {
        room: String,
        name: String,
        color: String,
    },
    Leave,
    Cursor { page: u32, x: f64, y: f64 },
    NodeChange { data: String },
    EditStart { node: Uuid },
    EditEnd { node: Uuid },
}

/// Messages to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Joined {
        room: String,
        peer_id: String,
        peers: Vec<PeerInfo>,
    },
    PeerJoined { user: PeerInfo },
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

/// Per-document room state.
struct Room {
    tx: broadcast::Sender<(String, ServerMessage)>,
    peers: HashMap<String, PeerInfo>,
    /// node id -> peer id holding the edit lock.
    locks: HashMap<Uuid, String>,
}

impl Room {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            peers: HashMap::new(),
            locks: HashMap::new(),
        }
    }
}

struct AppState {
    rooms: DashMap<String, Room>,
}

impl AppState {
    fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a peer; returns the broadcast receiver and the existing peers.
    fn join_room(
        &self,
        room_id: &str,
        peer: PeerInfo,
    ) -> (broadcast::Receiver<(String, ServerMessage)>, Vec<PeerInfo>) {
        let mut room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(Room::new);
        let others: Vec<PeerInfo> = room.peers.values().cloned().collect();
        room.peers.insert(peer.id.clone(), peer);
        (room.tx.subscribe(), others)
    }

    /// Remove a peer and release their edit locks. Returns the nodes whose
    /// locks were released so they can be broadcast. Empty rooms are
    /// dropped.
    fn leave_room(&self, room_id: &str, peer_id: &str) -> Vec<Uuid> {
        let mut released = Vec::new();
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.peers.remove(peer_id);
            room.locks.retain(|node, holder| {
                if holder == peer_id {
                    released.push(*node);
                    false
                } else {
                    true
                }
            });
            if room.peers.is_empty() {
                drop(room);
                self.rooms.remove(room_id);
            }
        }
        released
    }

    /// Record an edit lock. Returns false if another peer holds it.
    fn try_lock(&self, room_id: &str, node: Uuid, peer_id: &str) -> bool {
        match self.rooms.get_mut(room_id) {
            Some(mut room) => match room.locks.get(&node) {
                Some(holder) if holder != peer_id => false,
                _ => {
                    room.locks.insert(node, peer_id.to_string());
                    true
                }
            },
            None => false,
        }
    }

    fn unlock(&self, room_id: &str, node: Uuid, peer_id: &str) {
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            if room.locks.get(&node).is_some_and(|h| h == peer_id) {
                room.locks.remove(&node);
            }
        }
    }

    fn broadcast(&self, room_id: &str, from: &str, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(room_id) {
            let _ = room.tx.send((from.to_string(), msg));
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagemark_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3030));
    info!("Pagemark relay server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .await
        .expect("server terminated");
}

async fn index() -> &'static str {
    "Pagemark Relay Server - Connect via WebSocket at /ws"
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let mut current_room: Option<String> = None;
    let mut room_rx: Option<broadcast::Receiver<(String, ServerMessage)>> = None;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => match client_msg {
                                ClientMessage::Join { room, name, color } => {
                                    if let Some(ref old_room) = current_room {
                                        depart(&state, old_room, &peer_id);
                                    }

                                    let peer = PeerInfo {
                                        id: peer_id.clone(),
                                        name,
                                        color,
                                    };
                                    let (rx, peers) = state.join_room(&room, peer.clone());
                                    room_rx = Some(rx);
                                    current_room = Some(room.clone());

                                    let joined = ServerMessage::Joined {
                                        room: room.clone(),
                                        peer_id: peer_id.clone(),
                                        peers,
                                    };
                                    if send_json(&mut sender, &joined).await.is_err() {
                                        break;
                                    }

                                    state.broadcast(&room, &peer_id, ServerMessage::PeerJoined {
                                        user: peer,
                                    });
                                    info!("Peer {} joined room {}", peer_id, room);
                                }
                                ClientMessage::Leave => {
                                    if let Some(ref room) = current_room {
                                        depart(&state, room, &peer_id);
                                        info!("Peer {} left room {}", peer_id, room);
                                    }
                                    current_room = None;
                                    room_rx = None;
                                }
                                ClientMessage::Cursor { page, x, y } => {
                                    if let Some(ref room) = current_room {
                                        state.broadcast(room, &peer_id, ServerMessage::Cursor {
                                            from: peer_id.clone(),
                                            page,
                                            x,
                                            y,
                                        });
                                    }
                                }
                                ClientMessage::NodeChange { data } => {
                                    if let Some(ref room) = current_room {
                                        state.broadcast(room, &peer_id, ServerMessage::NodeChange {
                                            from: peer_id.clone(),
                                            data,
                                        });
                                    }
                                }
                                ClientMessage::EditStart { node } => {
                                    if let Some(ref room) = current_room {
                                        if state.try_lock(room, node, &peer_id) {
                                            state.broadcast(room, &peer_id, ServerMessage::EditStarted {
                                                from: peer_id.clone(),
                                                node,
                                            });
                                        } else {
                                            let err = ServerMessage::Error {
                                                message: format!("node {node} is being edited"),
                                            };
                                            let _ = send_json(&mut sender, &err).await;
                                        }
                                    }
                                }
                                ClientMessage::EditEnd { node } => {
                                    if let Some(ref room) = current_room {
                                        state.unlock(room, node, &peer_id);
                                        state.broadcast(room, &peer_id, ServerMessage::EditEnded {
                                            from: peer_id.clone(),
                                            node,
                                        });
                                    }
                                }
                            },
                            Err(e) => {
                                warn!("Invalid message from {}: {}", peer_id, e);
                                let err = ServerMessage::Error {
                                    message: format!("invalid message: {e}"),
                                };
                                let _ = send_json(&mut sender, &err).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore ping/pong/binary
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer_id, e);
                        break;
                    }
                }
            }

            msg = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await.ok(),
                    None => std::future::pending::<Option<(String, ServerMessage)>>().await,
                }
            } => {
                if let Some((from, server_msg)) = msg {
                    // Don't echo back to sender
                    if from != peer_id && send_json(&mut sender, &server_msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    if let Some(ref room) = current_room {
        depart(&state, room, &peer_id);
    }
    info!("Connection closed: {}", peer_id);
}

/// Remove a peer from a room: release their locks (broadcasting the
/// unlocks so stale locks never outlive their holder) and announce the
/// departure.
fn depart(state: &AppState, room: &str, peer_id: &str) {
    let released = state.leave_room(room, peer_id);
    for node in released {
        state.broadcast(room, peer_id, ServerMessage::EditEnded {
            from: peer_id.to_string(),
            node,
        });
    }
    state.broadcast(room, peer_id, ServerMessage::PeerLeft {
        peer_id: peer_id.to_string(),
    });
}

async fn send_json(
    sender: &mut (impl SinkExt<Message> + Unpin),
    msg: &ServerMessage,
) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
