//! Collaboration state: presence, cursors and edit locks.

pub mod interp;
pub mod throttle;

pub use interp::CursorInterpolator;
pub use throttle::{CursorThrottle, CURSOR_BROADCAST_INTERVAL_MS};

use crate::model::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Connection lifecycle. There is no automatic reconnect; a drop lands in
/// `Disconnected` and stays there until the host reconnects explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Another participant in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    pub name: String,
    /// Display color as a hex string, assigned at join time.
    pub color: String,
}

/// A reported cursor position, normalized to the page it is over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPos {
    pub page: u32,
    pub x: f64,
    pub y: f64,
}

/// Everything known about the other participants.
#[derive(Debug, Default)]
pub struct PresenceState {
    pub connection: ConnectionState,
    users: HashMap<String, RemoteUser>,
    cursors: HashMap<String, CursorPos>,
    /// node id -> user id holding the edit lock.
    editing: HashMap<Uuid, String>,
}

impl PresenceState {
    pub fn users(&self) -> impl Iterator<Item = &RemoteUser> {
        self.users.values()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn cursors(&self) -> impl Iterator<Item = (&str, &CursorPos)> {
        self.cursors.iter().map(|(id, pos)| (id.as_str(), pos))
    }

    /// Who holds the edit lock on a node, if anyone.
    pub fn lock_holder(&self, node: Uuid) -> Option<&RemoteUser> {
        self.editing.get(&node).and_then(|id| self.users.get(id))
    }

    pub fn is_locked(&self, node: Uuid) -> bool {
        self.editing.contains_key(&node)
    }

    pub fn user_joined(&mut self, user: RemoteUser) {
        log::debug!("user joined: {}", user.id);
        self.users.insert(user.id.clone(), user);
    }

    /// Drop a user and everything derived from them.
    pub fn user_left(&mut self, user_id: &str) {
        log::debug!("user left: {user_id}");
        self.users.remove(user_id);
        self.cursors.remove(user_id);
        self.editing.retain(|_, holder| holder != user_id);
    }

    /// Replace the full participant list from a presence sync.
    pub fn sync_users(&mut self, users: Vec<RemoteUser>) {
        self.users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        self.cursors.retain(|id, _| self.users.contains_key(id));
        let known = &self.users;
        self.editing.retain(|_, holder| known.contains_key(holder));
    }

    pub fn cursor_moved(&mut self, user_id: &str, pos: CursorPos) {
        if self.users.contains_key(user_id) {
            self.cursors.insert(user_id.to_string(), pos);
        }
    }

    pub fn edit_started(&mut self, node: Uuid, user_id: &str) {
        self.editing.insert(node, user_id.to_string());
    }

    pub fn edit_ended(&mut self, node: Uuid) {
        self.editing.remove(&node);
    }

    /// A dropped connection invalidates all remote state.
    pub fn disconnected(&mut self) {
        self.connection = ConnectionState::Disconnected;
        self.users.clear();
        self.cursors.clear();
        self.editing.clear();
    }
}

/// What an activity entry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Joined,
    Left,
    Edited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub user: String,
    pub at: i64,
}

/// Bounded log of recent session activity, oldest evicted first.
#[derive(Debug)]
pub struct ActivityLog {
    events: VecDeque<ActivityEvent>,
    capacity: usize,
}

impl ActivityLog {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, kind: ActivityKind, user: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(ActivityEvent {
            kind,
            user: user.into(),
            at: now_millis(),
        });
    }

    /// Events from oldest to newest.
    pub fn events(&self) -> impl Iterator<Item = &ActivityEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
