//! Comment threads anchored to page positions.

use super::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single comment inside a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Identifier of the author (host-assigned user id).
    pub author: String,
    pub content: String,
    /// User ids mentioned with `@` in the content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    /// Emoji -> user ids who reacted with it.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reactions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub edited: bool,
    pub created_at: i64,
}

impl Comment {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            content: content.into(),
            mentions: Vec::new(),
            reactions: BTreeMap::new(),
            edited: false,
            created_at: now_millis(),
        }
    }

    /// Add or remove a user's reaction for an emoji.
    /// Empty reaction lists are dropped so serialization stays compact.
    pub fn toggle_reaction(&mut self, emoji: &str, user: &str) {
        let users = self.reactions.entry(emoji.to_string()).or_default();
        if let Some(pos) = users.iter().position(|u| u == user) {
            users.remove(pos);
            if users.is_empty() {
                self.reactions.remove(emoji);
            }
        } else {
            users.push(user.to_string());
        }
    }
}

/// A comment conversation anchored to a point on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationThread {
    pub id: Uuid,
    /// 1-based page number.
    pub page: u32,
    /// Anchor position, normalized.
    pub x: f64,
    pub y: f64,
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<i64>,
}

impl AnnotationThread {
    /// Create a thread with its first comment.
    pub fn new(page: u32, x: f64, y: f64, first: Comment) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            x,
            y,
            comments: vec![first],
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        }
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Edit a comment's content, marking it edited.
    /// Returns false if the comment is not in this thread.
    pub fn edit_comment(&mut self, comment_id: Uuid, content: impl Into<String>) -> bool {
        match self.comments.iter_mut().find(|c| c.id == comment_id) {
            Some(comment) => {
                comment.content = content.into();
                comment.edited = true;
                true
            }
            None => false,
        }
    }

    /// Remove a comment. Returns true if the thread is now empty and
    /// should be dropped by the owner.
    pub fn delete_comment(&mut self, comment_id: Uuid) -> bool {
        self.comments.retain(|c| c.id != comment_id);
        self.comments.is_empty()
    }

    pub fn resolve(&mut self, by: impl Into<String>) {
        self.resolved = true;
        self.resolved_by = Some(by.into());
        self.resolved_at = Some(now_millis());
    }

    pub fn reopen(&mut self) {
        self.resolved = false;
        self.resolved_by = None;
        self.resolved_at = None;
    }
}
