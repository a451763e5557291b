//! Remote cursor smoothing.
//!
//! Raw cursor updates arrive throttled (every 50 ms or so); drawing them
//! directly looks jumpy at 60 fps. The interpolator keeps a displayed
//! position per user and eases it toward the latest report each tick. A
//! cursor that disappears fades out over half a second before removal.

use super::CursorPos;
use std::collections::HashMap;

/// Fraction of the remaining distance covered per tick.
const LERP_FACTOR: f64 = 0.35;
/// How long a vanished cursor stays visible while fading.
pub const FADE_DURATION_MS: u64 = 500;

#[derive(Debug, Clone)]
struct TrackedCursor {
    shown: CursorPos,
    target: CursorPos,
    /// Set when the owner disappeared; drives the fade.
    gone_since: Option<u64>,
}

/// A cursor as the host should draw it this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCursor {
    pub user: String,
    pub pos: CursorPos,
    /// 1.0 while live, easing to 0.0 during fade-out.
    pub alpha: f64,
}

#[derive(Debug, Default)]
pub struct CursorInterpolator {
    cursors: HashMap<String, TrackedCursor>,
}

impl CursorInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a fresh remote report. Revives a fading cursor.
    pub fn report(&mut self, user: &str, pos: CursorPos) {
        match self.cursors.get_mut(user) {
            Some(tracked) => {
                tracked.target = pos;
                tracked.gone_since = None;
            }
            None => {
                // First sighting snaps into place instead of easing in
                // from somewhere arbitrary.
                self.cursors.insert(
                    user.to_string(),
                    TrackedCursor {
                        shown: pos,
                        target: pos,
                        gone_since: None,
                    },
                );
            }
        }
    }

    /// Start fading a user's cursor (they left or stopped sharing).
    pub fn mark_gone(&mut self, user: &str, now_ms: u64) {
        if let Some(tracked) = self.cursors.get_mut(user) {
            tracked.gone_since.get_or_insert(now_ms);
        }
    }

    /// Advance one frame: ease every cursor toward its target, advance
    /// fades, drop fully faded cursors. Returns what to draw.
    pub fn tick(&mut self, now_ms: u64) -> Vec<DisplayCursor> {
        self.cursors.retain(|_, tracked| match tracked.gone_since {
            Some(gone) => now_ms.saturating_sub(gone) < FADE_DURATION_MS,
            None => true,
        });

        let mut out: Vec<DisplayCursor> = self
            .cursors
            .iter_mut()
            .map(|(user, tracked)| {
                tracked.shown.x += (tracked.target.x - tracked.shown.x) * LERP_FACTOR;
                tracked.shown.y += (tracked.target.y - tracked.shown.y) * LERP_FACTOR;
                tracked.shown.page = tracked.target.page;
                let alpha = match tracked.gone_since {
                    Some(gone) => {
                        1.0 - now_ms.saturating_sub(gone) as f64 / FADE_DURATION_MS as f64
                    }
                    None => 1.0,
                };
                DisplayCursor {
                    user: user.clone(),
                    pos: tracked.shown,
                    alpha,
                }
            })
            .collect();
        out.sort_by(|a, b| a.user.cmp(&b.user));
        out
    }

    pub fn remove(&mut self, user: &str) {
        self.cursors.remove(user);
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
