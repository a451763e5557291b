//! Cursor broadcast throttling.
//!
//! A pure scheduler over caller-supplied timestamps. No timers run inside;
//! the host feeds pointer positions and clock readings in, and gets back
//! the positions that should actually go over the wire.

use super::CursorPos;

/// Minimum spacing between cursor broadcasts.
pub const CURSOR_BROADCAST_INTERVAL_MS: u64 = 50;

/// Trailing-edge throttle: at most one send per interval, and the send
/// always carries the most recent pending position, so the remote side
/// ends up at the true final coordinate.
#[derive(Debug)]
pub struct CursorThrottle {
    last_sent: u64,
    pending: Option<CursorPos>,
}

impl CursorThrottle {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_sent: now_ms,
            pending: None,
        }
    }

    /// Record a new local cursor position. Returns the position to
    /// broadcast if the interval has elapsed.
    pub fn update(&mut self, pos: CursorPos, now_ms: u64) -> Option<CursorPos> {
        self.pending = Some(pos);
        self.poll(now_ms)
    }

    /// Flush a pending position once the interval has elapsed. Hosts call
    /// this from their frame tick so the trailing position goes out even
    /// when the pointer has stopped moving.
    pub fn poll(&mut self, now_ms: u64) -> Option<CursorPos> {
        if self.pending.is_some() && now_ms.saturating_sub(self.last_sent) >= CURSOR_BROADCAST_INTERVAL_MS
        {
            self.last_sent = now_ms;
            self.pending.take()
        } else {
            None
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
