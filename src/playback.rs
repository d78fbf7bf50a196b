//! Cursor-driven playback: hands out each due event exactly once, in order.

use crate::{CoordinateMode, Event, EventLog, InputKind, Player, Progress, ReplayError, ReplayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Events remain to be delivered.
    Active,
    /// Every event has been delivered.
    Done,
}

/// Read position into an event log. Everything before `index` has been
/// delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    index: usize,
}

impl PlaybackCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self, len: usize) -> CursorState {
        if self.index >= len {
            CursorState::Done
        } else {
            CursorState::Active
        }
    }

    pub(crate) fn set(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len);
    }

    /// Index of the next event if it is due, advancing past it.
    fn take_due(&mut self, events: &[Event], mode: CoordinateMode, at: Progress) -> Option<usize> {
        let event = events.get(self.index)?;
        if !mode.is_due(event, at) {
            return None;
        }
        let idx = self.index;
        self.index += 1;
        Some(idx)
    }

    /// Steps back while the slot under the cursor is at or after `at`. Stops
    /// at 0 or on the first event strictly before `at`.
    fn rewind(&mut self, events: &[Event], mode: CoordinateMode, at: Progress) {
        if at.is_origin() {
            self.index = 0;
            return;
        }
        self.clamp(events.len());
        while self.index > 0
            && events
                .get(self.index)
                .is_none_or(|e| mode.is_at_or_after(e, at))
        {
            self.index -= 1;
        }
    }

    fn last_delivered(&self, events: &[Event], player: Player) -> Option<usize> {
        let end = self.index.min(events.len());
        events[..end]
            .iter()
            .rposition(|e| e.kind.player() == Some(player))
    }
}

impl EventLog {
    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state(self.events.len())
    }

    pub fn is_done(&self) -> bool {
        self.cursor_state() == CursorState::Done
    }

    /// Places the cursor explicitly. `index == len` marks the log as done.
    pub fn seek(&mut self, index: usize) -> ReplayResult<()> {
        let len = self.events.len();
        if index > len {
            return Err(ReplayError::IndexOutOfRange { index, len });
        }
        self.cursor.set(index);
        Ok(())
    }

    /// Moves the cursor back so playback can resume from `at`. The origin
    /// always rewinds to the first event.
    pub fn rewind(&mut self, at: Progress) {
        let from = self.cursor.index();
        self.cursor.rewind(&self.events, self.mode, at);
        tracing::debug!(from, to = self.cursor.index(), ?at, "rewound playback cursor");
    }

    /// The next event if it is due at `at`, consuming it. At most one event
    /// per call.
    pub fn peek_due(&mut self, at: Progress) -> Option<Event> {
        self.peek_due_mut(at).map(|e| *e)
    }

    /// Like `peek_due` but hands out the stored event itself, so edits made
    /// through the reference land in the log.
    pub fn peek_due_mut(&mut self, at: Progress) -> Option<&mut Event> {
        let idx = self.cursor.take_due(&self.events, self.mode, at)?;
        self.events.get_mut(idx)
    }

    /// Every event due at `at`, in stored order.
    pub fn drain_due(&mut self, at: Progress) -> Vec<Event> {
        let mut due = Vec::new();
        while let Some(event) = self.peek_due(at) {
            due.push(event);
        }
        due
    }

    /// Kinds of every event due at `at`.
    pub fn due_kinds(&mut self, at: Progress) -> Vec<InputKind> {
        self.drain_due(at).into_iter().map(|e| e.kind).collect()
    }

    /// Visits every event due at `at` in place. Returns how many were visited.
    pub fn for_each_due<F>(&mut self, at: Progress, mut visitor: F) -> usize
    where
        F: FnMut(&mut Event),
    {
        let mut visited = 0;
        while let Some(event) = self.peek_due_mut(at) {
            visitor(event);
            visited += 1;
        }
        visited
    }

    /// Most recently delivered event belonging to `player`. Does not move the
    /// cursor.
    pub fn last_delivered(&self, player: Player) -> Option<&Event> {
        let idx = self.cursor.last_delivered(&self.events, player)?;
        self.events.get(idx)
    }

    pub fn last_delivered_mut(&mut self, player: Player) -> Option<&mut Event> {
        let idx = self.cursor.last_delivered(&self.events, player)?;
        self.events.get_mut(idx)
    }

    /// First event, scanning from the start of the log, that is due at `at`.
    /// Ignores the cursor.
    pub fn find_at(&self, at: Progress) -> Option<&Event> {
        let mode = self.mode;
        self.events.iter().find(|e| mode.is_due(e, at))
    }

    pub fn find_at_mut(&mut self, at: Progress) -> Option<&mut Event> {
        let mode = self.mode;
        self.events.iter_mut().find(|e| mode.is_due(e, at))
    }
}
