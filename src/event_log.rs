//! The ordered event log and every edit that can be made to it.

use serde::{Deserialize, Serialize};

use crate::{
    CoordinateMode, Event, NOT_APPLICABLE, Player, PlaybackCursor, Progress, ReplayError,
    ReplayResult,
};

pub const DEFAULT_SAMPLE_RATE: f32 = 60.0;

/// An ordered, editable sequence of input events plus the metadata needed to
/// encode it. Also owns the playback cursor (see `playback.rs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub(crate) sample_rate: f32,
    pub(crate) mode: CoordinateMode,
    pub(crate) events: Vec<Event>,
    #[serde(skip)]
    pub(crate) cursor: PlaybackCursor,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, CoordinateMode::TimestampOnly)
    }
}

impl EventLog {
    pub fn new(sample_rate: f32, mode: CoordinateMode) -> Self {
        Self {
            sample_rate,
            mode,
            events: Vec::new(),
            cursor: PlaybackCursor::default(),
        }
    }

    pub fn with_events(sample_rate: f32, mode: CoordinateMode, events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::new(sample_rate, mode)
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn mode(&self) -> CoordinateMode {
        self.mode
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Direct access to the stored events. Callers are responsible for
    /// keeping every event's channels consistent with `mode()`.
    pub fn events_mut(&mut self) -> &mut [Event] {
        &mut self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get_at(&self, index: usize) -> ReplayResult<&Event> {
        let len = self.events.len();
        self.events
            .get(index)
            .ok_or(ReplayError::IndexOutOfRange { index, len })
    }

    pub fn get_at_mut(&mut self, index: usize) -> ReplayResult<&mut Event> {
        let len = self.events.len();
        self.events
            .get_mut(index)
            .ok_or(ReplayError::IndexOutOfRange { index, len })
    }

    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Inserts `event` before the element currently at `index`. `index == len`
    /// appends.
    pub fn insert_at(&mut self, index: usize, event: Event) -> ReplayResult<()> {
        let len = self.events.len();
        if index > len {
            return Err(ReplayError::IndexOutOfRange { index, len });
        }
        self.events.insert(index, event);
        if index < self.cursor.index() {
            self.cursor.set(self.cursor.index() + 1);
        }
        Ok(())
    }

    /// Swaps the event at `index` with its predecessor. Returns false when
    /// there is nothing to swap with.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.events.len() {
            return false;
        }
        self.events.swap(index, index - 1);
        true
    }

    /// Swaps the event at `index` with its successor. Returns false when
    /// there is nothing to swap with.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index >= self.events.len().saturating_sub(1) {
            return false;
        }
        self.events.swap(index, index + 1);
        true
    }

    /// Removes the event at `index`; out of range is a no-op returning `None`.
    pub fn delete_at(&mut self, index: usize) -> Option<Event> {
        if index >= self.events.len() {
            return None;
        }
        let removed = self.events.remove(index);
        if index < self.cursor.index() {
            self.cursor.set(self.cursor.index() - 1);
        }
        Some(removed)
    }

    /// Stable sort by event order.
    ///
    /// Event order is only partial in `Both` mode, which the std sorts do not
    /// accept, so this is an insertion sort that only moves an event past
    /// neighbours it strictly precedes.
    pub fn sort(&mut self) {
        // A single shared channel orders events totally; only logs mixing
        // two-channel events need the partial-order pass.
        if self.events.iter().all(|e| e.position == NOT_APPLICABLE) {
            self.events.sort_by_key(|e| e.timestamp);
        } else if self
            .events
            .iter()
            .all(|e| e.timestamp == NOT_APPLICABLE && e.position != NOT_APPLICABLE)
        {
            self.events.sort_by_key(|e| e.position);
        } else {
            insertion_sort(&mut self.events);
        }
    }

    /// Moves every real event of `other` into this log and re-sorts.
    ///
    /// With `force_player2`, presses and releases are relabelled onto player
    /// two. The relabelling is written back into `other` as well.
    pub fn merge(&mut self, other: &mut EventLog, force_player2: bool) {
        let incoming = other.events.iter().filter(|e| !e.kind.is_none()).count();
        self.events.reserve(incoming);
        for event in other.events.iter_mut() {
            if event.kind.is_none() {
                continue;
            }
            if force_player2 {
                event.kind = event.kind.as_player2();
            }
            self.events.push(*event);
        }
        self.sort();
        tracing::debug!(incoming, force_player2, total = self.events.len(), "merged event logs");
    }

    /// Drops repeated transitions so each player's presses and releases
    /// alternate. Returns how many events were removed.
    pub fn dedupe(&mut self) -> usize {
        let mut last_p1 = None;
        let mut last_p2 = None;
        let mut removed = 0;
        let mut i = 0;
        while i < self.events.len() {
            let kind = self.events[i].kind;
            let last = match kind.player() {
                Some(Player::One) => &mut last_p1,
                Some(Player::Two) => &mut last_p2,
                None => {
                    i += 1;
                    continue;
                }
            };
            if *last == Some(kind) {
                self.delete_at(i);
                removed += 1;
            } else {
                *last = Some(kind);
                i += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "removed repeated transitions");
        }
        removed
    }

    /// Deletes every event at or after `at`. Used when a new take starts
    /// from the middle of an existing recording.
    pub fn truncate_from(&mut self, at: Progress) -> usize {
        let mode = self.mode;
        let before = self.events.len();
        self.events.retain(|e| !mode.is_at_or_after(e, at));
        self.cursor.clamp(self.events.len());
        let removed = before - self.events.len();
        tracing::debug!(removed, ?at, "truncated event log");
        removed
    }

    /// With `recording` set, rewinds the cursor towards `at`; otherwise
    /// drops everything at or after `at` from the log.
    pub fn reset(&mut self, at: Progress, recording: bool) {
        if recording {
            self.rewind(at);
        } else {
            self.truncate_from(at);
        }
    }

    /// Releases spare capacity once editing is finished.
    pub fn finalize(&mut self) {
        self.events.shrink_to_fit();
    }
}

/// Stable sort that only moves an event past neighbours it strictly precedes.
fn insertion_sort(events: &mut [Event]) {
    for i in 1..events.len() {
        let mut j = i;
        while j > 0 && events[j].precedes(&events[j - 1]) {
            events.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputKind;
    use rand_chacha::ChaCha8Rng;
    use rand_core::{RngCore as _, SeedableRng as _};

    fn frames(timestamps: &[i32]) -> EventLog {
        let mut log = EventLog::new(60.0, CoordinateMode::TimestampOnly);
        for (i, t) in timestamps.iter().enumerate() {
            let kind = if i % 2 == 0 {
                InputKind::Player1Release
            } else {
                InputKind::Player1Press
            };
            log.append(Event::at_frame(kind, *t));
        }
        log
    }

    fn timestamps(log: &EventLog) -> Vec<i32> {
        log.events().iter().map(|e| e.timestamp).collect()
    }

    #[test]
    fn insert_then_sort_restores_time_order() {
        let mut log = frames(&[20, 40, 60, 80]);
        log.insert_at(2, Event::at_frame(InputKind::Player1Press, 100))
            .expect("insert");
        log.insert_at(3, Event::at_frame(InputKind::Player1Release, 110))
            .expect("insert");
        assert_eq!(timestamps(&log), vec![20, 40, 100, 110, 60, 80]);

        log.sort();
        assert_eq!(timestamps(&log), vec![20, 40, 60, 80, 100, 110]);
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let mut log = frames(&[1, 2]);
        let err = log
            .insert_at(3, Event::at_frame(InputKind::Player1Press, 3))
            .unwrap_err();
        assert!(matches!(err, ReplayError::IndexOutOfRange { index: 3, len: 2 }));
        log.insert_at(2, Event::at_frame(InputKind::Player1Press, 3))
            .expect("append position");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn moves_are_no_ops_at_the_edges() {
        let mut log = frames(&[1, 2, 3]);
        assert!(!log.move_up(0));
        assert!(!log.move_down(2));
        assert!(!log.move_down(7));
        assert!(log.move_up(2));
        assert_eq!(timestamps(&log), vec![1, 3, 2]);
        assert!(log.move_down(0));
        assert_eq!(timestamps(&log), vec![3, 1, 2]);
    }

    #[test]
    fn delete_out_of_range_is_lenient() {
        let mut log = frames(&[1, 2]);
        assert_eq!(log.delete_at(5), None);
        assert_eq!(log.delete_at(0).map(|e| e.timestamp), Some(1));
        assert_eq!(timestamps(&log), vec![2]);
    }

    #[test]
    fn get_at_rejects_out_of_range() {
        let log = frames(&[1]);
        assert_eq!(log.get_at(0).expect("first").timestamp, 1);
        assert!(matches!(
            log.get_at(1),
            Err(ReplayError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn sort_keeps_ties_in_insertion_order() {
        let mut log = EventLog::new(60.0, CoordinateMode::TimestampOnly);
        log.append(Event::at_frame(InputKind::Player2Press, 10));
        log.append(Event::at_frame(InputKind::Player1Press, 5));
        log.append(Event::at_frame(InputKind::Player1Release, 10));
        log.sort();
        let kinds: Vec<_> = log.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InputKind::Player1Press,
                InputKind::Player2Press,
                InputKind::Player1Release
            ]
        );
    }

    #[test]
    fn sort_twice_is_stable_in_both_mode() {
        let mut log = EventLog::new(60.0, CoordinateMode::Both);
        for (x, t) in [(300, 10), (100, 30), (200, 20), (50, 5), (400, 1)] {
            log.append(Event::new(InputKind::Player1Press, x, t));
        }
        log.sort();
        let once = log.events().to_vec();
        log.sort();
        assert_eq!(log.events(), once.as_slice());
    }

    #[test]
    fn keyed_sort_matches_the_partial_order_pass() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        for _ in 0..16 {
            let count = rng.next_u32() % 200;
            let mut by_frame = EventLog::new(60.0, CoordinateMode::TimestampOnly);
            let mut by_position = EventLog::new(60.0, CoordinateMode::PositionOnly);
            for _ in 0..count {
                let kind = InputKind::from_byte((rng.next_u32() % 4) as i8);
                let value = (rng.next_u32() % 50) as i32;
                by_frame.append(Event::at_frame(kind, value));
                by_position.append(Event::at_position(kind, value));
            }
            for log in [&mut by_frame, &mut by_position] {
                let mut expected = log.events().to_vec();
                insertion_sort(&mut expected);
                log.sort();
                assert_eq!(log.events(), expected.as_slice());
            }
        }
    }

    #[test]
    fn merging_large_sorted_logs_interleaves_them() {
        let mut target = EventLog::new(60.0, CoordinateMode::TimestampOnly);
        let mut source = EventLog::new(60.0, CoordinateMode::TimestampOnly);
        for t in 0..20_000 {
            target.append(Event::at_frame(InputKind::Player1Press, t * 2));
            source.append(Event::at_frame(InputKind::Player1Release, t * 2 + 1));
        }
        target.merge(&mut source, true);
        assert_eq!(target.len(), 40_000);
        assert!(target.events().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(target.events()[1].kind, InputKind::Player2Release);
    }

    #[test]
    fn merge_relabels_source_and_skips_none() {
        let mut target = frames(&[10, 30]);
        let mut source = EventLog::new(60.0, CoordinateMode::TimestampOnly);
        source.append(Event::at_frame(InputKind::Player1Press, 20));
        source.append(Event::at_frame(InputKind::None, 25));
        source.append(Event::at_frame(InputKind::Player1Release, 40));

        target.merge(&mut source, true);

        assert_eq!(timestamps(&target), vec![10, 20, 30, 40]);
        assert_eq!(target.events()[1].kind, InputKind::Player2Press);
        assert_eq!(target.events()[3].kind, InputKind::Player2Release);
        assert_eq!(source.events()[0].kind, InputKind::Player2Press);
        assert_eq!(source.events()[1].kind, InputKind::None);
    }

    #[test]
    fn merge_without_force_keeps_players() {
        let mut target = EventLog::new(60.0, CoordinateMode::TimestampOnly);
        let mut source = frames(&[5]);
        target.merge(&mut source, false);
        assert_eq!(target.events()[0].kind, InputKind::Player1Release);
    }

    #[test]
    fn dedupe_removes_repeats_per_player() {
        let mut log = EventLog::new(60.0, CoordinateMode::TimestampOnly);
        for (kind, t) in [
            (InputKind::Player1Press, 1),
            (InputKind::Player2Press, 2),
            (InputKind::Player1Press, 3),
            (InputKind::Player1Press, 4),
            (InputKind::Player2Release, 5),
            (InputKind::Player1Release, 6),
            (InputKind::Player2Release, 7),
        ] {
            log.append(Event::at_frame(kind, t));
        }

        assert_eq!(log.dedupe(), 3);
        assert_eq!(timestamps(&log), vec![1, 2, 5, 6]);
        assert_eq!(log.dedupe(), 0);
    }

    #[test]
    fn truncate_removes_everything_from_the_cutoff() {
        let mut log = frames(&[20, 40, 60, 80, 100, 110]);
        log.reset(Progress::at_frame(90), false);
        assert_eq!(timestamps(&log), vec![20, 40, 60, 80]);
    }

    #[test]
    fn truncate_in_both_mode_needs_every_channel_past_cutoff() {
        let mut log = EventLog::new(60.0, CoordinateMode::Both);
        log.append(Event::new(InputKind::Player1Press, 100, 10));
        log.append(Event::new(InputKind::Player1Release, 300, 5));
        log.append(Event::new(InputKind::Player1Press, 400, 40));
        assert_eq!(log.truncate_from(Progress::new(200, 8)), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[1].position, 300);
    }

    #[test]
    fn finalize_keeps_contents() {
        let mut log = frames(&[1, 2, 3]);
        log.finalize();
        assert_eq!(timestamps(&log), vec![1, 2, 3]);
    }
}
