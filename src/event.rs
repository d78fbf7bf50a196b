//! Recorded input events and the coordinate rules used to place them in time.

use serde::{Deserialize, Serialize};

/// Channel value meaning "this event does not carry the channel".
pub const NOT_APPLICABLE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    One,
    Two,
}

/// What kind of input transition an event records.
///
/// `None` marks "no event" inside a log and is never written to a byte
/// stream. Kind bytes that do not match a known transition are kept as
/// `Unknown` so they survive a decode/encode cycle untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    None,
    Player1Press,
    Player1Release,
    Player2Press,
    Player2Release,
    Unknown(i8),
}

impl InputKind {
    pub fn from_byte(byte: i8) -> Self {
        match byte {
            -1 => Self::None,
            0 => Self::Player1Release,
            1 => Self::Player1Press,
            2 => Self::Player2Release,
            3 => Self::Player2Press,
            other => Self::Unknown(other),
        }
    }

    pub fn to_byte(self) -> i8 {
        match self {
            Self::None => -1,
            Self::Player1Release => 0,
            Self::Player1Press => 1,
            Self::Player2Release => 2,
            Self::Player2Press => 3,
            Self::Unknown(other) => other,
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }

    pub fn player(self) -> Option<Player> {
        match self {
            Self::Player1Press | Self::Player1Release => Some(Player::One),
            Self::Player2Press | Self::Player2Release => Some(Player::Two),
            Self::None | Self::Unknown(_) => None,
        }
    }

    pub fn is_press(self) -> bool {
        matches!(self, Self::Player1Press | Self::Player2Press)
    }

    /// The same transition relabelled onto player two. Kinds that are not a
    /// press or release are returned unchanged.
    pub fn as_player2(self) -> Self {
        match self {
            Self::Player1Press | Self::Player2Press => Self::Player2Press,
            Self::Player1Release | Self::Player2Release => Self::Player2Release,
            other => other,
        }
    }
}

/// Which channels every event of a log carries. Fixes the encoded record width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateMode {
    PositionOnly,
    TimestampOnly,
    Both,
}

impl CoordinateMode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::PositionOnly),
            1 => Some(Self::TimestampOnly),
            2 => Some(Self::Both),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::PositionOnly => 0,
            Self::TimestampOnly => 1,
            Self::Both => 2,
        }
    }

    pub fn carries_position(self) -> bool {
        self != Self::TimestampOnly
    }

    pub fn carries_timestamp(self) -> bool {
        self != Self::PositionOnly
    }

    /// Encoded size of one event record: the kind byte plus one `i32` per channel.
    pub fn record_width(self) -> usize {
        match self {
            Self::Both => 1 + 8,
            Self::PositionOnly | Self::TimestampOnly => 1 + 4,
        }
    }

    /// An event is due once any channel it carries has been reached.
    pub fn is_due(self, event: &Event, at: Progress) -> bool {
        (self.carries_position()
            && event.position != NOT_APPLICABLE
            && event.position <= at.position)
            || (self.carries_timestamp()
                && event.timestamp != NOT_APPLICABLE
                && event.timestamp <= at.timestamp)
    }

    /// An event sits at or after `at` when every channel it carries does. A
    /// channel the mode or the event does not carry never holds it back.
    pub fn is_at_or_after(self, event: &Event, at: Progress) -> bool {
        (!self.carries_position()
            || event.position == NOT_APPLICABLE
            || event.position >= at.position)
            && (!self.carries_timestamp()
                || event.timestamp == NOT_APPLICABLE
                || event.timestamp >= at.timestamp)
    }
}

/// How far the host simulation has advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub position: i32,
    pub timestamp: i32,
}

impl Progress {
    pub fn new(position: i32, timestamp: i32) -> Self {
        Self {
            position,
            timestamp,
        }
    }

    pub fn at_position(position: i32) -> Self {
        Self::new(position, NOT_APPLICABLE)
    }

    pub fn at_frame(timestamp: i32) -> Self {
        Self::new(NOT_APPLICABLE, timestamp)
    }

    pub fn is_origin(self) -> bool {
        matches!(self.position, 0 | NOT_APPLICABLE) && matches!(self.timestamp, 0 | NOT_APPLICABLE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub kind: InputKind,
    pub position: i32,
    pub timestamp: i32,
}

impl Event {
    pub fn new(kind: InputKind, position: i32, timestamp: i32) -> Self {
        Self {
            kind,
            position,
            timestamp,
        }
    }

    pub fn at_position(kind: InputKind, position: i32) -> Self {
        Self::new(kind, position, NOT_APPLICABLE)
    }

    pub fn at_frame(kind: InputKind, timestamp: i32) -> Self {
        Self::new(kind, NOT_APPLICABLE, timestamp)
    }

    /// Strictly earlier than `other`.
    ///
    /// Compares on whichever channel both events carry. When both carry both
    /// channels, each channel must agree, so some pairs are neither earlier
    /// nor later than each other.
    pub fn precedes(&self, other: &Event) -> bool {
        if self.position == NOT_APPLICABLE || other.position == NOT_APPLICABLE {
            self.timestamp < other.timestamp
        } else if self.timestamp == NOT_APPLICABLE || other.timestamp == NOT_APPLICABLE {
            self.position < other.position
        } else {
            self.timestamp < other.timestamp && self.position < other.position
        }
    }

    /// Strictly later than `other`.
    pub fn follows(&self, other: &Event) -> bool {
        other.precedes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_bytes_map_both_ways() {
        for byte in -1i8..=3 {
            assert_eq!(InputKind::from_byte(byte).to_byte(), byte);
        }
        assert_eq!(InputKind::from_byte(42), InputKind::Unknown(42));
        assert_eq!(InputKind::Unknown(42).to_byte(), 42);
    }

    #[test]
    fn release_is_the_even_byte_of_each_player() {
        assert_eq!(InputKind::from_byte(0), InputKind::Player1Release);
        assert_eq!(InputKind::from_byte(1), InputKind::Player1Press);
        assert_eq!(InputKind::from_byte(2), InputKind::Player2Release);
        assert_eq!(InputKind::from_byte(3), InputKind::Player2Press);
        assert_eq!(InputKind::Player1Press.to_byte(), 1);
        assert_eq!(InputKind::Player2Release.to_byte(), 2);
    }

    #[test]
    fn player2_relabel_keeps_direction() {
        assert_eq!(InputKind::Player1Press.as_player2(), InputKind::Player2Press);
        assert_eq!(InputKind::Player1Release.as_player2(), InputKind::Player2Release);
        assert_eq!(InputKind::Player2Release.as_player2(), InputKind::Player2Release);
        assert_eq!(InputKind::Unknown(9).as_player2(), InputKind::Unknown(9));
    }

    #[test]
    fn ordering_falls_back_to_the_shared_channel() {
        let a = Event::at_frame(InputKind::Player1Press, 10);
        let b = Event::at_frame(InputKind::Player1Release, 20);
        assert!(a.precedes(&b));
        assert!(b.follows(&a));

        let c = Event::at_position(InputKind::Player1Press, 300);
        let d = Event::at_position(InputKind::Player1Release, 100);
        assert!(d.precedes(&c));
    }

    #[test]
    fn both_channels_must_agree() {
        let a = Event::new(InputKind::Player1Press, 100, 10);
        let b = Event::new(InputKind::Player1Release, 50, 20);
        assert!(!a.precedes(&b));
        assert!(!a.follows(&b));
        assert_ne!(a, b);

        let c = Event::new(InputKind::Player1Release, 150, 20);
        assert!(a.precedes(&c));
    }

    #[test]
    fn due_in_both_mode_when_either_channel_is_reached() {
        let e = Event::new(InputKind::Player1Press, 500, 30);
        let mode = CoordinateMode::Both;
        assert!(mode.is_due(&e, Progress::new(100, 30)));
        assert!(mode.is_due(&e, Progress::new(500, 0)));
        assert!(!mode.is_due(&e, Progress::new(499, 29)));
    }

    #[test]
    fn due_ignores_channels_the_mode_does_not_carry() {
        let e = Event::new(InputKind::Player1Press, 5, 30);
        assert!(!CoordinateMode::TimestampOnly.is_due(&e, Progress::new(1000, 10)));
        assert!(CoordinateMode::PositionOnly.is_due(&e, Progress::new(5, 0)));
    }

    #[test]
    fn at_or_after_treats_missing_channels_as_past() {
        let e = Event::at_frame(InputKind::Player1Press, 40);
        let mode = CoordinateMode::Both;
        assert!(mode.is_at_or_after(&e, Progress::new(9999, 40)));
        assert!(!mode.is_at_or_after(&e, Progress::new(0, 41)));
    }

    #[test]
    fn origin_accepts_zero_or_not_applicable() {
        assert!(Progress::new(0, 0).is_origin());
        assert!(Progress::at_frame(0).is_origin());
        assert!(Progress::at_position(0).is_origin());
        assert!(!Progress::at_frame(1).is_origin());
    }

    #[test]
    fn record_widths() {
        assert_eq!(CoordinateMode::PositionOnly.record_width(), 5);
        assert_eq!(CoordinateMode::TimestampOnly.record_width(), 5);
        assert_eq!(CoordinateMode::Both.record_width(), 9);
    }
}
