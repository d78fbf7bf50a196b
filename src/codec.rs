//! Binary replay format.
//!
//! Little-endian, no padding:
//!
//! ```text
//! f32  sample rate
//! u8   coordinate mode (0 = position, 1 = timestamp, 2 = both)
//! then records until the end of the buffer:
//!   i8   kind
//!   i32  position   (position and both modes)
//!   i32  timestamp  (timestamp and both modes)
//! ```

use crate::{CoordinateMode, Event, EventLog, InputKind, NOT_APPLICABLE, ReplayError, ReplayResult};

pub const HEADER_LEN: usize = 5;

/// Bounds-checked little-endian reader over a byte slice.
#[derive(Debug)]
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, needed: usize) -> ReplayResult<()> {
        if self.remaining() < needed {
            return Err(ReplayError::TruncatedInput {
                offset: self.offset,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> ReplayResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.offset..self.offset + N]);
        self.offset += N;
        Ok(out)
    }

    fn read_u8(&mut self) -> ReplayResult<u8> {
        Ok(u8::from_le_bytes(self.take::<1>()?))
    }

    fn read_i8(&mut self) -> ReplayResult<i8> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    fn read_i32(&mut self) -> ReplayResult<i32> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    fn read_f32(&mut self) -> ReplayResult<f32> {
        Ok(f32::from_le_bytes(self.take::<4>()?))
    }
}

/// Result of decoding a byte stream: whatever could be parsed plus the error
/// that stopped parsing, if any.
#[derive(Debug)]
pub struct Decoded {
    pub log: EventLog,
    pub error: Option<ReplayError>,
}

impl Decoded {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discards the partial log on failure.
    pub fn into_result(self) -> ReplayResult<EventLog> {
        match self.error {
            None => Ok(self.log),
            Some(err) => Err(err),
        }
    }
}

impl EventLog {
    /// Parses a byte stream. Records are kept in stream order; a stream that
    /// ends mid-record keeps every complete record before it.
    pub fn decode(bytes: &[u8]) -> Decoded {
        let mut log = EventLog::default();
        let error = decode_into(&mut log, bytes).err();
        match &error {
            None => tracing::debug!(
                bytes = bytes.len(),
                events = log.len(),
                mode = ?log.mode,
                "decoded event log"
            ),
            Some(err) => tracing::warn!(
                bytes = bytes.len(),
                events = log.len(),
                "event log decode stopped early: {err}"
            ),
        }
        Decoded { log, error }
    }

    pub fn from_bytes(bytes: &[u8]) -> ReplayResult<Self> {
        Self::decode(bytes).into_result()
    }

    /// Number of events that will be written; `None` events are skipped.
    pub fn persisted_len(&self) -> usize {
        self.events.iter().filter(|e| !e.kind.is_none()).count()
    }

    /// Exact size `encode` must produce.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.persisted_len() * self.mode.record_width()
    }

    pub fn encode(&self) -> ReplayResult<Vec<u8>> {
        let expected = self.encoded_len();
        let mut out = Vec::with_capacity(expected);
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.push(self.mode.to_byte());

        for event in self.events.iter().filter(|e| !e.kind.is_none()) {
            out.extend_from_slice(&event.kind.to_byte().to_le_bytes());
            match self.mode {
                CoordinateMode::PositionOnly => {
                    out.extend_from_slice(&event.position.to_le_bytes());
                }
                CoordinateMode::TimestampOnly => {
                    out.extend_from_slice(&event.timestamp.to_le_bytes());
                }
                CoordinateMode::Both => {
                    out.extend_from_slice(&event.position.to_le_bytes());
                    out.extend_from_slice(&event.timestamp.to_le_bytes());
                }
            }
        }

        if out.len() != expected {
            tracing::warn!(expected, actual = out.len(), "encoded size mismatch");
            return Err(ReplayError::Serialization {
                expected,
                actual: out.len(),
            });
        }
        tracing::debug!(bytes = out.len(), events = self.persisted_len(), "encoded event log");
        Ok(out)
    }
}

fn decode_into(log: &mut EventLog, bytes: &[u8]) -> ReplayResult<()> {
    let mut reader = ByteReader::new(bytes);
    log.sample_rate = reader.read_f32()?;
    let mode_byte = reader.read_u8()?;
    log.mode = CoordinateMode::from_byte(mode_byte).ok_or(ReplayError::UnknownMode(mode_byte))?;

    let width = log.mode.record_width();
    while !reader.is_empty() {
        reader.ensure(width)?;
        let kind = InputKind::from_byte(reader.read_i8()?);
        let (position, timestamp) = match log.mode {
            CoordinateMode::PositionOnly => (reader.read_i32()?, NOT_APPLICABLE),
            CoordinateMode::TimestampOnly => (NOT_APPLICABLE, reader.read_i32()?),
            CoordinateMode::Both => {
                let position = reader.read_i32()?;
                (position, reader.read_i32()?)
            }
        };
        log.append(Event::new(kind, position, timestamp));
    }
    Ok(())
}
