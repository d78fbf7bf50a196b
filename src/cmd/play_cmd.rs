//! Dry-run playback of a replay against a simulated host (`clickreplay play`).

use clap::Args;
use serde::{Deserialize, Serialize};

use std::path::PathBuf;

use crate::{ByteStore, Event, EventLog, Progress, ReplayError, ReplayResult};

/// Upper bound on simulated frames per run.
pub const MAX_PLAY_FRAMES: i64 = 1_000_000;

#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    pub file: PathBuf,
    /// Position gained per simulated frame
    #[arg(long, default_value_t = 0)]
    pub step: i32,
    /// Last frame to simulate (defaults to just past the final event)
    #[arg(long)]
    pub until: Option<i32>,
    /// Rewind to this frame once playback reaches `--until`, then play again
    #[arg(long)]
    pub rewind_to: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickDelivery {
    pub frame: i32,
    pub position: i32,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayReport {
    pub path: String,
    pub frames: i32,
    pub delivered: usize,
    pub total: usize,
    pub done: bool,
    pub ticks: Vec<TickDelivery>,
}

pub fn play_command<S: ByteStore>(store: &S, args: &PlayArgs) -> ReplayResult<serde_json::Value> {
    if args.step < 0 {
        return Err(ReplayError::InvalidArgument(
            "--step must not be negative".to_string(),
        ));
    }
    let mut log = EventLog::load(store, &args.file).into_result()?;
    let until = match args.until {
        Some(until) => until,
        None => frame_limit(last_frame(&log, args.step))?,
    };
    frame_limit(i64::from(until) + 1)?;

    let mut ticks = Vec::new();
    play_range(&mut log, 0, until, args.step, &mut ticks);
    if let Some(frame) = args.rewind_to {
        frame_limit(i64::from(until) - i64::from(frame) + 1)?;
        let at = Progress::new(frame.saturating_mul(args.step), frame);
        log.rewind(at);
        play_range(&mut log, frame, until, args.step, &mut ticks);
    }

    let report = PlayReport {
        path: args.file.to_string_lossy().to_string(),
        frames: until,
        delivered: ticks.iter().map(|t| t.events.len()).sum(),
        total: log.len(),
        done: log.is_done(),
        ticks,
    };
    Ok(serde_json::to_value(report)?)
}

/// Advances the simulated host one frame at a time, collecting what each
/// frame delivers.
fn play_range(log: &mut EventLog, from: i32, until: i32, step: i32, ticks: &mut Vec<TickDelivery>) {
    for frame in from..=until {
        let position = frame.saturating_mul(step);
        let events = log.drain_due(Progress::new(position, frame));
        if !events.is_empty() {
            ticks.push(TickDelivery {
                frame,
                position,
                events,
            });
        }
    }
}

/// First frame by which every event has been reached.
fn last_frame(log: &EventLog, step: i32) -> i64 {
    let step = i64::from(step);
    log.events()
        .iter()
        .map(|e| {
            let position = i64::from(e.position);
            let by_position = if step > 0 && position > 0 {
                (position + step - 1) / step
            } else {
                0
            };
            i64::from(e.timestamp).max(by_position)
        })
        .max()
        .unwrap_or(0)
}

fn frame_limit(frames: i64) -> ReplayResult<i32> {
    if frames > MAX_PLAY_FRAMES {
        return Err(ReplayError::InvalidArgument(format!(
            "playback would simulate {frames} frames (limit {MAX_PLAY_FRAMES}); pass a smaller --until"
        )));
    }
    i32::try_from(frames).map_err(|_| ReplayError::InvalidArgument(format!("frame {frames} out of range")))
}
