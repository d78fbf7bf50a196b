//! Commands that rewrite replay files (`clickreplay sort`, `clickreplay merge`, ...).

use clap::{Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

use crate::{
    ByteStore, Config, CoordinateMode, Event, EventLog, InputKind, NOT_APPLICABLE, Progress,
    ReplayError, ReplayResult, tagged_path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Position,
    Timestamp,
    Both,
}

impl From<ModeArg> for CoordinateMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Position => Self::PositionOnly,
            ModeArg::Timestamp => Self::TimestampOnly,
            ModeArg::Both => Self::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    P1Press,
    P1Release,
    P2Press,
    P2Release,
}

impl From<KindArg> for InputKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::P1Press => Self::Player1Press,
            KindArg::P1Release => Self::Player1Release,
            KindArg::P2Press => Self::Player2Press,
            KindArg::P2Release => Self::Player2Release,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum EditCommand {
    /// Create an empty replay
    New {
        file: PathBuf,
        #[arg(long)]
        sample_rate: Option<f32>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Insert an event before INDEX (INDEX == count appends)
    Insert {
        file: PathBuf,
        index: usize,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long, default_value_t = NOT_APPLICABLE, allow_negative_numbers = true)]
        position: i32,
        #[arg(long, default_value_t = NOT_APPLICABLE, allow_negative_numbers = true)]
        timestamp: i32,
    },
    /// Delete the event at INDEX
    Delete { file: PathBuf, index: usize },
    /// Swap the event at INDEX with its predecessor
    MoveUp { file: PathBuf, index: usize },
    /// Swap the event at INDEX with its successor
    MoveDown { file: PathBuf, index: usize },
    /// Sort events into time order
    Sort {
        file: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove repeated presses/releases per player
    Clean {
        file: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Drop every event at or after the given point
    Truncate {
        file: PathBuf,
        #[arg(long, default_value_t = NOT_APPLICABLE, allow_negative_numbers = true)]
        position: i32,
        #[arg(long, default_value_t = NOT_APPLICABLE, allow_negative_numbers = true)]
        timestamp: i32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Merge SOURCE into TARGET
    Merge {
        target: PathBuf,
        source: PathBuf,
        /// Relabel every merged event as player two
        #[arg(long)]
        player2: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOutcome {
    pub path: String,
    pub events: usize,
    pub bytes: usize,
    pub changed: usize,
}

pub fn edit_command<S: ByteStore>(
    config: &Config,
    store: &mut S,
    command: &EditCommand,
) -> ReplayResult<serde_json::Value> {
    let outcome = match command {
        EditCommand::New {
            file,
            sample_rate,
            mode,
        } => {
            let mut log = config.new_log();
            if let Some(rate) = sample_rate {
                log = EventLog::new(*rate, log.mode());
            }
            if let Some(mode) = mode {
                log = EventLog::new(log.sample_rate(), (*mode).into());
            }
            write_log(store, &log, file, 0)?
        }

        EditCommand::Insert {
            file,
            index,
            kind,
            position,
            timestamp,
        } => {
            let mut log = read_log(store, file)?;
            let event = event_for_mode(log.mode(), (*kind).into(), *position, *timestamp)?;
            log.insert_at(*index, event)?;
            write_log(store, &log, file, 1)?
        }

        EditCommand::Delete { file, index } => {
            let mut log = read_log(store, file)?;
            let changed = usize::from(log.delete_at(*index).is_some());
            write_log(store, &log, file, changed)?
        }

        EditCommand::MoveUp { file, index } => {
            let mut log = read_log(store, file)?;
            let changed = usize::from(log.move_up(*index));
            write_log(store, &log, file, changed)?
        }

        EditCommand::MoveDown { file, index } => {
            let mut log = read_log(store, file)?;
            let changed = usize::from(log.move_down(*index));
            write_log(store, &log, file, changed)?
        }

        EditCommand::Sort { file, out } => {
            let mut log = read_log(store, file)?;
            let before = log.events().to_vec();
            log.sort();
            let changed = before
                .iter()
                .zip(log.events())
                .filter(|(a, b)| a != b)
                .count();
            write_log(store, &log, out.as_deref().unwrap_or(file), changed)?
        }

        EditCommand::Clean { file, out } => {
            let mut log = read_log(store, file)?;
            let removed = log.dedupe();
            write_log(store, &log, out.as_deref().unwrap_or(file), removed)?
        }

        EditCommand::Truncate {
            file,
            position,
            timestamp,
            out,
        } => {
            let mut log = read_log(store, file)?;
            let removed = log.truncate_from(Progress::new(*position, *timestamp));
            write_log(store, &log, out.as_deref().unwrap_or(file), removed)?
        }

        EditCommand::Merge {
            target,
            source,
            player2,
            out,
        } => {
            let mut log = read_log(store, target)?;
            let mut other = read_log(store, source)?;
            if other.mode() != log.mode() {
                return Err(ReplayError::InvalidArgument(format!(
                    "cannot merge {:?} events into a {:?} replay",
                    other.mode(),
                    log.mode()
                )));
            }
            let incoming = other.persisted_len();
            log.merge(&mut other, *player2);
            let dest = out.clone().unwrap_or_else(|| tagged_path(target, "merged"));
            write_log(store, &log, &dest, incoming)?
        }
    };
    Ok(serde_json::to_value(outcome)?)
}

fn read_log<S: ByteStore>(store: &S, path: &Path) -> ReplayResult<EventLog> {
    EventLog::load(store, path).into_result()
}

fn write_log<S: ByteStore>(
    store: &mut S,
    log: &EventLog,
    path: &Path,
    changed: usize,
) -> ReplayResult<EditOutcome> {
    let bytes = log.encode()?;
    store.save(path, &bytes)?;
    Ok(EditOutcome {
        path: path.to_string_lossy().to_string(),
        events: log.persisted_len(),
        bytes: bytes.len(),
        changed,
    })
}

/// Builds an event carrying exactly the channels `mode` stores.
fn event_for_mode(
    mode: CoordinateMode,
    kind: InputKind,
    position: i32,
    timestamp: i32,
) -> ReplayResult<Event> {
    let position = if mode.carries_position() {
        position
    } else {
        NOT_APPLICABLE
    };
    let timestamp = if mode.carries_timestamp() {
        timestamp
    } else {
        NOT_APPLICABLE
    };
    if position == NOT_APPLICABLE && timestamp == NOT_APPLICABLE {
        return Err(ReplayError::InvalidArgument(format!(
            "a {mode:?} event needs --position and/or --timestamp"
        )));
    }
    Ok(Event::new(kind, position, timestamp))
}
