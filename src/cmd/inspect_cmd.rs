//! Read-only commands (`clickreplay inspect`, `clickreplay dump`).

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::{Config, CoordinateMode, Event, EventLog, FileStore, Player, ReplayResult, find_replay_files};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub path: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub bytes: u64,
    pub fingerprint: String,
    #[serde(rename = "sampleRate")]
    pub sample_rate: f32,
    pub mode: CoordinateMode,
    pub events: usize,
    #[serde(rename = "player1Events")]
    pub player1_events: usize,
    #[serde(rename = "player2Events")]
    pub player2_events: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectReport {
    pub files: Vec<FileSummary>,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDump {
    pub path: String,
    #[serde(rename = "sampleRate")]
    pub sample_rate: f32,
    pub mode: CoordinateMode,
    pub events: Vec<Event>,
}

pub fn inspect_files(config: &Config, patterns: &[String]) -> ReplayResult<InspectReport> {
    let files = find_replay_files(patterns, &config.extension)?;
    let mut summaries = Vec::with_capacity(files.len());
    for path in files {
        summaries.push(summarize_file(&path)?);
    }
    let failed = summaries.iter().filter(|s| !s.ok).count();
    Ok(InspectReport {
        files: summaries,
        failed,
    })
}

fn summarize_file(path: &Path) -> ReplayResult<FileSummary> {
    let bytes = std::fs::read(path)?;
    let decoded = EventLog::decode(&bytes);
    let log = &decoded.log;
    let count_for = |player| {
        log.events()
            .iter()
            .filter(|e| e.kind.player() == Some(player))
            .count()
    };
    Ok(FileSummary {
        path: path.to_string_lossy().to_string(),
        ok: decoded.is_complete(),
        error: decoded.error.as_ref().map(ToString::to_string),
        bytes: bytes.len() as u64,
        fingerprint: blake3::hash(&bytes).to_hex().to_string(),
        sample_rate: log.sample_rate(),
        mode: log.mode(),
        events: log.len(),
        player1_events: count_for(Player::One),
        player2_events: count_for(Player::Two),
    })
}

pub fn dump_file(path: &Path) -> ReplayResult<EventDump> {
    let log = EventLog::load(&FileStore::cwd(), path).into_result()?;
    Ok(EventDump {
        path: path.to_string_lossy().to_string(),
        sample_rate: log.sample_rate(),
        mode: log.mode(),
        events: log.events().to_vec(),
    })
}
