//! Progress reporting for batch runs.

use crate::{
    batch::{BatchStats, RunReport},
    error::FailureCause,
};

/// What happened to one photo during a run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Already framed by an earlier run; left untouched but still counted
    /// towards `percent`.
    Skipped,
    Completed { width: u32, height: u32 },
    Failed { cause: FailureCause },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    RunStarted {
        total: usize,
    },
    ItemStarted {
        index: usize,
        id: String,
        name: String,
    },
    /// Published after every visited photo. Photos completed by an earlier
    /// run are reported too, with [`ItemOutcome::Skipped`] and no preceding
    /// `ItemStarted`, so `percent` reaches 100 on every run. The browser tool
    /// this replaces published nothing for such photos.
    ItemFinished {
        index: usize,
        id: String,
        outcome: ItemOutcome,
        /// `round(visited / total * 100)`.
        percent: u8,
        stats: BatchStats,
    },
    RunFinished {
        report: RunReport,
        stats: BatchStats,
    },
}

pub trait ProgressSink {
    fn on_event(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_event(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&mut self, _event: &ProgressEvent) {}
}

pub fn progress_percent(visited: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((visited as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}
