//! Shared types between the audio thread and the UI side: the command
//! enum and the observable playback/queue snapshots.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::Track;

#[derive(Debug)]
pub enum PlayerCmd {
    /// Replace the queue with the playable subset of the list and start
    /// its first entry.
    SetQueueAndPlay(Vec<Option<Track>>),
    /// Append to the queue without touching current playback.
    AddToQueue(Vec<Option<Track>>),
    /// Play one track, reusing its queue position when already queued.
    PlayTrack(Track),
    /// Resume (no-op while already playing or with nothing loaded).
    Play,
    /// Pause (no-op while paused).
    Pause,
    TogglePause,
    /// Stop and rewind to the start of the loaded track.
    Stop,
    Next,
    Prev,
    /// Scrub by a signed number of seconds.
    SeekBy(i64),
    /// Jump to a fraction of the current track; clamped into [0, 1].
    SeekRatio(f64),
    /// Shut the audio thread down.
    Quit,
}

/// Runtime playback information shared with the UI.
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    /// Currently loaded track, if any.
    pub track: Option<Track>,
    /// Whether playback is currently active.
    pub playing: bool,
    /// Playback position, monotonic within a play run.
    pub position: Duration,
    /// Duration of the loaded buffer.
    pub duration: Option<Duration>,
    /// Last load/playback failure, for the status line.
    pub error: Option<String>,
}

/// Queue contents and cursor as last published by the audio thread.
#[derive(Clone, Debug, Default)]
pub struct QueueSnapshot {
    pub tracks: Vec<Track>,
    pub cursor: Option<usize>,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
pub type QueueHandle = Arc<Mutex<QueueSnapshot>>;
