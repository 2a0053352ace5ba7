//! The engine couples the transport with the queue: it resolves queue
//! operations into transport calls and fires auto-advance when the
//! pipeline signals a natural end of track.

use std::time::Duration;

use crate::library::Track;

use super::clock::PipelineClock;
use super::output::AudioOutput;
use super::queue::TrackQueue;
use super::transport::Transport;

pub struct Engine<O: AudioOutput, C: PipelineClock> {
    transport: Transport<O, C>,
    queue: TrackQueue,
    current: Option<Track>,
    last_error: Option<String>,
    queue_revision: u64,
}

impl<O: AudioOutput, C: PipelineClock> Engine<O, C> {
    pub fn new(output: O, pipeline_clock: C) -> Self {
        Self {
            transport: Transport::new(output, pipeline_clock),
            queue: TrackQueue::default(),
            current: None,
            last_error: None,
            queue_revision: 0,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn position(&self) -> Duration {
        self.transport.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.transport.duration()
    }

    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    /// Bumped whenever queue contents or cursor change; lets the audio
    /// thread publish queue snapshots only when needed.
    pub fn queue_revision(&self) -> u64 {
        self.queue_revision
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn start_playback(&mut self, track: Track) {
        log::debug!("starting playback of {}", track.id);
        if let Err(e) = self.transport.load(&track.path) {
            // The failed load left prior playback untouched; just surface it.
            log::warn!("load failed for {}: {e}", track.id);
            self.last_error = Some(e.to_string());
            return;
        }
        self.current = Some(track);
        self.last_error = None;
        if let Err(e) = self.transport.play() {
            log::warn!("play failed: {e}");
            self.last_error = Some(e.to_string());
        }
    }

    /// Replace the queue with the playable subset of `list` and start its
    /// first entry. A list with nothing playable is a no-op.
    pub fn set_queue_and_play(&mut self, list: Vec<Option<Track>>) {
        if !self.queue.replace(list) {
            return;
        }
        self.queue_revision += 1;
        if let Some(track) = self.queue.current().cloned() {
            self.start_playback(track);
        }
    }

    /// Append the playable subset of `list`; cursor and playback untouched.
    pub fn add_to_queue(&mut self, list: Vec<Option<Track>>) {
        if self.queue.append(list) > 0 {
            self.queue_revision += 1;
        }
    }

    /// Play `track`, reusing its queue position when it is already queued,
    /// otherwise replacing the queue with just this track.
    pub fn play_track(&mut self, track: Track) {
        match self.queue.position_of(&track) {
            Some(i) => {
                self.queue.select(i);
            }
            None => {
                self.queue.replace(vec![Some(track.clone())]);
            }
        }
        self.queue_revision += 1;
        self.start_playback(track);
    }

    /// Advance to the next queued track; no-op at the end of the queue.
    pub fn next(&mut self) {
        if let Some(track) = self.queue.advance().cloned() {
            self.queue_revision += 1;
            self.start_playback(track);
        }
    }

    /// Step back one queue entry, or — at the head of the queue — restart
    /// the current track from the beginning instead of wrapping.
    pub fn previous(&mut self) {
        if let Some(track) = self.queue.retreat().cloned() {
            self.queue_revision += 1;
            self.start_playback(track);
        } else if self.transport.has_buffer() {
            if let Err(e) = self.transport.seek_to(Duration::ZERO) {
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.transport.is_playing() {
            self.transport.pause();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        if !self.transport.has_buffer() {
            return;
        }
        if let Err(e) = self.transport.play() {
            self.last_error = Some(e.to_string());
        }
    }

    pub fn pause(&mut self) {
        self.transport.pause();
    }

    pub fn stop(&mut self) {
        self.transport.stop();
    }

    /// Scrub by a signed number of seconds from the current position.
    pub fn seek_by(&mut self, secs: i64) {
        if !self.transport.has_buffer() {
            return;
        }
        let pos = self.transport.position();
        let target = if secs >= 0 {
            pos + Duration::from_secs(secs as u64)
        } else {
            pos.saturating_sub(Duration::from_secs(secs.unsigned_abs()))
        };
        if let Err(e) = self.transport.seek_to(target) {
            self.last_error = Some(e.to_string());
        }
    }

    /// Seek to a fraction of the current track (progress-bar style).
    pub fn seek_ratio(&mut self, ratio: f64) {
        if !self.transport.has_buffer() {
            return;
        }
        if let Err(e) = self.transport.seek_ratio(ratio) {
            self.last_error = Some(e.to_string());
        }
    }

    /// Periodic poll. The pipeline's finished signal is authoritative for
    /// end of track; when it fires the transport parks at the full
    /// duration and the queue auto-advances if a successor exists.
    pub fn tick(&mut self) {
        if self.transport.source_finished() {
            self.transport.finish();
            if self.queue.has_next() {
                log::debug!("auto-advance");
                self.next();
            }
            // No successor: stay paused at the end of the buffer.
        }
    }
}
