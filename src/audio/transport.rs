//! The transport state machine: owns the current buffer and the single
//! active source.
//!
//! Three states: idle (nothing loaded), loaded-paused, loaded-playing.
//! Every operation that touches the active source retires the previous
//! handle before creating a new one, so at no point are two sources
//! connected to the output. All calls run on the audio thread, serialized
//! by its command channel — that channel is the in-flight-operation guard
//! that keeps a slow decode from interleaving with other transport calls.

use std::path::Path;
use std::time::Duration;

use super::clock::{PipelineClock, PlaybackClock};
use super::decoder::{self, DecodedBuffer};
use super::error::PlaybackError;
use super::output::{AudioOutput, SourceHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    LoadedPaused,
    LoadedPlaying,
}

pub struct Transport<O: AudioOutput, C: PipelineClock> {
    output: O,
    pipeline_clock: C,
    buffer: Option<DecodedBuffer>,
    clock: PlaybackClock,
    source: Option<O::Source>,
    playing: bool,
}

impl<O: AudioOutput, C: PipelineClock> Transport<O, C> {
    pub fn new(output: O, pipeline_clock: C) -> Self {
        Self {
            output,
            pipeline_clock,
            buffer: None,
            clock: PlaybackClock::default(),
            source: None,
            playing: false,
        }
    }

    pub fn state(&self) -> TransportState {
        match (&self.buffer, self.playing) {
            (None, _) => TransportState::Idle,
            (Some(_), false) => TransportState::LoadedPaused,
            (Some(_), true) => TransportState::LoadedPlaying,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.buffer.as_ref().map(DecodedBuffer::duration)
    }

    pub fn position(&self) -> Duration {
        match &self.buffer {
            Some(b) => self.clock.position(self.pipeline_clock.now(), b.duration()),
            None => Duration::ZERO,
        }
    }

    /// Read and decode `path`, then land in loaded-paused at offset zero.
    ///
    /// Nothing is replaced until the decode succeeds: on failure the
    /// previous buffer, position, play state and active source stay
    /// exactly as they were.
    pub fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        let bytes = std::fs::read(path).map_err(|e| PlaybackError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let ext = path.extension().and_then(|s| s.to_str());
        let buffer = decoder::decode(bytes, ext)?;
        log::debug!(
            "decoded {}: {:.3}s, {} ch at {} Hz",
            path.display(),
            buffer.duration().as_secs_f64(),
            buffer.channel_count(),
            buffer.sample_rate()
        );
        self.install(buffer);
        Ok(())
    }

    /// Install an already decoded buffer (loaded-paused at offset zero).
    pub fn load_buffer(&mut self, buffer: DecodedBuffer) {
        self.install(buffer);
    }

    fn install(&mut self, buffer: DecodedBuffer) {
        self.retire_source();
        self.playing = false;
        self.clock.reset();
        self.buffer = Some(buffer);
    }

    fn retire_source(&mut self) {
        if let Some(mut s) = self.source.take() {
            s.stop();
        }
    }

    /// Start or resume playback from the current offset.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let Some(buffer) = self.buffer.as_ref() else {
            return Err(PlaybackError::NothingLoaded);
        };
        if self.playing {
            return Ok(());
        }

        self.output.resume()?;
        let offset = self.clock.offset().min(buffer.duration());
        // Retire before starting so an output failure leaves zero sources,
        // never two.
        if let Some(mut s) = self.source.take() {
            s.stop();
        }
        let source = self.output.start(buffer, offset)?;
        self.source = Some(source);
        self.clock.start(self.pipeline_clock.now(), offset);
        self.playing = true;
        Ok(())
    }

    /// Freeze playback, folding the elapsed span into the stored offset.
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.clock.pause(self.pipeline_clock.now());
        if let Some(b) = &self.buffer {
            let clamped = self.clock.offset().min(b.duration());
            self.clock.set_offset(clamped);
        }
        self.retire_source();
        self.playing = false;
    }

    /// Jump to `target`, clamped into the buffer. While playing this swaps
    /// the active source; while paused it only moves the stored offset.
    pub fn seek_to(&mut self, target: Duration) -> Result<(), PlaybackError> {
        let Some(buffer) = self.buffer.as_ref() else {
            return Err(PlaybackError::NothingLoaded);
        };
        let target = target.min(buffer.duration());
        if self.playing {
            if let Some(mut s) = self.source.take() {
                s.stop();
            }
            let source = self.output.start(buffer, target)?;
            self.source = Some(source);
            self.clock.start(self.pipeline_clock.now(), target);
        } else {
            self.clock.set_offset(target);
        }
        Ok(())
    }

    /// Seek to a fraction of the track; out-of-range ratios clamp to the
    /// track boundaries.
    pub fn seek_ratio(&mut self, ratio: f64) -> Result<(), PlaybackError> {
        let Some(buffer) = &self.buffer else {
            return Err(PlaybackError::NothingLoaded);
        };
        let target = buffer.duration().mul_f64(ratio.clamp(0.0, 1.0));
        self.seek_to(target)
    }

    /// True when the pipeline reports that the active source ran dry.
    pub fn source_finished(&self) -> bool {
        self.playing && self.source.as_ref().map(SourceHandle::finished).unwrap_or(false)
    }

    /// Settle a natural end of track: paused, parked at the full duration.
    pub fn finish(&mut self) {
        if !self.playing {
            return;
        }
        let duration = self.buffer.as_ref().map(DecodedBuffer::duration).unwrap_or_default();
        self.retire_source();
        self.playing = false;
        self.clock.pause(self.pipeline_clock.now());
        self.clock.set_offset(duration);
    }

    /// Stop and rewind to the start, keeping the loaded buffer.
    pub fn stop(&mut self) {
        if self.buffer.is_none() {
            return;
        }
        self.retire_source();
        self.playing = false;
        self.clock.reset();
    }
}
