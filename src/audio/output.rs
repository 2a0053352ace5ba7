//! The audio pipeline seam: a trait for the process-wide output plus the
//! rodio implementation.
//!
//! The output stream is opened lazily on the first playback request (some
//! hosts only hand out a device once the user actually asked for sound)
//! and is never torn down for the lifetime of the process. The transport
//! gets the pipeline injected instead of reaching for a global, which is
//! what makes it testable with a fake.

use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::decoder::DecodedBuffer;
use super::error::PlaybackError;

/// One started source. One-shot: once stopped or exhausted it is never
/// reused; a new handle is created for every (re)start.
pub trait SourceHandle {
    /// Stop producing audio. Stopping a source that already finished
    /// naturally is a no-op, not an error.
    fn stop(&mut self);
    /// Authoritative "ran out of samples" signal from the pipeline.
    fn finished(&self) -> bool;
}

/// The injected audio pipeline: owns the output device and creates source
/// handles bound to decoded buffers.
pub trait AudioOutput {
    type Source: SourceHandle;

    /// Bring the pipeline up if it is not running yet.
    fn resume(&mut self) -> Result<(), PlaybackError>;

    /// Create and start a source playing `buffer` from `offset`.
    fn start(
        &mut self,
        buffer: &DecodedBuffer,
        offset: Duration,
    ) -> Result<Self::Source, PlaybackError>;
}

/// Real pipeline on top of rodio's default output stream.
pub struct RodioOutput {
    stream: Option<OutputStream>,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn ensure_stream(&mut self) -> Result<&OutputStream, PlaybackError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
            // rodio logs to stderr when OutputStream is dropped. That's useful in
            // debugging, but noisy for a TUI app.
            stream.log_on_drop(false);
            log::debug!("opened default output stream");
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| PlaybackError::OutputUnavailable("output stream missing".to_string()))
    }
}

impl Default for RodioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for RodioOutput {
    type Source = RodioSource;

    fn resume(&mut self) -> Result<(), PlaybackError> {
        self.ensure_stream().map(|_| ())
    }

    fn start(
        &mut self,
        buffer: &DecodedBuffer,
        offset: Duration,
    ) -> Result<RodioSource, PlaybackError> {
        let channels = buffer.channel_count() as u16;
        let sample_rate = buffer.sample_rate();
        let samples = buffer.interleaved_from(offset);

        let stream = self.ensure_stream()?;
        let sink = Sink::connect_new(stream.mixer());
        sink.append(SamplesBuffer::new(channels, sample_rate, samples));
        sink.play();
        Ok(RodioSource { sink })
    }
}

pub struct RodioSource {
    sink: Sink,
}

impl SourceHandle for RodioSource {
    fn stop(&mut self) {
        self.sink.stop();
    }

    fn finished(&self) -> bool {
        self.sink.empty()
    }
}
