//! Whole-file decoding into in-memory sample buffers.
//!
//! Two paths: the native one hands the bytes to rodio's own container
//! probe (covers WAV and whatever else the output library understands),
//! the software one runs an explicit symphonia FLAC decode loop. Dispatch
//! is by file-extension hint only — no content sniffing. That mirrors the
//! scanner's extension filter and is a known limitation for mislabeled
//! files.

use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, Source};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::error::DecodeError;

/// Planar decoded audio. Every channel holds the same number of frames;
/// the duration is always derived from the frame count and sample rate so
/// the two can never drift apart.
#[derive(Clone, Debug)]
pub struct DecodedBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedBuffer {
    pub fn new(sample_rate: u32, mut channels: Vec<Vec<f32>>) -> Result<Self, DecodeError> {
        if sample_rate == 0 || channels.is_empty() {
            return Err(DecodeError::EmptyOutput);
        }
        // Channels must stay frame-aligned; trim to the shortest.
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        if frames == 0 {
            return Err(DecodeError::EmptyOutput);
        }
        for c in &mut channels {
            c.truncate(frames);
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    fn frame_at(&self, offset: Duration) -> usize {
        let f = (offset.as_secs_f64() * f64::from(self.sample_rate)).round() as usize;
        f.min(self.frames())
    }

    /// Interleave the tail of the buffer starting at `offset`, for feeding
    /// a freshly created source.
    pub fn interleaved_from(&self, offset: Duration) -> Vec<f32> {
        let start = self.frame_at(offset);
        let frames = self.frames();
        let mut out = Vec::with_capacity((frames - start) * self.channels.len());
        for i in start..frames {
            for c in &self.channels {
                out.push(c[i]);
            }
        }
        out
    }
}

/// Closed set of container routes. New formats get a new variant here, not
/// a string check somewhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Handled by the output library's own probe.
    NativeContainer,
    /// FLAC, decoded by the explicit software decoder.
    SoftwareDecodedContainer,
    /// Unrecognized extension: tried on the native path anyway.
    FallbackNative,
}

pub fn classify(extension: Option<&str>) -> ContainerFormat {
    match extension.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("wav") => ContainerFormat::NativeContainer,
        Some("flac") => ContainerFormat::SoftwareDecodedContainer,
        _ => ContainerFormat::FallbackNative,
    }
}

/// Decode a whole file held in memory into a [`DecodedBuffer`].
pub fn decode(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedBuffer, DecodeError> {
    match classify(extension) {
        ContainerFormat::SoftwareDecodedContainer => decode_flac(bytes),
        ContainerFormat::NativeContainer | ContainerFormat::FallbackNative => decode_native(bytes),
    }
}

fn decode_native(bytes: Vec<u8>) -> Result<DecodedBuffer, DecodeError> {
    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| DecodeError::NativeDecodeFailed(e.to_string()))?;
    let channel_count = usize::from(source.channels());
    let sample_rate = source.sample_rate();
    let samples: Vec<f32> = source.collect();
    if channel_count == 0 || samples.len() < channel_count {
        return Err(DecodeError::EmptyOutput);
    }

    let frames = samples.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in samples.chunks_exact(channel_count) {
        for (ch, s) in frame.iter().enumerate() {
            channels[ch].push(*s);
        }
    }
    DecodedBuffer::new(sample_rate, channels)
}

fn decode_flac(bytes: Vec<u8>) -> Result<DecodedBuffer, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let mut hint = Hint::new();
    hint.with_extension("flac");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::SoftwareDecodeFailed(format!("probe failed: {e}")))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| DecodeError::SoftwareDecodeFailed("no audio track".to_string()))?;
    let track_id = track.id;

    // Building the decoder is the readiness step; a failure here means the
    // stream cannot be decoded at all.
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::SoftwareDecodeFailed(format!("decoder init failed: {e}")))?;

    let mut sample_rate = 0u32;
    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::SoftwareDecodeFailed(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Recoverable per-packet corruption: drop the packet, keep going.
            Err(SymphoniaError::DecodeError(e)) => {
                log::debug!("skipping corrupt flac packet: {e}");
                continue;
            }
            Err(e) => return Err(DecodeError::SoftwareDecodeFailed(e.to_string())),
        };

        let spec = *decoded.spec();
        if channels.is_empty() {
            sample_rate = spec.rate;
            channels = vec![Vec::new(); spec.channels.count()];
        }
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_planar_ref(decoded);
        for (ch, chunk) in buf.samples().chunks_exact(frames).enumerate() {
            if let Some(target) = channels.get_mut(ch) {
                target.extend_from_slice(chunk);
            }
        }
    }
    // Decoder and format reader are released here on every path.

    if channels.is_empty() {
        return Err(DecodeError::EmptyOutput);
    }
    DecodedBuffer::new(sample_rate, channels)
}
