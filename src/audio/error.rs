use std::path::PathBuf;

use thiserror::Error;

/// A byte buffer could not be turned into playable samples.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The native container path rejected the data (corrupt header,
    /// unsupported subtype).
    #[error("native decode failed: {0}")]
    NativeDecodeFailed(String),
    /// The FLAC software decoder failed outright.
    #[error("flac decode failed: {0}")]
    SoftwareDecodeFailed(String),
    /// A decoder ran but produced no usable channel data.
    #[error("decoder produced no audio data")]
    EmptyOutput,
}

/// Failure of a transport operation. All of these are recovered locally:
/// the operation reports the error and prior playback state is untouched.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The output device could not be opened. Playback is disabled but the
    /// rest of the application keeps working.
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),
    #[error("no track loaded")]
    NothingLoaded,
}
