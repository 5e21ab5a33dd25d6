//! Error types for each layer of the visualizer.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or unreadable static configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Audio capture and replay failures
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio input device found")]
    NoDevice,

    #[error("no input device matching '{0}'")]
    DeviceNotFound(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio device error: {0}")]
    Device(String),

    #[error("failed to read WAV input: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio input exhausted")]
    EndOfStream,
}

/// Display output failures
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write frame image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Anything that can stop the frame loop early
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}
