use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used across the render pipeline.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },
    #[error("viewport must have positive, finite extent")]
    InvalidViewport,
    #[error("iteration_max must be in 1..={max}, got {got}")]
    IterationMax { got: u32, max: u32 },
    #[error("escape radius must be positive and finite")]
    EscapeRadius,
    #[error("at least one worker is required")]
    NoWorkers,
    #[error("palette epsilon and rotation must be finite")]
    Palette,
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("frame range {min}..={max} is reversed")]
    InvalidRange { min: u32, max: u32 },
    #[error("iteration count {count} outside frame range {min}..={max}")]
    OutOfRange { count: u32, min: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to allocate {bytes} byte pixel buffer")]
    Allocation {
        bytes: usize,
        #[source]
        source: Option<TryReserveError>,
    },
    #[error("pixel buffer of {needed} bytes exceeds memory budget of {budget} bytes")]
    OverBudget { needed: usize, budget: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("buffer holds {got} bytes, expected {expected} for {width}x{height}x{channels}")]
    Dimensions {
        got: usize,
        expected: usize,
        width: u32,
        height: u32,
        channels: u8,
    },
    #[error("unsupported channel count {0}")]
    Channels(u8),
    #[error("png encoding failed")]
    Png(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to mount storage at {path}")]
    Mount {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open {path} for writing")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("render worker stopped before replying")]
    WorkerGone,
    #[error("failed to spawn render worker")]
    Spawn(#[source] io::Error),
}
