use std::io;

use thiserror::Error;

/// Minimum number of calibration control points for a degree-2 fit.
pub const MIN_CONTROL_POINTS: usize = 3;

#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("selected region outside image bounds: {0}")]
    InvalidRegion(String),

    #[error("invalid smoothing window: {0}")]
    InvalidWindow(String),

    #[error("calibration needs at least {MIN_CONTROL_POINTS} control points, got {0}")]
    InsufficientControlPoints(usize),

    #[error("degenerate calibration fit: {0}")]
    DegenerateFit(String),

    #[error("profile length changed between frames: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("frame processing failed: {0}")]
    FrameProcessing(String),

    #[error("frame fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SpectrumError>;
