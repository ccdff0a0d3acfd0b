//! Analyzer configuration.
//!
//! All tunables of the pipeline live here with defaults matching the
//! reference spectrometer setup: a JSON config file can override any
//! subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectrumError};

/// Peak threshold is mean + multiplier * stddev of the smoothed profile.
pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 0.5;
/// Single-shot images are sharp enough for a tight match window.
pub const DEFAULT_OFFLINE_TOLERANCE_NM: f64 = 2.0;
/// Streamed frames wobble more, so the live match window is wider.
pub const DEFAULT_LIVE_TOLERANCE_NM: f64 = 10.0;
/// Weight of history when blending successive live frames.
pub const DEFAULT_STABILIZATION_FACTOR: f64 = 0.9;

/// A known (pixel, wavelength) pair used for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub pixel: f64,
    pub wavelength: f64,
}

/// Which part of the image holds the spectrum band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSelection {
    /// A single pixel row.
    Row(u32),
    /// A horizontal band of rows, averaged column-wise. `bottom` is exclusive.
    Band { top: u32, bottom: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_calibration_points")]
    pub calibration_points: Vec<CalibrationPoint>,
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    #[serde(default = "default_smoothing_order")]
    pub smoothing_order: usize,
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f64,
    /// Match tolerance in nm. When absent, the mode default applies
    /// (2.0 nm offline, 10.0 nm live).
    #[serde(default)]
    pub match_tolerance: Option<f64>,
    #[serde(default = "default_stabilization_factor")]
    pub stabilization_factor: f64,
    #[serde(default = "default_roi")]
    pub roi: RegionSelection,
    /// Display pacing between live frames, in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

fn default_calibration_points() -> Vec<CalibrationPoint> {
    [(100.0, 400.0), (500.0, 500.0), (800.0, 600.0), (1200.0, 700.0)]
        .iter()
        .map(|&(pixel, wavelength)| CalibrationPoint { pixel, wavelength })
        .collect()
}

fn default_smoothing_window() -> usize {
    11
}

fn default_smoothing_order() -> usize {
    2
}

fn default_threshold_multiplier() -> f64 {
    DEFAULT_THRESHOLD_MULTIPLIER
}

fn default_stabilization_factor() -> f64 {
    DEFAULT_STABILIZATION_FACTOR
}

fn default_roi() -> RegionSelection {
    RegionSelection::Band { top: 100, bottom: 200 }
}

fn default_frame_interval_ms() -> u64 {
    200
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            calibration_points: default_calibration_points(),
            smoothing_window: default_smoothing_window(),
            smoothing_order: default_smoothing_order(),
            threshold_multiplier: default_threshold_multiplier(),
            match_tolerance: None,
            stabilization_factor: default_stabilization_factor(),
            roi: default_roi(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl AnalyzerConfig {
    /// Load config from a JSON file; missing fields fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| SpectrumError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Effective match tolerance for offline (single-shot) analysis.
    pub fn offline_tolerance(&self) -> f64 {
        self.match_tolerance.unwrap_or(DEFAULT_OFFLINE_TOLERANCE_NM)
    }

    /// Effective match tolerance for live streaming analysis.
    pub fn live_tolerance(&self) -> f64 {
        self.match_tolerance.unwrap_or(DEFAULT_LIVE_TOLERANCE_NM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_setup() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.smoothing_window, 11);
        assert_eq!(cfg.smoothing_order, 2);
        assert_eq!(cfg.threshold_multiplier, 0.5);
        assert_eq!(cfg.stabilization_factor, 0.9);
        assert_eq!(cfg.calibration_points.len(), 4);
        assert_eq!(cfg.calibration_points[0].pixel, 100.0);
        assert_eq!(cfg.calibration_points[0].wavelength, 400.0);
        assert_eq!(cfg.offline_tolerance(), 2.0);
        assert_eq!(cfg.live_tolerance(), 10.0);
    }

    #[test]
    fn test_partial_json_overrides() {
        let cfg: AnalyzerConfig =
            serde_json::from_str(r#"{"smoothing_window": 15, "match_tolerance": 5.0}"#).unwrap();
        assert_eq!(cfg.smoothing_window, 15);
        assert_eq!(cfg.offline_tolerance(), 5.0);
        assert_eq!(cfg.live_tolerance(), 5.0);
        assert_eq!(cfg.smoothing_order, 2);
    }

    #[test]
    fn test_roi_json_forms() {
        let row: RegionSelection = serde_json::from_str(r#"{"row": 100}"#).unwrap();
        assert_eq!(row, RegionSelection::Row(100));
        let band: RegionSelection =
            serde_json::from_str(r#"{"band": {"top": 100, "bottom": 200}}"#).unwrap();
        assert_eq!(band, RegionSelection::Band { top: 100, bottom: 200 });
    }
}
