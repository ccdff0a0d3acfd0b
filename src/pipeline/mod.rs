pub mod calibrate;
pub mod extract;
pub mod fit;
pub mod peaks;
pub mod smooth;
pub mod stabilize;

use image::DynamicImage;

use crate::config::AnalyzerConfig;
use crate::data::elements::{LineMatch, ReferenceLineTable};
use crate::data::profile::{IntensityProfile, Peak};
use crate::error::{Result, SpectrumError};
use crate::log::session::SessionLog;

use calibrate::WavelengthCalibrator;
use stabilize::StreamStabilizer;

/// One fully processed profile: calibrated wavelength axis, smoothed
/// intensity, and the detected peak set. A fresh frame wholly replaces
/// the previous one.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    pub wavelengths: Vec<f64>,
    pub intensity: IntensityProfile,
    pub peaks: Vec<Peak>,
}

/// Element candidates proposed for one detected peak.
#[derive(Debug, Clone)]
pub struct PeakIdentification {
    pub peak: Peak,
    pub matches: Vec<LineMatch>,
}

impl SpectrumFrame {
    /// Match every detected peak against the reference line table.
    pub fn identify(&self, table: &ReferenceLineTable, tolerance: f64) -> Vec<PeakIdentification> {
        self.peaks
            .iter()
            .map(|&peak| PeakIdentification {
                peak,
                matches: table.matches_near(peak.wavelength, tolerance),
            })
            .collect()
    }
}

/// The processing session: configuration, the calibration model fitted
/// once at startup, and the live-mode stabilizer state. One instance per
/// analysis session, so independent sessions never interfere.
#[derive(Debug)]
pub struct Pipeline {
    config: AnalyzerConfig,
    calibrator: WavelengthCalibrator,
    stabilizer: StreamStabilizer,
}

impl Pipeline {
    /// Build the session. Calibration failures here are fatal
    /// misconfiguration, not transient conditions.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let calibrator = WavelengthCalibrator::fit(&config.calibration_points)?;
        let stabilizer = StreamStabilizer::new(config.stabilization_factor);
        Ok(Self { config, calibrator, stabilizer })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Offline path: extract → smooth → calibrate → detect.
    /// Every stage failure propagates; there is no next frame to fall
    /// back to.
    pub fn process_image(
        &self,
        image: &DynamicImage,
        log: &mut SessionLog,
    ) -> Result<SpectrumFrame> {
        let raw = extract::extract_profile(image, self.config.roi)?;
        log.add_entry(
            "Extract",
            &format!("{} columns from {:?}", raw.len(), self.config.roi),
        );
        self.finish(raw, Some(log))
    }

    /// Live path: extract → stabilize → smooth → calibrate → detect.
    ///
    /// A frame-size change resets the stabilizer and treats the frame as
    /// a first frame instead of failing the whole loop iteration.
    pub fn process_frame(&mut self, image: &DynamicImage) -> Result<SpectrumFrame> {
        let raw = extract::extract_profile(image, self.config.roi)?;
        let stabilized = match self.stabilizer.stabilize(&raw) {
            Ok(profile) => profile,
            Err(SpectrumError::ShapeMismatch { expected, actual }) => {
                log::warn!(
                    "frame size changed ({} -> {} columns), resetting stabilizer",
                    expected,
                    actual
                );
                self.stabilizer.reset();
                self.stabilizer.stabilize(&raw)?
            }
            Err(e) => return Err(e),
        };
        self.finish(stabilized, None)
    }

    fn finish(
        &self,
        profile: IntensityProfile,
        mut log: Option<&mut SessionLog>,
    ) -> Result<SpectrumFrame> {
        let smoothed = smooth::savgol_smooth(
            &profile,
            self.config.smoothing_window,
            self.config.smoothing_order,
        )?;
        if let Some(log) = log.as_deref_mut() {
            log.add_entry(
                "Smooth",
                &format!(
                    "Savitzky-Golay, window={}, order={}",
                    self.config.smoothing_window, self.config.smoothing_order
                ),
            );
        }

        let wavelengths = self.calibrator.wavelengths(smoothed.len());
        if let Some(log) = log.as_deref_mut() {
            log.add_entry(
                "Calibrate",
                &format!(
                    "degree-2 fit over {} control points, span {:.1}-{:.1} nm",
                    self.config.calibration_points.len(),
                    wavelengths.first().copied().unwrap_or(0.0),
                    wavelengths.last().copied().unwrap_or(0.0),
                ),
            );
        }

        let peaks = peaks::detect_peaks(&smoothed, &wavelengths, self.config.threshold_multiplier);
        if let Some(log) = log.as_deref_mut() {
            log.add_entry(
                "Detect Peaks",
                &format!(
                    "threshold multiplier {}, {} peaks",
                    self.config.threshold_multiplier,
                    peaks.len()
                ),
            );
        }

        Ok(SpectrumFrame { wavelengths, intensity: smoothed, peaks })
    }
}
