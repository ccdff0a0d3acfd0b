//! Pixel → wavelength calibration.
//!
//! A degree-2 polynomial is fit once at startup from known
//! (pixel, wavelength) control points and shared read-only by every
//! profile conversion afterwards.

use crate::config::CalibrationPoint;
use crate::error::{Result, SpectrumError, MIN_CONTROL_POINTS};
use super::fit::{polyfit, polyval};

/// Fixed fit degree: a quadratic absorbs the mild nonlinearity of a
/// diffraction-grating setup without overfitting a handful of points.
const FIT_DEGREE: usize = 2;

#[derive(Debug, Clone)]
pub struct WavelengthCalibrator {
    /// Ascending-power polynomial coefficients.
    coeffs: Vec<f64>,
}

impl WavelengthCalibrator {
    /// Least-squares fit over the control points.
    ///
    /// Fails with `InsufficientControlPoints` below 3 points and
    /// `DegenerateFit` when pixel positions repeat (singular system).
    /// Non-monotonic points still fit but are physically suspect, so
    /// they are reported on the log.
    pub fn fit(points: &[CalibrationPoint]) -> Result<Self> {
        if points.len() < MIN_CONTROL_POINTS {
            return Err(SpectrumError::InsufficientControlPoints(points.len()));
        }

        for (i, a) in points.iter().enumerate() {
            if points[i + 1..].iter().any(|b| b.pixel == a.pixel) {
                return Err(SpectrumError::DegenerateFit(format!(
                    "duplicate pixel position {}",
                    a.pixel
                )));
            }
        }

        let monotonic = points.windows(2).all(|w| {
            w[1].pixel > w[0].pixel && w[1].wavelength > w[0].wavelength
        });
        if !monotonic {
            log::warn!(
                "calibration control points are not strictly increasing in pixel and wavelength; \
                 the fit will run but is physically suspect"
            );
        }

        let xs: Vec<f64> = points.iter().map(|p| p.pixel).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.wavelength).collect();
        let coeffs = polyfit(&xs, &ys, FIT_DEGREE)
            .ok_or_else(|| SpectrumError::DegenerateFit("singular normal equations".into()))?;

        Ok(Self { coeffs })
    }

    /// Evaluate the calibration polynomial at one pixel position.
    ///
    /// Total function: indices outside the calibrated span extrapolate,
    /// with physical validity degrading far outside it.
    pub fn wavelength_at(&self, pixel: f64) -> f64 {
        polyval(&self.coeffs, pixel)
    }

    /// Wavelengths for pixel indices `0..len`.
    pub fn wavelengths(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.wavelength_at(i as f64)).collect()
    }
}
