/// Savitzky–Golay noise smoothing.
///
/// Each sample is replaced by a local polynomial least-squares fit
/// evaluated at its own position. Near the edges the window slides
/// inward so boundary samples are fitted from the first/last full
/// window (scipy `savgol_filter` interp-style edges).
use crate::data::profile::IntensityProfile;
use crate::error::{Result, SpectrumError};
use super::fit::{polyfit, polyval};

pub fn savgol_smooth(
    profile: &IntensityProfile,
    window: usize,
    order: usize,
) -> Result<IntensityProfile> {
    let n = profile.len();

    if window < 5 || window % 2 == 0 {
        return Err(SpectrumError::InvalidWindow(format!(
            "window length must be an odd integer >= 5, got {}",
            window
        )));
    }
    if window > n {
        return Err(SpectrumError::InvalidWindow(format!(
            "window length {} exceeds profile length {}",
            window, n
        )));
    }
    if order >= window {
        return Err(SpectrumError::InvalidWindow(format!(
            "polynomial order {} must be below window length {}",
            order, window
        )));
    }

    let half = window / 2;
    let samples = profile.samples();
    let mut smoothed = Vec::with_capacity(n);

    for i in 0..n {
        // Slide the window inward at the edges; interior windows center on i.
        let start = i.saturating_sub(half).min(n - window);
        let ys = &samples[start..start + window];
        // Window positions relative to i keep the fit well conditioned
        // and make polyval(coeffs, 0) the value at i.
        let xs: Vec<f64> = (start..start + window)
            .map(|j| j as f64 - i as f64)
            .collect();
        let coeffs = polyfit(&xs, ys, order).ok_or_else(|| {
            SpectrumError::InvalidWindow(format!(
                "singular local fit (window {}, order {})",
                window, order
            ))
        })?;
        smoothed.push(polyval(&coeffs, 0.0));
    }

    Ok(IntensityProfile::new(smoothed))
}
