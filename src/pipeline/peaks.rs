/// Threshold peak detection on a smoothed profile.
use crate::data::profile::{IntensityProfile, Peak};

/// Find local maxima whose value exceeds
/// `mean(profile) + multiplier * stddev(profile)`.
///
/// A sample qualifies when strictly greater than both neighbors; a
/// plateau of equal samples reports at most one peak, at its first
/// index. Boundary samples are never reported. Peaks come back ordered
/// by pixel index.
pub fn detect_peaks(
    profile: &IntensityProfile,
    wavelengths: &[f64],
    threshold_multiplier: f64,
) -> Vec<Peak> {
    let samples = profile.samples();
    let n = samples.len();
    if n < 3 {
        return Vec::new();
    }

    let threshold = profile.mean() + threshold_multiplier * profile.stddev();

    let mut peaks = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        let v = samples[i];
        if v > threshold && v > samples[i - 1] {
            // Walk to the end of a flat run; it counts as one candidate.
            let mut j = i;
            while j + 1 < n && samples[j + 1] == v {
                j += 1;
            }
            if j + 1 < n && samples[j + 1] < v {
                peaks.push(Peak {
                    index: i,
                    wavelength: wavelengths.get(i).copied().unwrap_or(i as f64),
                    intensity: v,
                });
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(values: &[f64]) -> Vec<Peak> {
        let profile = IntensityProfile::new(values.to_vec());
        let wavelengths: Vec<f64> = (0..values.len()).map(|i| 400.0 + i as f64).collect();
        detect_peaks(&profile, &wavelengths, 0.5)
    }

    #[test]
    fn test_single_peak() {
        let peaks = detect(&[0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0]);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 3);
        assert_eq!(peaks[0].wavelength, 403.0);
        assert_eq!(peaks[0].intensity, 10.0);
    }

    #[test]
    fn test_boundaries_never_reported() {
        // Monotonic ramps put the extreme values at the ends.
        let rising: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(detect(&rising).is_empty());
        let falling: Vec<f64> = (0..20).rev().map(|i| i as f64).collect();
        assert!(detect(&falling).is_empty());
    }

    #[test]
    fn test_sub_threshold_maxima_ignored() {
        // The bump at index 5 is a local max but sits below
        // mean + 0.5*std; only the tall peak qualifies.
        let peaks = detect(&[0.0, 0.0, 100.0, 0.0, 1.0, 2.0, 1.0, 0.0, 0.0]);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 2);
    }

    #[test]
    fn test_plateau_reports_first_index_once() {
        let peaks = detect(&[0.0, 0.0, 9.0, 9.0, 9.0, 0.0, 0.0]);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 2);
    }

    #[test]
    fn test_plateau_running_into_boundary_not_reported() {
        let peaks = detect(&[0.0, 0.0, 9.0, 9.0, 9.0]);
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_peaks_ordered_by_index() {
        let peaks = detect(&[0.0, 8.0, 0.0, 0.0, 9.0, 0.0, 0.0, 10.0, 0.0]);
        let indices: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 4, 7]);
    }

    #[test]
    fn test_empty_and_tiny_input() {
        assert!(detect(&[]).is_empty());
        assert!(detect(&[1.0, 2.0]).is_empty());
    }
}
