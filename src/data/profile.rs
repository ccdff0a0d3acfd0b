use serde::{Deserialize, Serialize};

/// One-dimensional intensity curve, one sample per pixel column.
///
/// Produced fresh per image or frame and never mutated afterwards;
/// every pipeline stage returns a new profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityProfile {
    samples: Vec<f64>,
}

impl IntensityProfile {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population standard deviation (numpy `std` convention).
    pub fn stddev(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let var = self
            .samples
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / self.samples.len() as f64;
        var.sqrt()
    }
}

/// A detected spectral peak: pixel index, calibrated wavelength, and the
/// smoothed intensity at that index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub index: usize,
    pub wavelength: f64,
    pub intensity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_stddev() {
        let p = IntensityProfile::new(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((p.mean() - 5.0).abs() < 1e-12);
        assert!((p.stddev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_profile_stats() {
        let p = IntensityProfile::new(vec![]);
        assert!(p.is_empty());
        assert_eq!(p.mean(), 0.0);
        assert_eq!(p.stddev(), 0.0);
    }
}
