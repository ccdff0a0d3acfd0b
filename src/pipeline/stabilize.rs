/// Temporal stabilization of live frames.
///
/// Successive profiles are blended exponentially to suppress
/// frame-to-frame flicker before smoothing. The blended result (not the
/// raw frame) becomes the new history, so stabilization accumulates
/// over the whole frame history.
use crate::data::profile::IntensityProfile;
use crate::error::{Result, SpectrumError};

#[derive(Debug)]
pub struct StreamStabilizer {
    factor: f64,
    previous: Option<Vec<f64>>,
}

impl StreamStabilizer {
    pub fn new(factor: f64) -> Self {
        Self { factor, previous: None }
    }

    /// Blend a new frame's profile with history.
    ///
    /// The first frame passes through unchanged. Fails with
    /// `ShapeMismatch` when the profile length changes (e.g. the ROI
    /// moved between frames); the caller should `reset` and feed the
    /// frame again as a first frame.
    pub fn stabilize(&mut self, profile: &IntensityProfile) -> Result<IntensityProfile> {
        match &self.previous {
            None => {
                self.previous = Some(profile.samples().to_vec());
                Ok(profile.clone())
            }
            Some(prev) => {
                if prev.len() != profile.len() {
                    return Err(SpectrumError::ShapeMismatch {
                        expected: prev.len(),
                        actual: profile.len(),
                    });
                }
                let blended: Vec<f64> = prev
                    .iter()
                    .zip(profile.samples())
                    .map(|(&p, &new)| self.factor * p + (1.0 - self.factor) * new)
                    .collect();
                self.previous = Some(blended.clone());
                Ok(IntensityProfile::new(blended))
            }
        }
    }

    /// Discard stored history; the next frame passes through unchanged.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_passes_through() {
        let mut st = StreamStabilizer::new(0.9);
        let frame = IntensityProfile::new(vec![10.0, 10.0, 10.0]);
        let out = st.stabilize(&frame).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn test_second_frame_blends() {
        let mut st = StreamStabilizer::new(0.9);
        st.stabilize(&IntensityProfile::new(vec![10.0, 10.0, 10.0])).unwrap();
        let out = st
            .stabilize(&IntensityProfile::new(vec![20.0, 20.0, 20.0]))
            .unwrap();
        for &v in out.samples() {
            assert!((v - 11.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_blending_is_cumulative() {
        // The stored state after frame 2 is the blend, so frame 3 blends
        // against [11,11,11], not the raw [20,20,20].
        let mut st = StreamStabilizer::new(0.9);
        st.stabilize(&IntensityProfile::new(vec![10.0; 3])).unwrap();
        st.stabilize(&IntensityProfile::new(vec![20.0; 3])).unwrap();
        let out = st.stabilize(&IntensityProfile::new(vec![20.0; 3])).unwrap();
        for &v in out.samples() {
            assert!((v - 11.9).abs() < 1e-12);
        }
    }

    #[test]
    fn test_shape_mismatch_then_reset() {
        let mut st = StreamStabilizer::new(0.9);
        st.stabilize(&IntensityProfile::new(vec![1.0; 4])).unwrap();
        let err = st.stabilize(&IntensityProfile::new(vec![1.0; 5])).unwrap_err();
        assert!(matches!(
            err,
            SpectrumError::ShapeMismatch { expected: 4, actual: 5 }
        ));

        st.reset();
        let frame = IntensityProfile::new(vec![2.0; 5]);
        let out = st.stabilize(&frame).unwrap();
        assert_eq!(out, frame);
    }
}
