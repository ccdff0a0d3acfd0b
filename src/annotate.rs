/// Click-driven peak annotation toggling.
///
/// A click carries an x-axis coordinate in wavelength units. The toggle
/// snaps it to the nearest detected peak and either shows element
/// candidates for that peak or retracts an annotation already shown.
/// The machine owns its shown-annotation map and emits explicit
/// commands, so it stays decoupled from whatever draws them.
use crate::data::elements::{LineMatch, ReferenceLineTable};
use crate::data::profile::Peak;

/// What an annotation displays for a peak.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationPayload {
    /// Candidate element lines within tolerance.
    Matches(Vec<LineMatch>),
    /// Explicit "no matching elements" marker; rendered, not an error.
    NoMatch,
}

/// Output command for the rendering side.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationCommand {
    Show {
        wavelength: f64,
        intensity: f64,
        payload: AnnotationPayload,
    },
    Retract {
        wavelength: f64,
    },
}

/// Toggle state: the currently shown annotations, keyed by the peak's
/// calibrated wavelength. Keys are exact values taken from the peak set,
/// so exact comparison is the lookup rule.
#[derive(Debug, Default)]
pub struct AnnotationToggle {
    shown: Vec<(f64, AnnotationPayload)>,
}

impl AnnotationToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    pub fn is_shown(&self, wavelength: f64) -> bool {
        self.shown.iter().any(|(wl, _)| *wl == wavelength)
    }

    /// Handle one click event against the current peak set.
    ///
    /// The nearest peak wins, however far; ties resolve to the first
    /// peak in index order. Returns `None` only when there are no peaks
    /// to snap to.
    pub fn toggle(
        &mut self,
        click_wavelength: f64,
        peaks: &[Peak],
        table: &ReferenceLineTable,
        tolerance: f64,
    ) -> Option<AnnotationCommand> {
        let nearest = peaks.iter().min_by(|a, b| {
            (a.wavelength - click_wavelength)
                .abs()
                .partial_cmp(&(b.wavelength - click_wavelength).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;

        if let Some(pos) = self.shown.iter().position(|(wl, _)| *wl == nearest.wavelength) {
            self.shown.remove(pos);
            return Some(AnnotationCommand::Retract { wavelength: nearest.wavelength });
        }

        let matches = table.matches_near(nearest.wavelength, tolerance);
        let payload = if matches.is_empty() {
            AnnotationPayload::NoMatch
        } else {
            AnnotationPayload::Matches(matches)
        };
        self.shown.push((nearest.wavelength, payload.clone()));
        Some(AnnotationCommand::Show {
            wavelength: nearest.wavelength,
            intensity: nearest.intensity,
            payload,
        })
    }

    /// Retract annotations whose wavelength no longer names a current
    /// peak. Peaks drift between detections in live mode; without this,
    /// stale entries could never be toggled off again.
    pub fn prune(&mut self, peaks: &[Peak]) -> Vec<AnnotationCommand> {
        let mut retracted = Vec::new();
        self.shown.retain(|(wl, _)| {
            if peaks.iter().any(|p| p.wavelength == *wl) {
                true
            } else {
                retracted.push(AnnotationCommand::Retract { wavelength: *wl });
                false
            }
        });
        retracted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(index: usize, wavelength: f64) -> Peak {
        Peak { index, wavelength, intensity: 50.0 }
    }

    #[test]
    fn test_toggle_on_off_on() {
        let table = ReferenceLineTable::builtin();
        let peaks = vec![peak(10, 589.0)];
        let mut toggle = AnnotationToggle::new();

        let first = toggle.toggle(588.2, &peaks, &table, 2.0).unwrap();
        match &first {
            AnnotationCommand::Show { wavelength, payload, .. } => {
                assert_eq!(*wavelength, 589.0);
                match payload {
                    AnnotationPayload::Matches(m) => {
                        assert!(m.iter().any(|lm| lm.element == "Sodium"))
                    }
                    AnnotationPayload::NoMatch => panic!("sodium doublet should match"),
                }
            }
            _ => panic!("first click must show"),
        }
        assert!(toggle.is_shown(589.0));

        let second = toggle.toggle(588.2, &peaks, &table, 2.0).unwrap();
        assert_eq!(second, AnnotationCommand::Retract { wavelength: 589.0 });
        assert!(!toggle.is_shown(589.0));

        let third = toggle.toggle(588.2, &peaks, &table, 2.0).unwrap();
        assert_eq!(third, first);
    }

    #[test]
    fn test_no_match_payload_is_explicit() {
        let table = ReferenceLineTable::builtin();
        let peaks = vec![peak(3, 1500.0)];
        let mut toggle = AnnotationToggle::new();
        match toggle.toggle(1490.0, &peaks, &table, 2.0).unwrap() {
            AnnotationCommand::Show { payload, .. } => {
                assert_eq!(payload, AnnotationPayload::NoMatch)
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_nearest_peak_wins_without_cutoff() {
        let table = ReferenceLineTable::builtin();
        let peaks = vec![peak(5, 420.0), peak(40, 650.0)];
        let mut toggle = AnnotationToggle::new();
        // Far from everything, still snaps to the closer peak.
        match toggle.toggle(1000.0, &peaks, &table, 2.0).unwrap() {
            AnnotationCommand::Show { wavelength, .. } => assert_eq!(wavelength, 650.0),
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_tie_resolves_to_first_in_index_order() {
        let table = ReferenceLineTable::builtin();
        let peaks = vec![peak(5, 500.0), peak(9, 520.0)];
        let mut toggle = AnnotationToggle::new();
        match toggle.toggle(510.0, &peaks, &table, 2.0).unwrap() {
            AnnotationCommand::Show { wavelength, .. } => assert_eq!(wavelength, 500.0),
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_no_peaks_no_command() {
        let table = ReferenceLineTable::builtin();
        let mut toggle = AnnotationToggle::new();
        assert!(toggle.toggle(500.0, &[], &table, 2.0).is_none());
    }

    #[test]
    fn test_prune_retracts_stale_keys() {
        let table = ReferenceLineTable::builtin();
        let old_peaks = vec![peak(10, 589.0), peak(30, 656.3)];
        let mut toggle = AnnotationToggle::new();
        toggle.toggle(589.0, &old_peaks, &table, 2.0).unwrap();
        toggle.toggle(656.3, &old_peaks, &table, 2.0).unwrap();
        assert_eq!(toggle.shown_count(), 2);

        // The next detection kept one peak and moved the other.
        let new_peaks = vec![peak(10, 589.0), peak(31, 657.1)];
        let retracted = toggle.prune(&new_peaks);
        assert_eq!(retracted, vec![AnnotationCommand::Retract { wavelength: 656.3 }]);
        assert_eq!(toggle.shown_count(), 1);
        assert!(toggle.is_shown(589.0));
    }
}
