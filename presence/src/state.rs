use serde::{Deserialize, Serialize};

/// Consecutive empty cycles tolerated before the user is warned.
pub const MISS_THRESHOLD: u32 = 3;

/// Everything the monitor remembers between poll cycles.
///
/// `face_visible` is driven by the debounced warning rather than by a single
/// empty frame, so it is always the negation of `warning_issued`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorState {
    /// Whether a camera stream is open and attached.
    pub camera_active: bool,
    /// Presence verdict currently shown to the user.
    pub face_visible: bool,
    /// Poll cycles in a row that found no face.
    pub consecutive_misses: u32,
    /// Whether the current absence episode has already been announced.
    pub warning_issued: bool,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            camera_active: false,
            face_visible: true,
            consecutive_misses: 0,
            warning_issued: false,
        }
    }
}

/// Coarse view of [`MonitorState`] for display and reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Clear,
    Warned,
}

/// What a single detection result did to the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The camera is off; nothing changed.
    Ignored,
    /// At least one face, and no warning was outstanding.
    Present,
    /// At least one face after a warning; the absence episode is over.
    Recovered,
    /// No face, but not enough misses in a row to warn yet.
    Missed,
    /// No face and the threshold was just reached: warn now.
    Absent,
    /// No face and the episode was already announced.
    StillAbsent,
}

impl Verdict {
    /// True only for the cycle that opens an announced absence episode.
    pub fn should_warn(self) -> bool {
        matches!(self, Verdict::Absent)
    }
}

impl MonitorState {
    /// Fresh state for a newly opened camera session.
    pub fn active() -> Self {
        Self {
            camera_active: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.camera_active, self.warning_issued) {
            (false, _) => Phase::Idle,
            (true, false) => Phase::Clear,
            (true, true) => Phase::Warned,
        }
    }

    /// Fold one detection result into the state.
    ///
    /// Recovery is immediate: a single frame with a face clears the warning.
    /// Absence needs `threshold` empty frames in a row, and is only reported
    /// once per episode however long it lasts.
    pub fn apply(self, faces: usize, threshold: u32) -> (Self, Verdict) {
        if !self.camera_active {
            return (self, Verdict::Ignored);
        }
        if faces > 0 {
            let verdict = if self.warning_issued {
                Verdict::Recovered
            } else {
                Verdict::Present
            };
            return (Self::active(), verdict);
        }

        let misses = self.consecutive_misses.saturating_add(1);
        if self.warning_issued {
            let next = Self {
                consecutive_misses: misses,
                ..self
            };
            return (next, Verdict::StillAbsent);
        }
        if misses >= threshold {
            let next = Self {
                consecutive_misses: misses,
                warning_issued: true,
                face_visible: false,
                ..self
            };
            return (next, Verdict::Absent);
        }
        let next = Self {
            consecutive_misses: misses,
            ..self
        };
        (next, Verdict::Missed)
    }
}

/// [`MonitorState::apply`] with the default [`MISS_THRESHOLD`].
pub fn apply_detection_result(state: MonitorState, faces: usize) -> (MonitorState, Verdict) {
    state.apply(faces, MISS_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_state_is_idle_and_visible() {
        let s = MonitorState::default();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.face_visible);
        assert_eq!(s.consecutive_misses, 0);
    }

    #[test]
    fn inactive_state_ignores_detections() {
        let s = MonitorState::default();
        assert_eq!(s.apply(0, 1), (s, Verdict::Ignored));
        assert_eq!(s.apply(2, 1), (s, Verdict::Ignored));
    }

    #[test]
    fn threshold_of_one_warns_on_first_miss() {
        let (s, v) = MonitorState::active().apply(0, 1);
        assert_eq!(v, Verdict::Absent);
        assert_eq!(s.phase(), Phase::Warned);
    }
}
