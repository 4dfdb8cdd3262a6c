//! Straight line trajectory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use super::{check_duration, profile, TaskTrajectory, TrajGenError};
use crate::kin_model::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A straight line from the activation pose.
///
/// The commanded start and end points define the line's direction and
/// length, the path itself begins at the activation pose and ends displaced
/// by the commanded difference.
pub struct Line {
    start_pose: Pose,
    offset_m: Vector3<f64>,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Line {
    pub(crate) fn new(
        start_pos_m: [f64; 3],
        end_pos_m: [f64; 3],
        duration_s: f64,
        start_pose: Pose,
    ) -> Result<Self, TrajGenError> {
        let start = Vector3::from(start_pos_m);
        let end = Vector3::from(end_pos_m);

        if !(start.iter().all(|v| v.is_finite()) && end.iter().all(|v| v.is_finite())) {
            return Err(TrajGenError::InvalidParam(
                "line endpoints must be finite".into(),
            ));
        }

        Ok(Self {
            start_pose,
            offset_m: end - start,
            duration_s: check_duration(duration_s)?,
        })
    }
}

impl TaskTrajectory for Line {
    fn sample(&self, elapsed_s: f64) -> Pose {
        let s = profile::smooth_step(elapsed_s, self.duration_s);

        Pose {
            position_m: self.start_pose.position_m + self.offset_m * s,
            orientation: self.start_pose.orientation,
        }
    }

    fn duration_s(&self) -> f64 {
        self.duration_s
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_traces_commanded_offset() {
        let start = Pose::from_position(0.01, -0.02, 0.0);
        let line = Line::new([0.0, 0.0, 0.0], [0.03, 0.04, 0.0], 2.0, start).unwrap();

        let begin = line.sample(0.0);
        assert!((begin.position_m - start.position_m).norm() < 1e-12);

        let mid = line.sample(1.0);
        let expected = start.position_m + Vector3::new(0.015, 0.02, 0.0);
        assert!((mid.position_m - expected).norm() < 1e-12);

        let end = line.sample(2.0);
        let expected = start.position_m + Vector3::new(0.03, 0.04, 0.0);
        assert!((end.position_m - expected).norm() < 1e-12);

        // Past the end the final pose is held
        let held = line.sample(10.0);
        assert!((held.position_m - expected).norm() < 1e-12);
    }

    #[test]
    fn test_orientation_carried() {
        let start = Pose::identity();
        let line = Line::new([0.0, 0.0, 0.0], [0.01, 0.0, 0.0], 1.0, start).unwrap();

        assert_eq!(line.sample(0.5).orientation, start.orientation);
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = Line::new([0.0; 3], [0.01, 0.0, 0.0], 0.0, Pose::identity());
        assert!(matches!(result, Err(TrajGenError::InvalidParam(_))));
    }
}
