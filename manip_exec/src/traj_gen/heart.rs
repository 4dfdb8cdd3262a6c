//! Heart shaped trajectory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use super::{check_duration, plane_axes, profile, TaskTrajectory, TrajGenError};
use crate::kin_model::Pose;
use comms_if::tc::manip_ctrl::TrajPlane;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One pass around a heart curve in a coordinate plane.
///
/// The curve is the classic sixteen sine cubed heart scaled by `size_m / 17`,
/// which places the bottom tip 22/17 of `size_m` below the start. The path
/// starts at the top notch of the heart, which is mapped onto the activation
/// pose, and returns there at the end of the pass.
pub struct Heart {
    start_pose: Pose,
    size_m: f64,
    u_axis: Vector3<f64>,
    v_axis: Vector3<f64>,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Heart {
    pub(crate) fn new(
        size_m: f64,
        plane: TrajPlane,
        duration_s: f64,
        start_pose: Pose,
    ) -> Result<Self, TrajGenError> {
        if !(size_m.is_finite() && size_m > 0.0) {
            return Err(TrajGenError::InvalidParam(format!(
                "heart size of {} m is not positive and finite",
                size_m
            )));
        }

        let (u_axis, v_axis) = plane_axes(plane);

        Ok(Self {
            start_pose,
            size_m,
            u_axis,
            v_axis,
            duration_s: check_duration(duration_s)?,
        })
    }

    /// Evaluate the heart curve's in-plane coordinates at the given curve
    /// parameter.
    fn shape(&self, u_rad: f64) -> (f64, f64) {
        let scale = self.size_m / 17.0;

        let x = 16.0 * u_rad.sin().powi(3);
        let y = 13.0 * u_rad.cos()
            - 5.0 * (2.0 * u_rad).cos()
            - 2.0 * (3.0 * u_rad).cos()
            - (4.0 * u_rad).cos();

        (scale * x, scale * y)
    }
}

impl TaskTrajectory for Heart {
    fn sample(&self, elapsed_s: f64) -> Pose {
        let s = profile::smooth_step(elapsed_s, self.duration_s);

        let (u_curve, v_curve) = self.shape(s * std::f64::consts::TAU);
        let (u_start, v_start) = self.shape(0.0);

        let delta_m = (u_curve - u_start) * self.u_axis + (v_curve - v_start) * self.v_axis;

        Pose {
            position_m: self.start_pose.position_m + delta_m,
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
    fn test_starts_and_closes_on_activation_pose() {
        let start = Pose::from_position(0.0, 0.02, 0.0);
        let heart = Heart::new(0.04, TrajPlane::Xy, 6.0, start).unwrap();

        let begin = heart.sample(0.0);
        assert!((begin.position_m - start.position_m).norm() < 1e-12);

        let end = heart.sample(6.0);
        assert!((end.position_m - start.position_m).norm() < 1e-9);
    }

    #[test]
    fn test_bottom_tip_at_half_time() {
        // At half time the curve parameter is pi, the bottom tip of the
        // heart, which sits 22/17 of the size below the start
        let size = 0.04;
        let start = Pose::from_position(0.0, 0.02, 0.0);
        let heart = Heart::new(size, TrajPlane::Xy, 6.0, start).unwrap();

        let mid = heart.sample(3.0);
        let expected = start.position_m + Vector3::new(0.0, -size * 22.0 / 17.0, 0.0);
        assert!((mid.position_m - expected).norm() < 1e-9);
    }

    #[test]
    fn test_symmetric_about_start_axis() {
        let start = Pose::from_position(0.0, 0.0, 0.0);
        let heart = Heart::new(0.04, TrajPlane::Xy, 6.0, start).unwrap();

        // The curve is symmetric in its parameter, equal times either side
        // of the midpoint mirror in the plane's first axis
        let before = heart.sample(2.0);
        let after = heart.sample(4.0);

        assert!((before.position_m.x + after.position_m.x).abs() < 1e-9);
        assert!((before.position_m.y - after.position_m.y).abs() < 1e-9);
    }

    #[test]
    fn test_plane_selection() {
        let start = Pose::from_position(0.0, 0.0, 0.0);
        let heart = Heart::new(0.04, TrajPlane::Yz, 6.0, start).unwrap();

        // In the YZ plane X never moves
        for i in 0..=12 {
            let pose = heart.sample(i as f64 * 0.5);
            assert!(pose.position_m.x.abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        let result = Heart::new(0.0, TrajPlane::Xy, 6.0, Pose::identity());
        assert!(matches!(result, Err(TrajGenError::InvalidParam(_))));
    }
}
