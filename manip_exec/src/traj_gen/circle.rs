//! Circular trajectory.

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
// CONSTANTS
// ---------------------------------------------------------------------------

/// In-plane distances from the centre below this give no usable start
/// bearing, which then defaults to zero.
///
/// Units: meters
const MIN_START_DIST_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One or more revolutions of a circle in a coordinate plane.
///
/// The commanded centre fixes the start bearing: the trajectory begins at
/// the bearing the activation pose has from the centre and sweeps counter
/// clockwise in the commanded plane. The path is traced relative to the
/// activation pose, so after each full revolution it passes through the
/// activation pose again.
pub struct Circle {
    start_pose: Pose,
    radius_m: f64,
    u_axis: Vector3<f64>,
    v_axis: Vector3<f64>,
    start_ang_rad: f64,
    sweep_rad: f64,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Circle {
    pub(crate) fn new(
        centre_pos_m: [f64; 3],
        radius_m: f64,
        plane: TrajPlane,
        revolutions: u32,
        duration_s: f64,
        start_pose: Pose,
    ) -> Result<Self, TrajGenError> {
        if !(radius_m.is_finite() && radius_m > 0.0) {
            return Err(TrajGenError::InvalidParam(format!(
                "circle radius of {} m is not positive and finite",
                radius_m
            )));
        }
        if revolutions == 0 {
            return Err(TrajGenError::InvalidParam(
                "circle must make at least one revolution".into(),
            ));
        }

        let (u_axis, v_axis) = plane_axes(plane);

        let rel = start_pose.position_m - Vector3::from(centre_pos_m);
        let u_comp = rel.dot(&u_axis);
        let v_comp = rel.dot(&v_axis);

        let start_ang_rad = if (u_comp * u_comp + v_comp * v_comp).sqrt() < MIN_START_DIST_M {
            0.0
        } else {
            v_comp.atan2(u_comp)
        };

        Ok(Self {
            start_pose,
            radius_m,
            u_axis,
            v_axis,
            start_ang_rad,
            sweep_rad: revolutions as f64 * std::f64::consts::TAU,
            duration_s: check_duration(duration_s)?,
        })
    }
}

impl TaskTrajectory for Circle {
    fn sample(&self, elapsed_s: f64) -> Pose {
        let s = profile::smooth_step(elapsed_s, self.duration_s);
        let ang = self.start_ang_rad + self.sweep_rad * s;

        let delta_m = self.radius_m
            * ((ang.cos() - self.start_ang_rad.cos()) * self.u_axis
                + (ang.sin() - self.start_ang_rad.sin()) * self.v_axis);

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
    fn test_single_revolution() {
        // Start on the circle, at zero bearing from the centre
        let start = Pose::from_position(0.15, 0.0, 0.1);
        let circle = Circle::new(
            [0.1, 0.0, 0.1],
            0.05,
            TrajPlane::Xy,
            1,
            4.0,
            start,
        )
        .unwrap();

        let begin = circle.sample(0.0);
        assert!((begin.position_m - start.position_m).norm() < 1e-12);

        // Half way round, diametrically opposite the start
        let mid = circle.sample(2.0);
        assert!((mid.position_m - Vector3::new(0.05, 0.0, 0.1)).norm() < 1e-9);

        // A full revolution closes exactly on the start
        let end = circle.sample(4.0);
        assert!((end.position_m - start.position_m).norm() < 1e-9);
        assert!(circle.is_complete(4.0));
    }

    #[test]
    fn test_multiple_revolutions_close() {
        let start = Pose::from_position(0.02, 0.01, 0.0);
        let circle = Circle::new(
            [0.0, 0.0, 0.0],
            0.02,
            TrajPlane::Xy,
            3,
            6.0,
            start,
        )
        .unwrap();

        let end = circle.sample(6.0);
        assert!((end.position_m - start.position_m).norm() < 1e-9);
    }

    #[test]
    fn test_start_on_centre() {
        // Degenerate start bearing defaults to zero and the path stays well
        // defined
        let start = Pose::from_position(0.01, 0.01, 0.0);
        let circle = Circle::new(
            [0.01, 0.01, 0.0],
            0.02,
            TrajPlane::Xy,
            1,
            4.0,
            start,
        )
        .unwrap();

        let begin = circle.sample(0.0);
        assert!((begin.position_m - start.position_m).norm() < 1e-12);

        for i in 0..=40 {
            assert!(!circle.sample(i as f64 * 0.1).is_degenerate());
        }
    }

    #[test]
    fn test_out_of_plane_components_held() {
        let start = Pose::from_position(0.0, 0.02, 0.05);
        let circle = Circle::new(
            [0.0, 0.0, 0.05],
            0.02,
            TrajPlane::Xy,
            1,
            4.0,
            start,
        )
        .unwrap();

        // Z is not spanned by the XY plane so it stays constant
        for i in 0..=20 {
            let pose = circle.sample(i as f64 * 0.2);
            assert!((pose.position_m.z - 0.05).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_radius_rejected() {
        let result = Circle::new(
            [0.0; 3],
            0.0,
            TrajPlane::Xy,
            1,
            4.0,
            Pose::identity(),
        );
        assert!(matches!(result, Err(TrajGenError::InvalidParam(_))));
    }

    #[test]
    fn test_zero_revolutions_rejected() {
        let result = Circle::new(
            [0.0; 3],
            0.02,
            TrajPlane::Xy,
            0,
            4.0,
            Pose::identity(),
        );
        assert!(matches!(result, Err(TrajGenError::InvalidParam(_))));
    }
}
