//! Rhombus (closed four sided polyline) trajectory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use super::{check_duration, profile, TaskTrajectory, TrajGenError};
use crate::kin_model::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of vertices in the shape.
const NUM_VERTICES: usize = 4;

/// Perimeters below this are degenerate and the trajectory holds the
/// activation pose instead.
///
/// Units: meters
const MIN_PERIMETER_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A closed loop through four vertices and back to the first.
///
/// Time is distributed over the four sides in proportion to their lengths,
/// so the profile's pace is carried smoothly through the corners. The path
/// is traced relative to the activation pose, with the first vertex mapped
/// onto it.
pub struct Rhombus {
    start_pose: Pose,
    verts_m: [Vector3<f64>; NUM_VERTICES],
    seg_len_m: [f64; NUM_VERTICES],
    total_len_m: f64,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rhombus {
    pub(crate) fn new(
        verts_m: [[f64; 3]; NUM_VERTICES],
        duration_s: f64,
        start_pose: Pose,
    ) -> Result<Self, TrajGenError> {
        let verts_m = [
            Vector3::from(verts_m[0]),
            Vector3::from(verts_m[1]),
            Vector3::from(verts_m[2]),
            Vector3::from(verts_m[3]),
        ];

        if !verts_m.iter().all(|v| v.iter().all(|c| c.is_finite())) {
            return Err(TrajGenError::InvalidParam(
                "rhombus vertices must be finite".into(),
            ));
        }

        let mut seg_len_m = [0.0; NUM_VERTICES];
        let mut total_len_m = 0.0;
        for i in 0..NUM_VERTICES {
            seg_len_m[i] = (verts_m[(i + 1) % NUM_VERTICES] - verts_m[i]).norm();
            total_len_m += seg_len_m[i];
        }

        Ok(Self {
            start_pose,
            verts_m,
            seg_len_m,
            total_len_m,
            duration_s: check_duration(duration_s)?,
        })
    }

    /// Get the point the given distance along the perimeter from the first
    /// vertex.
    fn point_at(&self, path_m: f64) -> Vector3<f64> {
        let mut remaining = path_m;

        for i in 0..NUM_VERTICES {
            if remaining <= self.seg_len_m[i] {
                if self.seg_len_m[i] < MIN_PERIMETER_M {
                    return self.verts_m[i];
                }
                let next = self.verts_m[(i + 1) % NUM_VERTICES];
                return self.verts_m[i]
                    + (next - self.verts_m[i]) * (remaining / self.seg_len_m[i]);
            }
            remaining -= self.seg_len_m[i];
        }

        // Accumulated float error walked off the end, close the loop
        self.verts_m[0]
    }
}

impl TaskTrajectory for Rhombus {
    fn sample(&self, elapsed_s: f64) -> Pose {
        if self.total_len_m < MIN_PERIMETER_M {
            return self.start_pose;
        }

        let s = profile::smooth_step(elapsed_s, self.duration_s);
        let point_m = self.point_at(s * self.total_len_m);

        Pose {
            position_m: self.start_pose.position_m + (point_m - self.verts_m[0]),
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

    /// A symmetric rhombus with equal sides centred on (0.01, 0, 0).
    fn test_verts() -> [[f64; 3]; 4] {
        [
            [0.0, 0.0, 0.0],
            [0.01, 0.01, 0.0],
            [0.02, 0.0, 0.0],
            [0.01, -0.01, 0.0],
        ]
    }

    #[test]
    fn test_starts_and_closes_on_activation_pose() {
        let start = Pose::from_position(0.005, 0.002, 0.0);
        let rhombus = Rhombus::new(test_verts(), 8.0, start).unwrap();

        let begin = rhombus.sample(0.0);
        assert!((begin.position_m - start.position_m).norm() < 1e-12);

        let end = rhombus.sample(8.0);
        assert!((end.position_m - start.position_m).norm() < 1e-9);
    }

    #[test]
    fn test_opposite_vertex_at_half_time() {
        // With equal sides, half the path distance lands on the opposite
        // vertex, and the profile maps half time to half distance
        let start = Pose::from_position(0.005, 0.002, 0.0);
        let rhombus = Rhombus::new(test_verts(), 8.0, start).unwrap();

        let mid = rhombus.sample(4.0);
        let expected = start.position_m + Vector3::new(0.02, 0.0, 0.0);
        assert!((mid.position_m - expected).norm() < 1e-9);
    }

    #[test]
    fn test_time_shares_follow_side_lengths() {
        // A rectangle with unequal sides, the first corner is reached once
        // the first side's share of the perimeter is traced
        let verts = [
            [0.0, 0.0, 0.0],
            [0.03, 0.0, 0.0],
            [0.03, 0.01, 0.0],
            [0.0, 0.01, 0.0],
        ];
        let start = Pose::identity();
        let rhombus = Rhombus::new(verts, 8.0, start).unwrap();

        // Perimeter is 0.08 m, so the first side ends at 3/8 of the path.
        // At the first millisecond tick where the profile crosses 3/8 the
        // sample can be at most a fraction of a millimeter past the corner.
        let mut found = false;
        for i in 0..=8000 {
            let t = i as f64 * 0.001;
            if super::super::profile::smooth_step(t, 8.0) >= 0.375 {
                let pose = rhombus.sample(t);
                assert!((pose.position_m - Vector3::new(0.03, 0.0, 0.0)).norm() < 1e-4);
                found = true;
                break;
            }
        }
        assert!(found);
    }

    #[test]
    fn test_zero_perimeter_holds_activation_pose() {
        let start = Pose::from_position(0.01, 0.0, 0.0);
        let rhombus = Rhombus::new([[0.005, 0.0, 0.0]; 4], 4.0, start).unwrap();

        for i in 0..=10 {
            let pose = rhombus.sample(i as f64 * 0.4);
            assert!((pose.position_m - start.position_m).norm() < 1e-12);
        }
    }
}
