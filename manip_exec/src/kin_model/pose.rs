//! Pose of a frame relative to the manipulator's base frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and orientation in the base frame.
///
/// Positions are in meters, orientations are unit quaternions. The base frame
/// has its origin at the centre of the base plate, with X towards the first
/// limb's anchor, Z out of the plate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    /// Position of the frame's origin.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Orientation of the frame.
    pub orientation: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Return the identity pose, coincident with the base frame.
    pub fn identity() -> Self {
        Self {
            position_m: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Build a pose at the given position with identity orientation.
    pub fn from_position(x_m: f64, y_m: f64, z_m: f64) -> Self {
        Self {
            position_m: Vector3::new(x_m, y_m, z_m),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// True if any component of the pose is not a finite number.
    pub fn is_degenerate(&self) -> bool {
        !(self.position_m.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite()))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Isometry3<f64>> for Pose {
    fn from(iso: Isometry3<f64>) -> Self {
        Self {
            position_m: iso.translation.vector,
            orientation: iso.rotation,
        }
    }
}

impl From<Pose> for Isometry3<f64> {
    fn from(pose: Pose) -> Self {
        Isometry3::from_parts(pose.position_m.into(), pose.orientation)
    }
}
