//! Trajectory generation module
//!
//! Builds time parameterised task space trajectories from trajectory
//! commands. A trajectory is sampled by elapsed time only, so samples are
//! pure functions of the build inputs and a trajectory may be restarted by
//! resetting its start time.
//!
//! All shapes are traced relative to the pose the end effector had when the
//! trajectory was activated, the first sample of any trajectory is always
//! that pose.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod circle;
mod heart;
mod line;
mod profile;
mod rhombus;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
pub use circle::Circle;
pub use heart::Heart;
pub use line::Line;
pub use rhombus::Rhombus;

use crate::kin_model::Pose;
use comms_if::tc::manip_ctrl::{TrajCmd, TrajPlane};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A time parameterised task space trajectory.
pub trait TaskTrajectory {
    /// Sample the target pose at the given time since activation.
    ///
    /// Times outside `[0, duration]` are clamped, sampling past the end
    /// holds the final pose.
    fn sample(&self, elapsed_s: f64) -> Pose;

    /// Total duration of the trajectory.
    ///
    /// Units: seconds
    fn duration_s(&self) -> f64;

    /// True once the elapsed time has reached the duration.
    fn is_complete(&self, elapsed_s: f64) -> bool {
        elapsed_s >= self.duration_s()
    }
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while building a trajectory.
#[derive(Debug, thiserror::Error)]
pub enum TrajGenError {
    #[error("Invalid trajectory parameter: {0}")]
    InvalidParam(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the trajectory described by the given command, starting from the
/// given pose.
pub fn build(
    cmd: &TrajCmd,
    start_pose: Pose,
) -> Result<Box<dyn TaskTrajectory>, TrajGenError> {
    match *cmd {
        TrajCmd::Line {
            start_pos_m,
            end_pos_m,
            duration_s,
        } => Ok(Box::new(Line::new(
            start_pos_m.0,
            end_pos_m.0,
            duration_s,
            start_pose,
        )?)),
        TrajCmd::Circle {
            centre_pos_m,
            radius_m,
            plane,
            revolutions,
            duration_s,
        } => Ok(Box::new(Circle::new(
            centre_pos_m.0,
            radius_m,
            plane,
            revolutions,
            duration_s,
            start_pose,
        )?)),
        TrajCmd::Rhombus {
            vertex_a_m,
            vertex_b_m,
            vertex_c_m,
            vertex_d_m,
            duration_s,
        } => Ok(Box::new(Rhombus::new(
            [vertex_a_m.0, vertex_b_m.0, vertex_c_m.0, vertex_d_m.0],
            duration_s,
            start_pose,
        )?)),
        TrajCmd::Heart {
            size_m,
            plane,
            duration_s,
        } => Ok(Box::new(Heart::new(size_m, plane, duration_s, start_pose)?)),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the pair of unit vectors spanning the given trajectory plane.
pub(crate) fn plane_axes(plane: TrajPlane) -> (Vector3<f64>, Vector3<f64>) {
    match plane {
        TrajPlane::Xy => (Vector3::x(), Vector3::y()),
        TrajPlane::Yz => (Vector3::y(), Vector3::z()),
        TrajPlane::Xz => (Vector3::x(), Vector3::z()),
    }
}

/// Validate a commanded duration.
pub(crate) fn check_duration(duration_s: f64) -> Result<f64, TrajGenError> {
    if duration_s.is_finite() && duration_s > 0.0 {
        Ok(duration_s)
    } else {
        Err(TrajGenError::InvalidParam(format!(
            "duration of {} s is not positive and finite",
            duration_s
        )))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
