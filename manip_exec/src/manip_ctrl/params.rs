//! Parameters for the manipulator control module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::kin_solver;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Manipulator control parameters.
///
/// The control rate must not be shorter than the executable's cycle period,
/// otherwise control ticks are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    /// Time between executions of the control phase.
    ///
    /// Units: seconds
    pub control_rate_s: f64,

    /// Time between feedback reads from the actuator bus.
    ///
    /// Units: seconds
    pub receive_rate_s: f64,

    /// Feedback older than this many receive periods is reported stale.
    pub stale_receive_multiple: f64,

    /// Geometry used by the geometric solver.
    pub solver: kin_solver::Params,
}
