//! Geometric solver module
//!
//! Closed-form kinematics for the three limbed closed-chain planar
//! manipulator. The solver maps between the platform pose and the joint
//! angles of the chain declared in [`crate::kin_model`], keeping the loop
//! closure constraints satisfied.
//!
//! Both directions are stateless and side effect free. Failures are
//! recoverable, the caller decides whether to hold position or abort.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod solver;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use params::Params;
pub use solver::GeomSolver;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of actuated joints in the chain.
pub const NUM_ACT_JOINTS: usize = 3;

/// Number of passive joints in the chain.
pub const NUM_PASSIVE_JOINTS: usize = 4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A full joint space configuration of the manipulator.
///
/// Angles are deviations from the home configuration, in which the platform
/// sits centred over the base and all angles are zero.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct JointConfig {
    /// Angles of the actuated joints, in declaration order.
    ///
    /// Units: radians
    pub act_pos_rad: [f64; NUM_ACT_JOINTS],

    /// Angles of the passive joints, in declaration order.
    ///
    /// Units: radians
    pub passive_pos_rad: [f64; NUM_PASSIVE_JOINTS],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the solver.
///
/// [`SolverError::BadChain`] indicates a configuration error and is fatal.
/// All other variants are recoverable, the commanded target is simply not
/// achievable and the previous demands should be held.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("The declared chain does not match the solver geometry: {0}")]
    BadChain(String),

    #[error("Position ({0:.4}, {1:.4}) m is outside the reachable workspace")]
    Unreachable(f64, f64),

    #[error("Actuator {0} demand of {1:.4} rad exceeds the limit of [{2:.4}, {3:.4}] rad")]
    JointLimit(usize, f64, f64, f64),

    #[error("The configuration is singular: {0}")]
    Singular(String),

    #[error(
        "The actuated angles do not assemble, limb {0}'s distal link misses \
        the platform centre by {1:.6} m"
    )]
    Inconsistent(usize, f64),
}
