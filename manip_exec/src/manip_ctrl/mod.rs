//! Manipulator control module
//!
//! Closed loop control of the manipulator. Each cycle the module accepts
//! trajectory commands, samples the active trajectory at its own fixed
//! control rate, solves the sample into joint space and emits actuator
//! demands. Feedback reads from the actuator bus run at a slower fixed rate
//! through [`ManipCtrl::receive_due`] and [`ManipCtrl::record_feedback`].
//!
//! Targets the solver cannot reach are recoverable, the module holds the
//! previously dispatched demands and flags the miss in its status report.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chain;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use chain::build_chain;
pub use params::Params;
pub use state::{InputData, ManipCtrl, OutputData, StatusReport};

use crate::{kin_model::ModelError, kin_solver::SolverError, traj_gen::TrajGenError};
use util::params::LoadError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during initialisation of the module.
///
/// All of these are configuration errors, initialisation must be aborted.
#[derive(Debug, thiserror::Error)]
pub enum ManipCtrlInitError {
    #[error("Unable to load parameters: {0}")]
    ParamLoadError(#[from] LoadError),

    #[error("Unable to build the kinematic chain: {0}")]
    ChainError(#[from] ModelError),

    #[error("The chain and geometry are inconsistent: {0}")]
    GeometryError(#[from] SolverError),
}

/// Errors which can occur during processing.
///
/// These usually indicate a bad command rather than a failure of the
/// controller itself, the cycle may continue after reporting them.
#[derive(Debug, thiserror::Error)]
pub enum ManipCtrlError {
    #[error("The module has not been initialised")]
    NotInit,

    #[error("Unable to build the commanded trajectory: {0}")]
    TrajBuildError(#[from] TrajGenError),

    #[error("Unable to determine the current tool pose: {0}")]
    StartPoseError(SolverError),

    #[error("Unable to update the chain state: {0}")]
    ModelError(#[from] ModelError),
}
