//! Kinematic chain model module
//!
//! A declarative tree of the manipulator's joints. The model stores the
//! parent/child/axis relationships and the current joint state, and can
//! compose fixed offsets and joint rotations along a chain. The physical
//! closure of the linkage is not represented here, it is enforced by the
//! geometric relations in `kin_solver`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod model;
mod pose;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use model::*;
pub use pose::*;

use comms_if::eqpt::act::ActId;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised while declaring or querying the chain.
///
/// Errors raised during declaration are configuration errors and must abort
/// initialisation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("A joint named {0:?} already exists in the chain")]
    DuplicateName(String),

    #[error("Joint {0:?} references parent {1:?} which has not been declared")]
    DanglingReference(String, String),

    #[error("The chain already has a root ({0:?})")]
    DuplicateRoot(String),

    #[error("The chain already has an end effector ({0:?})")]
    DuplicateEndEffector(String),

    #[error("Actuator {0:?} is already assigned to joint {1:?}")]
    DuplicateActId(ActId, String),

    #[error("No joint named {0:?} exists in the chain")]
    UnknownJoint(String),

    #[error("The chain has no root")]
    NoRoot,
}
