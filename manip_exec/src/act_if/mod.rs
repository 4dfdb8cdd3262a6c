//! Actuator interface module
//!
//! Boundary between the control loop and the actuator bus. The control loop
//! only sees the [`ActuatorInterface`] trait, so the same loop runs against
//! the simulated bus used for development and a client for the real serial
//! bus.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use sim::SimActuators;

use comms_if::eqpt::act::{ActDems, ActSense};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Access to the manipulator's actuator bus.
///
/// All calls are expected to complete within a bounded time, implementations
/// must fail with [`ActIfError::Timeout`] rather than block the control
/// cycle.
pub trait ActuatorInterface {
    /// Enable (torque on) all actuators.
    ///
    /// Once enabled the actuators hold their positions until demands arrive.
    fn enable_all(&mut self) -> Result<(), ActIfError>;

    /// Read the current position of all actuators.
    fn read_all(&mut self) -> Result<ActSense, ActIfError>;

    /// Write position and speed demands to all actuators.
    fn write_all(&mut self, dems: &ActDems) -> Result<(), ActIfError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by actuator bus access.
#[derive(Debug, thiserror::Error)]
pub enum ActIfError {
    #[error("The actuators have not been enabled")]
    NotEnabled,

    #[error("The actuator bus did not respond within {0} ms")]
    Timeout(u64),

    #[error("Could not write demands to the actuator bus: {0}")]
    WriteError(String),
}
