//! Exec-wide parameters.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters controlling the executable itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ManipExecParams {
    /// If true demands are sent to the physical actuator bus, otherwise the
    /// simulated actuators are used.
    pub using_actual_robot: bool,

    /// Serial device the physical actuator bus is attached to.
    pub act_bus_device: String,

    /// Baud rate of the physical actuator bus.
    pub act_bus_baud: u32,
}
