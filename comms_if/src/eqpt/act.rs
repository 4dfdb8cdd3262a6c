//! # Actuator Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// All actuators of the manipulator, in bus id order.
pub const ACT_IDS: [ActId; 3] = [ActId::Joint1, ActId::Joint2, ActId::Joint3];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands that are sent to the actuator interface.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActDems {
    /// The demanded position of an actuator in radians.
    pub pos_rad: HashMap<ActId, f64>,

    /// The demanded speed of an actuator in radians/second.
    pub speed_rads: HashMap<ActId, f64>,
}

/// Sensed actuator state returned by the actuator interface.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ActSense {
    /// The sensed position of an actuator in radians.
    pub pos_rad: HashMap<ActId, f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all actuators available to the manipulator.
///
/// Each actuator drives the proximal link of one limb, and is named after the
/// actuated joint it is mounted at.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    Joint1,
    Joint2,
    Joint3,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ActId {
    /// The id of this actuator on the physical bus.
    pub fn bus_id(&self) -> u8 {
        match self {
            ActId::Joint1 => 1,
            ActId::Joint2 => 2,
            ActId::Joint3 => 3,
        }
    }
}

impl ActDems {
    /// Build an empty demand set, with no positions or speeds demanded.
    pub fn empty() -> Self {
        ActDems {
            pos_rad: HashMap::new(),
            speed_rads: HashMap::new(),
        }
    }
}
