//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod manip_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use serde_json::{self, json, Value};
use thiserror::Error;

// Internal
use manip_ctrl::{TrajCmd, TrajKind};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the manipulator by an operator.
///
/// The type string used on the wire is given next to each variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Tc {
    /// `"SAFE"`: Put the exec into safe mode, clearing any active trajectory
    /// and preventing actuator dispatch.
    MakeSafe,

    /// `"UNSAFE"`: Take the exec out of safe mode.
    MakeUnsafe,

    /// `"TRAJ_START"`: Start one of the named trajectories at the next
    /// control cycle.
    StartTraj(TrajCmd),

    /// `"TRAJ_STOP"`: Stop the active trajectory, holding the current
    /// position.
    StopTraj,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0} is expected to have a payload but it doesn't")]
    MissingPayload(String),

    #[error("{0} is not a recognised trajectory name")]
    UnknownTrajectory(String),

    #[error("TC payload could not be parsed: {0}")]
    PayloadParseError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(TcParseError::InvalidJson(e))
        };

        // Get the type of the TC
        let type_str = match val["type"].as_str() {
            Some(s) => s,
            None => return Err(TcParseError::InvalidType(String::from(
                "Expected \"type\" to be a string"
            )))
        };

        match type_str {
            "SAFE" => Ok(Tc::MakeSafe),
            "UNSAFE" => Ok(Tc::MakeUnsafe),
            "TRAJ_STOP" => Ok(Tc::StopTraj),
            "TRAJ_START" => {
                // Trajectory starts carry the command as their payload
                let payload = &val["payload"];

                if payload.is_null() {
                    return Err(TcParseError::MissingPayload(
                        String::from(type_str)
                    ))
                }

                // The trajectory name selects the command variant, so check
                // it against the known families before deserialising to get
                // a clear error for unknown names.
                let name = match payload["name"].as_str() {
                    Some(s) => s,
                    None => return Err(TcParseError::InvalidType(String::from(
                        "Expected payload \"name\" to be a string"
                    )))
                };

                if TrajKind::from_str(name).is_none() {
                    return Err(TcParseError::UnknownTrajectory(
                        String::from(name)
                    ))
                }

                match serde_json::from_value::<TrajCmd>(payload.clone()) {
                    Ok(cmd) => Ok(Tc::StartTraj(cmd)),
                    Err(e) => Err(TcParseError::PayloadParseError(e))
                }
            },
            _ => Err(TcParseError::InvalidType(
                format!("{} is not a recognised TC type", type_str)
            ))
        }
    }

    /// Serialise this TC into the JSON packet format accepted by
    /// [`Tc::from_json`].
    pub fn to_json(&self) -> String {
        match self {
            Tc::MakeSafe => json!({"type": "SAFE"}).to_string(),
            Tc::MakeUnsafe => json!({"type": "UNSAFE"}).to_string(),
            Tc::StopTraj => json!({"type": "TRAJ_STOP"}).to_string(),
            Tc::StartTraj(cmd) => json!({
                "type": "TRAJ_START",
                // TrajCmd is internally tagged by "name" so this value is
                // exactly the payload format from_json expects
                "payload": serde_json::to_value(cmd)
                    .expect("TrajCmd is always representable as JSON")
            }).to_string(),
        }
    }
}
