//! # Manipulator Control Software Library
//!
//! This library provides the modules used by the manipulator control
//! executable. They are exposed as a library so that tools and benchmarks
//! can drive the same code the executable runs.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Boundary between the control loop and the actuator bus.
pub mod act_if;

/// Central store of data within the executable.
pub mod data_store;

/// Declarative model of the manipulator's joint chain.
pub mod kin_model;

/// Closed form kinematics of the closed chain linkage.
pub mod kin_solver;

/// Closed loop control of the manipulator.
pub mod manip_ctrl;

/// Exec-wide parameters.
pub mod params;

/// Task space trajectory generation.
pub mod traj_gen;
