//! # Telecommand processor
//!
//! Executes telecommands by mutating the data store. Trajectory commands are
//! routed into the control module's input for the current cycle, safe mode
//! requests act on the exec directly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use comms_if::tc::Tc;
use manip_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
pub fn exec(ds: &mut DataStore, tc: &Tc) {
    match tc {
        Tc::MakeSafe => ds.make_safe(SafeModeCause::MakeSafeTc),

        Tc::MakeUnsafe => match ds.make_unsafe() {
            Ok(()) => info!("Exec left safe mode"),
            Err(()) => warn!("Cannot leave safe mode, the root cause has not cleared"),
        },

        Tc::StartTraj(cmd) => ds.manip_ctrl_input.traj_cmd = Some(*cmd),

        Tc::StopTraj => ds.manip_ctrl_input.stop_traj = true,
    }
}
