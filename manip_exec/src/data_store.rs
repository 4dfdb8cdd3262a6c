//! # Data store
//!
//! Central store of data within the executable. The data store owns the
//! control module along with its cyclic inputs and outputs, and tracks the
//! exec level state such as safe mode and the monitoring counters.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use crate::manip_ctrl::{self, ManipCtrl};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Causes which can put the exec into safe mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafeModeCause {
    /// A safe mode telecommand was received.
    MakeSafeTc,

    /// Demands could not be written to the actuator bus.
    ActWriteFailure,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Exec-wide data store.
#[derive(Default)]
pub struct DataStore {
    /// Number of completed cycles.
    pub num_cycles: u128,

    /// True on cycles aligned with the one second boundary.
    pub is_1_hz_cycle: bool,

    /// Monotonic time of the current cycle, measured from exec start.
    ///
    /// Units: seconds
    pub present_time_s: f64,

    /// True while the exec is in safe mode. In safe mode no demands are
    /// dispatched and only unsafe requests are accepted as telecommands.
    pub safe: bool,

    /// Cause of the current safe mode, `None` while not safe.
    pub safe_cause: Option<SafeModeCause>,

    // MANIP CTRL
    pub manip_ctrl: ManipCtrl,
    pub manip_ctrl_input: manip_ctrl::InputData,
    pub manip_ctrl_output: manip_ctrl::OutputData,
    pub manip_ctrl_status_rpt: manip_ctrl::StatusReport,

    // MONITORING COUNTERS
    pub num_consec_cycle_overruns: u64,
    pub num_consec_act_write_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform cycle start updates.
    ///
    /// Raises the 1 Hz flag on second boundaries and clears the module's
    /// input, output and status report ready for this cycle.
    pub fn cycle_start(&mut self, cycle_frequency_hz: u128) {
        self.is_1_hz_cycle = self.num_cycles % cycle_frequency_hz == 0;

        self.manip_ctrl_input = Default::default();
        self.manip_ctrl_output = Default::default();
        self.manip_ctrl_status_rpt = Default::default();
    }

    /// Put the exec into safe mode.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Exec entering safe mode: {:?}", cause);

            self.safe = true;
            self.safe_cause = Some(cause);
            self.manip_ctrl.make_safe();
        }
    }

    /// Take the exec out of safe mode.
    ///
    /// Fails if the root cause of the safe mode has not yet cleared.
    pub fn make_unsafe(&mut self) -> Result<(), ()> {
        match self.safe_cause {
            Some(SafeModeCause::ActWriteFailure) => {
                if self.num_consec_act_write_errors > 0 {
                    return Err(());
                }
            }
            Some(SafeModeCause::MakeSafeTc) | None => (),
        }

        self.safe = false;
        self.safe_cause = None;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_safe_mode_transitions() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::MakeSafeTc);
        assert!(ds.safe);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::MakeSafeTc));

        // A second cause does not overwrite the first
        ds.make_safe(SafeModeCause::ActWriteFailure);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::MakeSafeTc));

        assert!(ds.make_unsafe().is_ok());
        assert!(!ds.safe);
        assert_eq!(ds.safe_cause, None);
    }

    #[test]
    fn test_unsafe_requires_cleared_cause() {
        let mut ds = DataStore::default();

        ds.num_consec_act_write_errors = 3;
        ds.make_safe(SafeModeCause::ActWriteFailure);

        // Writes are still failing, the exec must stay safe
        assert!(ds.make_unsafe().is_err());
        assert!(ds.safe);

        ds.num_consec_act_write_errors = 0;
        assert!(ds.make_unsafe().is_ok());
        assert!(!ds.safe);
    }

    #[test]
    fn test_cycle_start_flags() {
        let mut ds = DataStore::default();

        ds.cycle_start(100);
        assert!(ds.is_1_hz_cycle);

        ds.num_cycles = 50;
        ds.cycle_start(100);
        assert!(!ds.is_1_hz_cycle);

        ds.num_cycles = 200;
        ds.cycle_start(100);
        assert!(ds.is_1_hz_cycle);
    }
}
