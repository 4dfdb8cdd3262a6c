//! # Manipulator Control Executable
//!
//! Cyclic executable for closed loop control of the three limbed planar
//! manipulator. Each cycle the exec pumps telecommands from the loaded
//! script, runs the feedback receive phase when due, processes the control
//! module and dispatches the resulting demands to the actuator bus.
//!
//! Run with the path to a telecommand script:
//!
//! ```shell
//! manip_exec scripts/demo.prs
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{error, info, warn};
use serde::Serialize;
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::{eqpt::act::ActDems, tc::Tc};
use manip_lib::{
    act_if::{ActuatorInterface, SimActuators},
    data_store::{DataStore, SafeModeCause},
    manip_ctrl::StatusReport,
    params::ManipExecParams,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    params,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of the exec's cycle.
///
/// Units: seconds
const CYCLE_PERIOD_S: f64 = 0.010;

/// Frequency of the exec's cycle.
///
/// Units: hertz
const CYCLE_FREQUENCY_HZ: u128 = 100;

/// Number of consecutive actuator write failures which will put the exec
/// into safe mode.
const MAX_ACT_WRITE_ERRORS: u64 = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Telemetry snapshot saved into the session once per second.
#[derive(Serialize)]
struct TmSnapshot {
    present_time_s: f64,
    num_cycles: u128,
    safe: bool,
    status: StatusReport,
    act_dems: Option<ActDems>,
}

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    // Error handling
    color_eyre::install()?;

    // Session and logging initialisation
    let session =
        Session::new("manip_exec", "sessions").wrap_err("Failed to create the session")?;
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Manipulator Control Executable");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get system information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // Exec parameters
    let exec_params: ManipExecParams =
        params::load("manip_exec.toml").wrap_err("Failed to load exec parameters")?;

    // Telecommand script
    let args: Vec<String> = env::args().collect();
    let mut script = match args.len() {
        2 => {
            let interpreter =
                ScriptInterpreter::new(&args[1]).wrap_err("Failed to load the TC script")?;

            info!(
                "TC script loaded: {} TCs over {:.2} s",
                interpreter.get_num_tcs(),
                interpreter.get_duration()
            );

            interpreter
        }
        _ => return Err(eyre!("Expected the path to a TC script: manip_exec <script>")),
    };

    // Data store and module initialisation
    let mut ds = DataStore::default();

    ds.manip_ctrl
        .init("manip_ctrl.toml", &session)
        .wrap_err("Failed to initialise ManipCtrl")?;

    // Actuator interface selection
    if exec_params.using_actual_robot {
        return Err(eyre!(
            "This build has no client for the physical actuator bus on {}, set \
            using_actual_robot = false",
            exec_params.act_bus_device
        ));
    }
    let mut actuators: Box<dyn ActuatorInterface> = Box::new(SimActuators::new());

    actuators
        .enable_all()
        .wrap_err("Failed to enable the actuators")?;
    ds.manip_ctrl.set_actuators_enabled(true);
    info!("Actuators enabled, holding current position");

    // All cycle scheduling runs off a monotonic epoch, wall clock steps
    // cannot disturb it
    let exec_epoch = Instant::now();

    info!("Begin cyclic execution\n");

    loop {
        let cycle_start_instant = Instant::now();
        let present_time_s = exec_epoch.elapsed().as_secs_f64();

        // Cycle initialisation
        ds.cycle_start(CYCLE_FREQUENCY_HZ);
        ds.present_time_s = present_time_s;
        ds.manip_ctrl_input.present_time_s = present_time_s;

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs(present_time_s) {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    // In safe mode only unsafe requests are honoured
                    if ds.safe && !matches!(tc, Tc::MakeUnsafe) {
                        warn!("TC rejected, the exec is in safe mode");
                        continue;
                    }

                    tc_processor::exec(&mut ds, tc);
                }
            }
            // Once the script is exhausted let any active trajectory run out
            // before stopping
            PendingTcs::EndOfScript => {
                if !ds.manip_ctrl.traj_active() {
                    info!("End of TC script reached");
                    break;
                }
            }
        }

        // ---- FEEDBACK RECEIVE PHASE ----

        if ds.manip_ctrl.receive_due(present_time_s) {
            match actuators.read_all() {
                Ok(sense) => ds.manip_ctrl.record_feedback(Some(&sense), present_time_s),
                Err(e) => {
                    warn!("Actuator feedback read failed: {}", e);
                    ds.manip_ctrl.record_feedback(None, present_time_s);
                }
            }
        }

        // ---- PROCESSING ----

        match ds.manip_ctrl.proc(&ds.manip_ctrl_input) {
            Ok((output, report)) => {
                ds.manip_ctrl_output = output;
                ds.manip_ctrl_status_rpt = report;
            }
            // Processing errors usually mean a bad TC, warn and continue
            Err(e) => warn!("ManipCtrl processing error: {}", e),
        }

        // ---- DEMAND DISPATCH ----

        if !ds.safe {
            if let Some(dems) = ds.manip_ctrl_output.act_dems.clone() {
                match actuators.write_all(&dems) {
                    Ok(()) => ds.num_consec_act_write_errors = 0,
                    Err(e) => {
                        warn!("Failed to write actuator demands: {}", e);
                        ds.num_consec_act_write_errors += 1;

                        if ds.num_consec_act_write_errors >= MAX_ACT_WRITE_ERRORS {
                            error!(
                                "{} consecutive actuator write failures",
                                ds.num_consec_act_write_errors
                            );
                            ds.make_safe(SafeModeCause::ActWriteFailure);
                        }
                    }
                }
            }
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            util::session::save_with_timestamp(
                "tm/manip_ctrl_tm.json",
                TmSnapshot {
                    present_time_s,
                    num_cycles: ds.num_cycles,
                    safe: ds.safe,
                    status: ds.manip_ctrl_status_rpt,
                    act_dems: ds.manip_ctrl_output.act_dems.clone(),
                },
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(remaining) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(remaining);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.num_cycles += 1;
    }

    info!("End of execution");
    session.exit();

    Ok(())
}
