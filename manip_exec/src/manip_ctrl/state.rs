//! Implementation of the manipulator control state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use super::{chain, ManipCtrlError, ManipCtrlInitError, Params};
use crate::{
    kin_model::{ManipModel, Pose},
    kin_solver::{GeomSolver, JointConfig, NUM_ACT_JOINTS},
    traj_gen::{self, TaskTrajectory},
};
use comms_if::{
    eqpt::act::{ActDems, ActSense},
    tc::manip_ctrl::TrajCmd,
};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Dispatch intervals shorter than this give no usable speed estimate.
///
/// Units: seconds
const MIN_SPEED_EST_DT_S: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Manipulator control module state.
#[derive(Default)]
pub struct ManipCtrl {
    pub(crate) params: Params,

    report: StatusReport,

    /// The declared joint chain, holding the current joint state.
    pub(crate) model: ManipModel,

    /// Geometric solver, built during init.
    pub(crate) solver: Option<GeomSolver>,

    /// The trajectory currently being traced.
    active_traj: Option<Box<dyn TaskTrajectory>>,

    /// Time the active trajectory was activated at.
    traj_start_time_s: f64,

    /// Time the control phase last executed at.
    prev_control_time_s: f64,

    /// Time the feedback read phase last executed at.
    prev_receive_time_s: f64,

    /// Time feedback was last successfully read at.
    last_good_receive_time_s: f64,

    /// True if the most recent feedback read succeeded.
    receive_data_flag: bool,

    /// True once the actuator bus has been enabled.
    actuators_enabled: bool,

    /// Demands from the most recent dispatch, held through unreachable
    /// samples.
    last_dems: Option<ActDems>,

    /// Time of the most recent dispatch, for speed estimation.
    last_dispatch_time_s: f64,
}

/// Input data to the control module.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Monotonic time of this cycle, measured from exec start.
    ///
    /// Units: seconds
    pub present_time_s: f64,

    /// Trajectory command received this cycle, if any.
    pub traj_cmd: Option<TrajCmd>,

    /// True if a trajectory stop was commanded this cycle.
    pub stop_traj: bool,
}

/// Output data from the control module.
#[derive(Debug, Clone, Default)]
pub struct OutputData {
    /// Demands to dispatch to the actuators, `None` outside control ticks
    /// and while no target is solvable.
    pub act_dems: Option<ActDems>,
}

/// Status report on the control module's processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// True while a trajectory is being traced.
    pub traj_active: bool,

    /// Time since the active trajectory was activated.
    ///
    /// Units: seconds
    pub traj_elapsed_s: f64,

    /// True on the cycle the trajectory ended, normally by dispatch of its
    /// final waypoint.
    pub traj_completed: bool,

    /// True if this cycle's sampled target could not be solved and the
    /// previous demands are being held.
    pub pose_unreachable: bool,

    /// True if actuator feedback has aged past the staleness threshold.
    pub stale_feedback: bool,

    /// True if demands were dispatched this cycle.
    pub dispatched: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ManipCtrl {
    type InitData = &'static str;
    type InitError = ManipCtrlInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ManipCtrlError;

    /// Initialise the module.
    ///
    /// Loads the parameter file, declares the joint chain and builds the
    /// solver against it. Expects the actuators to be at their current
    /// positions, no demands are produced until a trajectory is commanded.
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;
        self.model = chain::build_chain()?;
        self.solver = Some(GeomSolver::new(self.params.solver.clone(), &self.model)?);

        info!(
            "ManipCtrl initialised: control rate {} s, receive rate {} s",
            self.params.control_rate_s, self.params.receive_rate_s
        );

        Ok(())
    }

    /// Cyclic processing of the module.
    ///
    /// Command intake happens every cycle, but targets are only sampled and
    /// dispatched on control ticks, cycles in which at least a control
    /// period has passed since the previous control tick. Missed ticks are
    /// not replayed, the next tick samples at the current time.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();
        let mut output = OutputData::default();

        self.report.stale_feedback = self.feedback_stale(input_data.present_time_s);

        if input_data.stop_traj && self.active_traj.is_some() {
            info!("Trajectory stopped by command");
            self.active_traj = None;
        }

        if let Some(ref cmd) = input_data.traj_cmd {
            self.activate(cmd, input_data.present_time_s)?;
        }

        self.report.traj_active = self.active_traj.is_some();

        // Control phase gate
        if input_data.present_time_s - self.prev_control_time_s < self.params.control_rate_s {
            return Ok((output, self.report));
        }
        self.prev_control_time_s = input_data.present_time_s;

        // Sample the active trajectory at this tick's time
        let target = match self.active_traj {
            Some(ref traj) => {
                let elapsed_s = input_data.present_time_s - self.traj_start_time_s;
                Some((traj.sample(elapsed_s), traj.is_complete(elapsed_s), elapsed_s))
            }
            None => None,
        };

        if let Some((target_pose, complete, elapsed_s)) = target {
            self.report.traj_elapsed_s = elapsed_s;

            let solver = self.solver.as_ref().ok_or(ManipCtrlError::NotInit)?;

            match solver.inverse(&target_pose) {
                Ok(config) => {
                    let dems = self.build_dems(&config, input_data.present_time_s);
                    self.apply_config(&config, &dems)?;

                    self.last_dems = Some(dems.clone());
                    self.report.dispatched = true;
                    output.act_dems = Some(dems);

                    if complete {
                        info!("Trajectory complete after {:.2} s", elapsed_s);
                        self.report.traj_completed = true;
                        self.report.traj_active = false;
                        self.active_traj = None;
                    }
                }
                Err(e) => {
                    self.report.pose_unreachable = true;

                    if complete {
                        // Out of time on a target the solver cannot reach,
                        // there is nothing left to trace
                        warn!(
                            "Trajectory ended after {:.2} s without reaching \
                            its final waypoint: {}",
                            elapsed_s, e
                        );
                        self.report.traj_completed = true;
                        self.report.traj_active = false;
                        self.active_traj = None;
                    } else {
                        // Recoverable, hold the previous demands and let the
                        // trajectory carry on, later samples may come back
                        // into reach
                        warn!("Sampled target cannot be reached: {}", e);
                    }
                }
            }
        }

        Ok((output, self.report))
    }
}

impl ManipCtrl {
    /// True if the feedback read phase is due at the given time.
    pub fn receive_due(&self, present_time_s: f64) -> bool {
        self.actuators_enabled
            && present_time_s - self.prev_receive_time_s >= self.params.receive_rate_s
    }

    /// Record the outcome of a feedback read phase.
    ///
    /// Pass `Some` with the sensed values on a successful read, `None` on a
    /// failed one. Successful reads update the joint state held in the
    /// model, failed reads lower the receive flag and eventually cause the
    /// status report to flag the feedback as stale.
    pub fn record_feedback(&mut self, sense: Option<&ActSense>, present_time_s: f64) {
        self.prev_receive_time_s = present_time_s;

        match sense {
            Some(sense) => {
                self.receive_data_flag = true;
                self.last_good_receive_time_s = present_time_s;

                for (name, act_id) in self.model.actuated() {
                    if let Some(pos_rad) = sense.pos_rad.get(&act_id) {
                        if self.model.set_joint_state(&name, *pos_rad, 0.0).is_err() {
                            warn!("Sensed position for undeclared joint {:?}", name);
                        }
                    }
                }
            }
            None => self.receive_data_flag = false,
        }
    }

    /// Mark the actuator bus as enabled or disabled.
    ///
    /// While disabled no feedback reads are due and staleness is not
    /// flagged.
    pub fn set_actuators_enabled(&mut self, enabled: bool) {
        self.actuators_enabled = enabled;
    }

    /// True once the actuator bus has been enabled.
    pub fn actuators_enabled(&self) -> bool {
        self.actuators_enabled
    }

    /// True if the most recent feedback read succeeded.
    pub fn receive_data_flag(&self) -> bool {
        self.receive_data_flag
    }

    /// True while a trajectory is being traced.
    pub fn traj_active(&self) -> bool {
        self.active_traj.is_some()
    }

    /// Get the current pose of the tool from the joint state in the model.
    pub fn current_tool_pose(&self) -> Result<Pose, ManipCtrlError> {
        let solver = self.solver.as_ref().ok_or(ManipCtrlError::NotInit)?;

        let pos_rad = self.model.actuated_pos_rad();
        let mut act_pos_rad = [0.0; NUM_ACT_JOINTS];
        for (i, pos) in pos_rad.iter().take(NUM_ACT_JOINTS).enumerate() {
            act_pos_rad[i] = *pos;
        }

        let (pose, _) = solver
            .forward(&act_pos_rad)
            .map_err(ManipCtrlError::StartPoseError)?;

        Ok(pose)
    }

    /// Drop the active trajectory and held demands.
    ///
    /// Called when the system enters safe mode. The control phase then
    /// produces no demands until a new trajectory is commanded.
    pub fn make_safe(&mut self) {
        if self.active_traj.is_some() {
            warn!("Active trajectory dropped");
        }
        self.active_traj = None;
        self.last_dems = None;
    }

    /// Activate the commanded trajectory, replacing any active one.
    ///
    /// The trajectory is built from the tool's current pose, so it begins
    /// where the manipulator currently is. If the command cannot be built
    /// the active trajectory is left untouched.
    fn activate(&mut self, cmd: &TrajCmd, present_time_s: f64) -> Result<(), ManipCtrlError> {
        let start_pose = self.current_tool_pose()?;
        let traj = traj_gen::build(cmd, start_pose)?;

        info!(
            "Starting {} trajectory of {:.2} s from ({:.4}, {:.4}) m",
            cmd.kind().as_str(),
            traj.duration_s(),
            start_pose.position_m.x,
            start_pose.position_m.y
        );

        self.active_traj = Some(traj);
        self.traj_start_time_s = present_time_s;

        Ok(())
    }

    /// Build actuator demands for the given configuration.
    ///
    /// Speed demands are estimated from the previously dispatched positions,
    /// the first dispatch of a session demands zero speed.
    fn build_dems(&mut self, config: &JointConfig, present_time_s: f64) -> ActDems {
        let mut dems = ActDems::empty();

        let dt_s = present_time_s - self.last_dispatch_time_s;

        for (i, (_, act_id)) in self
            .model
            .actuated()
            .iter()
            .enumerate()
            .take(NUM_ACT_JOINTS)
        {
            let pos_rad = config.act_pos_rad[i];

            let speed_rads = match self.last_dems {
                Some(ref last) => match last.pos_rad.get(act_id) {
                    Some(prev_rad) if dt_s > MIN_SPEED_EST_DT_S => (pos_rad - prev_rad) / dt_s,
                    _ => 0.0,
                },
                None => 0.0,
            };

            dems.pos_rad.insert(*act_id, pos_rad);
            dems.speed_rads.insert(*act_id, speed_rads);
        }

        self.last_dispatch_time_s = present_time_s;

        dems
    }

    /// Write a solved configuration into the model's joint state.
    fn apply_config(&mut self, config: &JointConfig, dems: &ActDems) -> Result<(), ManipCtrlError> {
        let actuated = self.model.actuated();
        for (i, (name, act_id)) in actuated.iter().enumerate().take(NUM_ACT_JOINTS) {
            let vel_rads = dems.speed_rads.get(act_id).copied().unwrap_or(0.0);
            self.model
                .set_joint_state(name, config.act_pos_rad[i], vel_rads)?;
        }

        let passive = self.model.passive();
        for (i, name) in passive.iter().enumerate() {
            if let Some(pos_rad) = config.passive_pos_rad.get(i) {
                self.model.set_joint_state(name, *pos_rad, 0.0)?;
            }
        }

        Ok(())
    }

    /// True if feedback has aged past the staleness threshold.
    fn feedback_stale(&self, present_time_s: f64) -> bool {
        if !self.actuators_enabled {
            return false;
        }

        present_time_s - self.last_good_receive_time_s
            > self.params.stale_receive_multiple * self.params.receive_rate_s
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use crate::kin_solver;
    use comms_if::eqpt::act::ACT_IDS;
    use comms_if::tc::manip_ctrl::PosArg;
    use nalgebra::Vector3;

    /// Build an initialised controller without touching the filesystem.
    fn test_ctrl() -> ManipCtrl {
        let mut ctrl = ManipCtrl::default();
        ctrl.params = Params {
            control_rate_s: 0.010,
            receive_rate_s: 0.100,
            stale_receive_multiple: 3.0,
            solver: kin_solver::Params {
                base_radius_m: 0.1705,
                platform_radius_m: 0.045,
                proximal_link_m: 0.120,
                distal_link_m: 0.098,
                act_min_pos_rad: -1.8,
                act_max_pos_rad: 1.8,
            },
        };
        ctrl.model = chain::build_chain().unwrap();
        ctrl.solver = Some(GeomSolver::new(ctrl.params.solver.clone(), &ctrl.model).unwrap());
        ctrl
    }

    fn line_input(end_m: [f64; 3], duration_s: f64, present_time_s: f64) -> InputData {
        InputData {
            present_time_s,
            traj_cmd: Some(TrajCmd::Line {
                start_pos_m: PosArg([0.0; 3]),
                end_pos_m: PosArg(end_m),
                duration_s,
            }),
            stop_traj: false,
        }
    }

    fn tick(present_time_s: f64) -> InputData {
        InputData {
            present_time_s,
            traj_cmd: None,
            stop_traj: false,
        }
    }

    #[test]
    fn test_control_phase_gating() {
        let mut ctrl = test_ctrl();

        // Activation at t = 0.02, the first control tick dispatches
        let (output, report) = ctrl.proc(&line_input([0.01, 0.0, 0.0], 1.0, 0.02)).unwrap();
        assert!(output.act_dems.is_some());
        assert!(report.dispatched);
        assert!(report.traj_active);

        // A cycle inside the control period produces nothing
        let (output, report) = ctrl.proc(&tick(0.025)).unwrap();
        assert!(output.act_dems.is_none());
        assert!(!report.dispatched);
        assert!(report.traj_active);

        // After a gap of several periods exactly one dispatch occurs,
        // sampled at the current time rather than the missed ticks
        let (output, report) = ctrl.proc(&tick(0.055)).unwrap();
        assert!(output.act_dems.is_some());
        assert!((report.traj_elapsed_s - 0.035).abs() < 1e-12);
    }

    #[test]
    fn test_completion_dispatches_final_waypoint_once() {
        let mut ctrl = test_ctrl();

        ctrl.proc(&line_input([0.01, 0.0, 0.0], 0.05, 0.02)).unwrap();

        // Tick past the end of the trajectory
        let (output, report) = ctrl.proc(&tick(0.08)).unwrap();
        assert!(report.traj_completed);
        assert!(!report.traj_active);
        assert!(!ctrl.traj_active());

        // The final demands are the commanded endpoint
        let dems = output.act_dems.unwrap();
        let expected = ctrl
            .solver
            .as_ref()
            .unwrap()
            .inverse(&Pose::from_position(0.01, 0.0, 0.0))
            .unwrap();
        for (i, (_, act_id)) in ctrl.model.actuated().iter().enumerate() {
            assert!((dems.pos_rad[act_id] - expected.act_pos_rad[i]).abs() < 1e-9);
        }

        // Once complete no further dispatches occur
        let (output, report) = ctrl.proc(&tick(0.12)).unwrap();
        assert!(output.act_dems.is_none());
        assert!(!report.traj_completed);
        assert!(!report.dispatched);
    }

    #[test]
    fn test_unreachable_sample_holds() {
        let mut ctrl = test_ctrl();

        // A line far outside the workspace, the activation tick still
        // solves since the sample at zero elapsed is the current pose
        let (output, _) = ctrl.proc(&line_input([0.5, 0.0, 0.0], 0.02, 0.02)).unwrap();
        assert!(output.act_dems.is_some());

        // Midway along the line the sample is out of reach, no demands are
        // produced and the trajectory stays active
        let (output, report) = ctrl.proc(&tick(0.03)).unwrap();
        assert!(output.act_dems.is_none());
        assert!(report.pose_unreachable);
        assert!(report.traj_active);
        assert!(!report.traj_completed);
    }

    #[test]
    fn test_unreachable_end_completes_by_time() {
        let mut ctrl = test_ctrl();

        // The endpoint is never reachable, so the final waypoint cannot be
        // dispatched. The trajectory must still end once its time is up.
        ctrl.proc(&line_input([0.5, 0.0, 0.0], 0.02, 0.02)).unwrap();

        let (output, report) = ctrl.proc(&tick(0.05)).unwrap();
        assert!(output.act_dems.is_none());
        assert!(report.pose_unreachable);
        assert!(report.traj_completed);
        assert!(!report.traj_active);
        assert!(!ctrl.traj_active());

        // Later ticks are quiet
        let (output, report) = ctrl.proc(&tick(0.08)).unwrap();
        assert!(output.act_dems.is_none());
        assert!(!report.pose_unreachable);
        assert!(!report.traj_completed);
    }

    #[test]
    fn test_stop_clears_trajectory() {
        let mut ctrl = test_ctrl();

        ctrl.proc(&line_input([0.01, 0.0, 0.0], 1.0, 0.02)).unwrap();
        assert!(ctrl.traj_active());

        let input = InputData {
            present_time_s: 0.03,
            traj_cmd: None,
            stop_traj: true,
        };
        let (output, report) = ctrl.proc(&input).unwrap();
        assert!(!report.traj_active);
        assert!(output.act_dems.is_none());
        assert!(!ctrl.traj_active());
    }

    #[test]
    fn test_next_trajectory_starts_from_current_pose() {
        let mut ctrl = test_ctrl();

        // Trace a line away from home and let it complete
        ctrl.proc(&line_input([0.02, 0.0, 0.0], 0.05, 0.02)).unwrap();
        ctrl.proc(&tick(0.08)).unwrap();

        let pose = ctrl.current_tool_pose().unwrap();
        assert!((pose.position_m - Vector3::new(0.02, 0.0, 0.0)).norm() < 1e-9);

        // A second trajectory's first sample is the pose reached above
        let (output, _) = ctrl.proc(&line_input([0.0, 0.01, 0.0], 1.0, 0.1)).unwrap();
        let dems = output.act_dems.unwrap();
        let expected = ctrl.solver.as_ref().unwrap().inverse(&pose).unwrap();
        for (i, (_, act_id)) in ctrl.model.actuated().iter().enumerate() {
            assert!((dems.pos_rad[act_id] - expected.act_pos_rad[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_make_safe_drops_trajectory() {
        let mut ctrl = test_ctrl();

        ctrl.proc(&line_input([0.01, 0.0, 0.0], 1.0, 0.02)).unwrap();
        assert!(ctrl.traj_active());

        ctrl.make_safe();
        assert!(!ctrl.traj_active());

        let (output, report) = ctrl.proc(&tick(0.04)).unwrap();
        assert!(output.act_dems.is_none());
        assert!(!report.traj_active);
    }

    #[test]
    fn test_receive_phase_schedule() {
        let mut ctrl = test_ctrl();

        // Nothing is due until the bus is enabled
        assert!(!ctrl.receive_due(1.0));
        ctrl.set_actuators_enabled(true);

        assert!(ctrl.receive_due(0.1));
        let mut sense = ActSense::default();
        for id in ACT_IDS.iter() {
            sense.pos_rad.insert(*id, 0.0);
        }
        ctrl.record_feedback(Some(&sense), 0.1);

        assert!(ctrl.receive_data_flag());
        assert!(!ctrl.receive_due(0.15));
        assert!(ctrl.receive_due(0.2));
    }

    #[test]
    fn test_feedback_staleness() {
        let mut ctrl = test_ctrl();
        ctrl.set_actuators_enabled(true);

        let mut sense = ActSense::default();
        for id in ACT_IDS.iter() {
            sense.pos_rad.insert(*id, 0.0);
        }
        ctrl.record_feedback(Some(&sense), 0.1);

        // A failed read does not immediately flag staleness
        ctrl.record_feedback(None, 0.2);
        assert!(!ctrl.receive_data_flag());
        let (_, report) = ctrl.proc(&tick(0.25)).unwrap();
        assert!(!report.stale_feedback);

        // Three receive periods after the last good read it goes stale
        let (_, report) = ctrl.proc(&tick(0.45)).unwrap();
        assert!(report.stale_feedback);
    }

    #[test]
    fn test_feedback_updates_model() {
        let mut ctrl = test_ctrl();
        ctrl.set_actuators_enabled(true);

        let target = Pose::from_position(0.02, -0.01, 0.0);
        let config = ctrl.solver.as_ref().unwrap().inverse(&target).unwrap();

        let mut sense = ActSense::default();
        for (i, (_, act_id)) in ctrl.model.actuated().iter().enumerate() {
            sense.pos_rad.insert(*act_id, config.act_pos_rad[i]);
        }
        ctrl.record_feedback(Some(&sense), 0.1);

        let pose = ctrl.current_tool_pose().unwrap();
        assert!((pose.position_m - target.position_m).norm() < 1e-9);
    }

    #[test]
    fn test_speed_demands_follow_position_deltas() {
        let mut ctrl = test_ctrl();

        // The activation tick is the first dispatch and demands zero speed
        let (output, _) = ctrl.proc(&line_input([0.02, 0.0, 0.0], 0.1, 0.02)).unwrap();
        let first_dems = output.act_dems.unwrap();
        for id in ACT_IDS.iter() {
            assert_eq!(first_dems.speed_rads[id], 0.0);
        }

        let (output, _) = ctrl.proc(&tick(0.03)).unwrap();
        let dems = output.act_dems.unwrap();

        // Later dispatches demand the position delta over the interval
        let (output, _) = ctrl.proc(&tick(0.04)).unwrap();
        let next_dems = output.act_dems.unwrap();
        for id in ACT_IDS.iter() {
            let expected = (next_dems.pos_rad[id] - dems.pos_rad[id]) / 0.01;
            assert!((next_dems.speed_rads[id] - expected).abs() < 1e-9);
        }
    }
}
