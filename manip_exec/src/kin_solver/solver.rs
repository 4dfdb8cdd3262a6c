//! Closed form kinematics of the three limbed parallel linkage.
//!
//! Each limb is a two bar chain from a base anchor to a platform corner. The
//! anchors sit at 120 degree intervals on both plates, so at home (all
//! actuated angles zero) the platform is centred over the base. The solver
//! works in the base plane, target Z components are ignored as the linkage
//! cannot leave the plane.
//!
//! The elbow branch is fixed: of the two possible elbow positions for a limb
//! the solver always takes the one on the counter clockwise side of the
//! chord from base anchor to platform corner. This makes both directions
//! single valued and keeps repeated solutions consistent.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::{JointConfig, Params, SolverError, NUM_ACT_JOINTS, NUM_PASSIVE_JOINTS};
use crate::kin_model::{ManipModel, Pose};
use util::maths::{clamp, wrap_to_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Chord lengths below this are treated as degenerate.
///
/// Units: meters
const MIN_CHORD_LEN_M: f64 = 1e-9;

/// Tolerance on the cosine of the elbow opening angle before a target is
/// declared out of reach. Absorbs floating point error at the workspace
/// boundary.
const COS_DOMAIN_TOL: f64 = 1e-9;

/// Determinants below this indicate a singular platform solve.
const MIN_PLATFORM_DET: f64 = 1e-12;

/// Largest distance by which the solved platform centre may miss a limb's
/// distal circle before the actuated angles are declared inconsistent.
///
/// Units: meters
const MAX_ASSEMBLY_RESIDUAL_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Stateless geometric solver for the manipulator.
///
/// Built once at init against the declared chain and the loaded geometry,
/// after which [`GeomSolver::inverse`] and [`GeomSolver::forward`] may be
/// called freely. Identical inputs always produce identical outputs.
pub struct GeomSolver {
    params: Params,

    /// Anchor bearing of each limb from the plate centre.
    ///
    /// Units: radians
    psi: [f64; NUM_ACT_JOINTS],

    /// Base anchor position of each limb.
    ///
    /// Units: meters
    base_anchor_m: [Vector2<f64>; NUM_ACT_JOINTS],

    /// Proximal link bearing of each limb in the home configuration.
    ///
    /// Units: radians
    home_lambda_rad: [f64; NUM_ACT_JOINTS],

    /// Distal link bearing of each limb in the home configuration.
    ///
    /// Units: radians
    home_mu_rad: [f64; NUM_ACT_JOINTS],

    /// Elbow angle (distal bearing relative to proximal) at home.
    ///
    /// Units: radians
    home_elbow_rad: [f64; NUM_ACT_JOINTS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeomSolver {
    /// Build a solver for the given geometry and declared chain.
    ///
    /// Fails with [`SolverError::BadChain`] if the chain does not have the
    /// expected shape or if the geometry cannot assemble in the home
    /// configuration. Such failures are configuration errors and must abort
    /// initialisation.
    pub fn new(params: Params, model: &ManipModel) -> Result<Self, SolverError> {
        let num_act = model.actuated().len();
        if num_act != NUM_ACT_JOINTS {
            return Err(SolverError::BadChain(format!(
                "expected {} actuated joints, chain declares {}",
                NUM_ACT_JOINTS, num_act
            )));
        }

        let num_passive = model.passive().len();
        if num_passive != NUM_PASSIVE_JOINTS {
            return Err(SolverError::BadChain(format!(
                "expected {} passive joints, chain declares {}",
                NUM_PASSIVE_JOINTS, num_passive
            )));
        }

        let ee = match model.end_effector_name() {
            Some(name) => name,
            None => {
                return Err(SolverError::BadChain(
                    "chain declares no end effector".into(),
                ))
            }
        };
        if model.chain_to(ee).is_err() {
            return Err(SolverError::BadChain(
                "end effector is not connected to the root".into(),
            ));
        }

        let a = params.proximal_link_m;
        let b = params.distal_link_m;
        let d_home = params.base_radius_m - params.platform_radius_m;

        if a <= 0.0 || b <= 0.0 || d_home <= 0.0 {
            return Err(SolverError::BadChain(
                "link lengths and anchor radii must be positive".into(),
            ));
        }

        let cos_beta_home = (a * a + d_home * d_home - b * b) / (2.0 * a * d_home);
        if cos_beta_home.abs() >= 1.0 {
            return Err(SolverError::BadChain(format!(
                "home anchor distance of {:.4} m is outside the limb's reach",
                d_home
            )));
        }
        let beta_home = cos_beta_home.acos();

        let mut psi = [0.0; NUM_ACT_JOINTS];
        let mut base_anchor_m = [Vector2::zeros(); NUM_ACT_JOINTS];
        let mut home_lambda_rad = [0.0; NUM_ACT_JOINTS];
        let mut home_mu_rad = [0.0; NUM_ACT_JOINTS];
        let mut home_elbow_rad = [0.0; NUM_ACT_JOINTS];

        for i in 0..NUM_ACT_JOINTS {
            psi[i] = i as f64 * std::f64::consts::TAU / 3.0;
            base_anchor_m[i] = params.base_radius_m * unit_vec(psi[i]);

            // At home the chord from base anchor to platform corner points at
            // the plate centre, so its bearing is psi + pi.
            home_lambda_rad[i] = psi[i] + std::f64::consts::PI + beta_home;

            let elbow_m = base_anchor_m[i] + a * unit_vec(home_lambda_rad[i]);
            let corner_m = params.platform_radius_m * unit_vec(psi[i]);
            let to_corner = corner_m - elbow_m;
            home_mu_rad[i] = to_corner.y.atan2(to_corner.x);
            home_elbow_rad[i] = wrap_to_pi(home_mu_rad[i] - home_lambda_rad[i]);
        }

        Ok(Self {
            params,
            psi,
            base_anchor_m,
            home_lambda_rad,
            home_mu_rad,
            home_elbow_rad,
        })
    }

    /// Solve for the joint configuration reaching the given platform pose.
    ///
    /// Only the X and Y components of the pose are used. Fails with
    /// [`SolverError::Unreachable`] if any limb cannot span the target and
    /// with [`SolverError::JointLimit`] if an actuated angle would exceed its
    /// limits. On failure no partial configuration is produced and no output
    /// contains NaN.
    pub fn inverse(&self, pose: &Pose) -> Result<JointConfig, SolverError> {
        let p = Vector2::new(pose.position_m.x, pose.position_m.y);

        let a = self.params.proximal_link_m;
        let b = self.params.distal_link_m;
        let d_home = self.params.base_radius_m - self.params.platform_radius_m;

        let mut act_pos_rad = [0.0; NUM_ACT_JOINTS];
        let mut lambda_rad = [0.0; NUM_ACT_JOINTS];

        for i in 0..NUM_ACT_JOINTS {
            // Chord from base anchor to the limb's platform corner
            let chord = p - d_home * unit_vec(self.psi[i]);
            let d = chord.norm();

            if d < MIN_CHORD_LEN_M {
                return Err(SolverError::Unreachable(p.x, p.y));
            }

            let cos_beta = (a * a + d * d - b * b) / (2.0 * a * d);
            if cos_beta.abs() > 1.0 + COS_DOMAIN_TOL {
                return Err(SolverError::Unreachable(p.x, p.y));
            }

            // Counter clockwise elbow branch, beta is non-negative
            let beta = clamp(&cos_beta, &-1.0, &1.0).acos();
            let alpha = chord.y.atan2(chord.x);
            lambda_rad[i] = alpha + beta;

            let theta = wrap_to_pi(lambda_rad[i] - self.home_lambda_rad[i]);
            if theta < self.params.act_min_pos_rad || theta > self.params.act_max_pos_rad {
                return Err(SolverError::JointLimit(
                    i,
                    theta,
                    self.params.act_min_pos_rad,
                    self.params.act_max_pos_rad,
                ));
            }
            act_pos_rad[i] = theta;
        }

        Ok(JointConfig {
            act_pos_rad,
            passive_pos_rad: self.passive_config(&p, &lambda_rad),
        })
    }

    /// Solve for the platform pose produced by the given actuated angles.
    ///
    /// Fails with [`SolverError::JointLimit`] if an angle is outside its
    /// limits, with [`SolverError::Singular`] if the platform position
    /// cannot be isolated, and with [`SolverError::Inconsistent`] if the
    /// angles admit no closed assembly. The returned pose lies in the base
    /// plane with identity orientation.
    pub fn forward(
        &self,
        act_pos_rad: &[f64; NUM_ACT_JOINTS],
    ) -> Result<(Pose, JointConfig), SolverError> {
        for (i, theta) in act_pos_rad.iter().enumerate() {
            if *theta < self.params.act_min_pos_rad || *theta > self.params.act_max_pos_rad {
                return Err(SolverError::JointLimit(
                    i,
                    *theta,
                    self.params.act_min_pos_rad,
                    self.params.act_max_pos_rad,
                ));
            }
        }

        let a = self.params.proximal_link_m;
        let r = self.params.platform_radius_m;

        // Each limb constrains the platform centre to a circle of radius b
        // about its corner shifted elbow. The centre is recovered from the
        // pairwise differences of those circle equations, which is a linear
        // system in the centre's coordinates.
        let mut lambda_rad = [0.0; NUM_ACT_JOINTS];
        let mut shifted_m = [Vector2::zeros(); NUM_ACT_JOINTS];

        for i in 0..NUM_ACT_JOINTS {
            lambda_rad[i] = self.home_lambda_rad[i] + act_pos_rad[i];
            let elbow_m = self.base_anchor_m[i] + a * unit_vec(lambda_rad[i]);
            shifted_m[i] = elbow_m - r * unit_vec(self.psi[i]);
        }

        let r10 = shifted_m[1] - shifted_m[0];
        let r20 = shifted_m[2] - shifted_m[0];
        let c0 = shifted_m[1].norm_squared() - shifted_m[0].norm_squared();
        let c1 = shifted_m[2].norm_squared() - shifted_m[0].norm_squared();

        let det = 4.0 * (r10.x * r20.y - r10.y * r20.x);
        if det.abs() < MIN_PLATFORM_DET {
            return Err(SolverError::Singular(
                "limb constraint circles have collinear centres".into(),
            ));
        }

        let p = Vector2::new(
            (c0 * 2.0 * r20.y - c1 * 2.0 * r10.y) / det,
            (2.0 * r10.x * c1 - 2.0 * r20.x * c0) / det,
        );

        // The linear system only encodes the pairwise circle differences, so
        // the solution must be substituted back into the circles themselves.
        // Angle sets with no closed assembly fail here.
        let b = self.params.distal_link_m;
        for i in 0..NUM_ACT_JOINTS {
            let residual_m = ((p - shifted_m[i]).norm() - b).abs();
            if residual_m > MAX_ASSEMBLY_RESIDUAL_M {
                return Err(SolverError::Inconsistent(i, residual_m));
            }
        }

        let config = JointConfig {
            act_pos_rad: *act_pos_rad,
            passive_pos_rad: self.passive_config(&p, &lambda_rad),
        };

        Ok((Pose::from_position(p.x, p.y, 0.0), config))
    }

    /// Compute the passive joint angles for a platform centre and set of
    /// proximal link bearings.
    ///
    /// The first three entries are the elbow angles of each limb relative to
    /// home. The last entry is the platform joint, which closes the serial
    /// chain through the first limb so that the rotations along it sum to
    /// the platform's fixed orientation.
    fn passive_config(
        &self,
        platform_m: &Vector2<f64>,
        lambda_rad: &[f64; NUM_ACT_JOINTS],
    ) -> [f64; NUM_PASSIVE_JOINTS] {
        let a = self.params.proximal_link_m;
        let r = self.params.platform_radius_m;

        let mut passive_pos_rad = [0.0; NUM_PASSIVE_JOINTS];
        let mut mu_0_rad = 0.0;

        for i in 0..NUM_ACT_JOINTS {
            let elbow_m = self.base_anchor_m[i] + a * unit_vec(lambda_rad[i]);
            let corner_m = platform_m + r * unit_vec(self.psi[i]);
            let to_corner = corner_m - elbow_m;
            let mu = to_corner.y.atan2(to_corner.x);

            passive_pos_rad[i] = wrap_to_pi((mu - lambda_rad[i]) - self.home_elbow_rad[i]);
            if i == 0 {
                mu_0_rad = mu;
            }
        }

        passive_pos_rad[NUM_PASSIVE_JOINTS - 1] = wrap_to_pi(self.home_mu_rad[0] - mu_0_rad);

        passive_pos_rad
    }
}

/// Unit vector at the given bearing.
fn unit_vec(ang_rad: f64) -> Vector2<f64> {
    Vector2::new(ang_rad.cos(), ang_rad.sin())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
