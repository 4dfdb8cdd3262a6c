//! Parameters for the geometric solver.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Geometry of the manipulator.
///
/// The three limbs are identical and attach at 120 degree intervals around
/// both the base and the platform. The home distance between matching base
/// and platform anchors is `base_radius_m - platform_radius_m`, which must
/// lie within the limb's reach for the home configuration to assemble.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    /// Radius of the circle the base anchors sit on.
    ///
    /// Units: meters
    pub base_radius_m: f64,

    /// Radius of the circle the platform anchors sit on.
    ///
    /// Units: meters
    pub platform_radius_m: f64,

    /// Length of the proximal (actuated) link of each limb.
    ///
    /// Units: meters
    pub proximal_link_m: f64,

    /// Length of the distal (passive) link of each limb.
    ///
    /// Units: meters
    pub distal_link_m: f64,

    /// Lower limit on each actuated joint angle.
    ///
    /// Units: radians
    pub act_min_pos_rad: f64,

    /// Upper limit on each actuated joint angle.
    ///
    /// Units: radians
    pub act_max_pos_rad: f64,
}
