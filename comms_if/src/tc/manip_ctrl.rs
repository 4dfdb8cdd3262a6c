//! # Manipulator control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use std::str::FromStr;
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A trajectory that can be executed by manipulator control.
///
/// The `name` tag selects the family, the remaining fields are the family's
/// parameters. All trajectories are traced relative to the end effector pose
/// at the moment the command is executed, so that motion is continuous with
/// whatever came before.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum TrajCmd {
    /// A straight line between two points.
    ///
    /// The line is offset so that it begins at the current end effector
    /// position, i.e. the commanded motion is the vector from start to end.
    #[structopt(name = "line")]
    Line {
        /// The start point of the line in metres.
        start_pos_m: PosArg,

        /// The end point of the line in metres.
        end_pos_m: PosArg,

        /// The total duration of the motion in seconds.
        duration_s: f64
    },

    /// A circular path about a centre point.
    ///
    /// The start angle on the circle is taken from the bearing of the current
    /// end effector position about the centre, so a start position on the
    /// circle traces the circle exactly.
    #[structopt(name = "circle")]
    Circle {
        /// The centre of the circle in metres.
        centre_pos_m: PosArg,

        /// The radius of the circle in metres.
        radius_m: f64,

        /// The plane the circle is drawn in.
        plane: TrajPlane,

        /// The number of complete revolutions to perform.
        revolutions: u32,

        /// The total duration of the motion in seconds.
        duration_s: f64
    },

    /// A closed piecewise-linear path visiting four vertices in order.
    ///
    /// The path runs a -> b -> c -> d -> a, with each leg allotted a share of
    /// the duration proportional to its length.
    #[structopt(name = "rhombus")]
    Rhombus {
        /// The first vertex in metres. The path starts and ends here.
        vertex_a_m: PosArg,

        /// The second vertex in metres.
        vertex_b_m: PosArg,

        /// The third vertex in metres.
        vertex_c_m: PosArg,

        /// The fourth vertex in metres.
        vertex_d_m: PosArg,

        /// The total duration of the motion in seconds.
        duration_s: f64
    },

    /// A closed heart-shaped curve traced once.
    #[structopt(name = "heart")]
    Heart {
        /// The overall size (maximum extent) of the heart in metres.
        size_m: f64,

        /// The plane the heart is drawn in.
        plane: TrajPlane,

        /// The total duration of the motion in seconds.
        duration_s: f64
    }
}

/// The trajectory families known to manipulator control.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrajKind {
    Line,
    Circle,
    Rhombus,
    Heart
}

/// The plane a planar trajectory is drawn in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrajPlane {
    /// The X-Y plane, with X as the first in-plane axis.
    Xy,
    /// The Y-Z plane, with Y as the first in-plane axis.
    Yz,
    /// The X-Z plane, with X as the first in-plane axis.
    Xz
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A 3D position argument, in metres.
///
/// Parsed from the command line as three comma separated values, for example
/// `0.0,0.02,0.0`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PosArg(pub [f64; 3]);

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TrajCmd {
    /// Get the family this command belongs to.
    pub fn kind(&self) -> TrajKind {
        match self {
            TrajCmd::Line { .. } => TrajKind::Line,
            TrajCmd::Circle { .. } => TrajKind::Circle,
            TrajCmd::Rhombus { .. } => TrajKind::Rhombus,
            TrajCmd::Heart { .. } => TrajKind::Heart
        }
    }

    /// Get the total duration of the commanded motion in seconds.
    pub fn duration_s(&self) -> f64 {
        match *self {
            TrajCmd::Line { duration_s, .. } => duration_s,
            TrajCmd::Circle { duration_s, .. } => duration_s,
            TrajCmd::Rhombus { duration_s, .. } => duration_s,
            TrajCmd::Heart { duration_s, .. } => duration_s
        }
    }
}

impl TrajKind {
    /// Get the family for the given name, or `None` if the name is not a
    /// known family.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "line" => Some(TrajKind::Line),
            "circle" => Some(TrajKind::Circle),
            "rhombus" => Some(TrajKind::Rhombus),
            "heart" => Some(TrajKind::Heart),
            _ => None
        }
    }

    /// Get the name of this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrajKind::Line => "line",
            TrajKind::Circle => "circle",
            TrajKind::Rhombus => "rhombus",
            TrajKind::Heart => "heart"
        }
    }
}

impl FromStr for TrajPlane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xy" => Ok(TrajPlane::Xy),
            "yz" => Ok(TrajPlane::Yz),
            "xz" => Ok(TrajPlane::Xz),
            _ => Err(format!("{} is not a valid plane (xy, yz or xz)", s))
        }
    }
}

impl FromStr for PosArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();

        if parts.len() != 3 {
            return Err(format!(
                "Expected 3 comma separated values, got {}", parts.len()
            ));
        }

        let mut pos = [0f64; 3];
        for (i, part) in parts.iter().enumerate() {
            pos[i] = part
                .trim()
                .parse()
                .map_err(|e| format!("Invalid coordinate {:?}: {}", part, e))?;
        }

        Ok(PosArg(pos))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pos_arg_from_str() {
        assert_eq!(
            PosArg::from_str("0.0,0.02,0.0").unwrap(),
            PosArg([0.0, 0.02, 0.0])
        );
        assert_eq!(
            PosArg::from_str("1, -2, 3e-3").unwrap(),
            PosArg([1.0, -2.0, 0.003])
        );
        assert!(PosArg::from_str("1,2").is_err());
        assert!(PosArg::from_str("a,b,c").is_err());
    }

    #[test]
    fn test_kind_names() {
        for kind in [
            TrajKind::Line,
            TrajKind::Circle,
            TrajKind::Rhombus,
            TrajKind::Heart,
        ]
        .iter()
        {
            assert_eq!(TrajKind::from_str(kind.as_str()), Some(*kind));
        }

        assert_eq!(TrajKind::from_str("spiral"), None);
    }

    #[test]
    fn test_cmd_kind_matches_serde_tag() {
        let cmd = TrajCmd::Line {
            start_pos_m: PosArg([0.0; 3]),
            end_pos_m: PosArg([0.01, 0.0, 0.0]),
            duration_s: 2.0,
        };

        let val = serde_json::to_value(&cmd).unwrap();
        assert_eq!(val["name"].as_str(), Some(cmd.kind().as_str()));
    }
}
