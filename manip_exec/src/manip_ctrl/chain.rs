//! Declaration of the manipulator's joint chain.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};

// Internal
use crate::kin_model::{ManipModel, ModelError};
use comms_if::eqpt::act::ActId;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the chain's fixed base frame.
pub const ROOT_NAME: &str = "world";

/// Name of the end effector frame.
pub const TOOL_NAME: &str = "tool";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Declare the three limbed closed chain.
///
/// The chain is declared as a tree rooted in the base frame. Each limb's
/// proximal joint is driven by a bus actuator and carries a passive elbow.
/// The first limb continues through the platform joint to the tool, the
/// other two end at their elbows, their connection to the platform is
/// enforced by the geometric solver rather than the tree.
///
/// All frames are declared without offsets, the link geometry lives in the
/// solver's parameters. Joint angles in the model are deviations from the
/// home configuration.
pub fn build_chain() -> Result<ManipModel, ModelError> {
    let mut model = ManipModel::new();

    model.add_root(ROOT_NAME, "joint1")?;

    // Actuated proximal joints, one per limb
    model.add_joint(
        "joint1",
        ROOT_NAME,
        Some("joint4"),
        Vector3::zeros(),
        UnitQuaternion::identity(),
        Vector3::z_axis(),
        Some(ActId::Joint1),
    )?;
    model.add_joint(
        "joint2",
        ROOT_NAME,
        Some("joint5"),
        Vector3::zeros(),
        UnitQuaternion::identity(),
        Vector3::z_axis(),
        Some(ActId::Joint2),
    )?;
    model.add_joint(
        "joint3",
        ROOT_NAME,
        Some("joint6"),
        Vector3::zeros(),
        UnitQuaternion::identity(),
        Vector3::z_axis(),
        Some(ActId::Joint3),
    )?;

    // Passive elbows
    model.add_joint(
        "joint4",
        "joint1",
        Some("joint7"),
        Vector3::zeros(),
        UnitQuaternion::identity(),
        Vector3::z_axis(),
        None,
    )?;
    model.add_joint(
        "joint5",
        "joint2",
        None,
        Vector3::zeros(),
        UnitQuaternion::identity(),
        Vector3::z_axis(),
        None,
    )?;
    model.add_joint(
        "joint6",
        "joint3",
        None,
        Vector3::zeros(),
        UnitQuaternion::identity(),
        Vector3::z_axis(),
        None,
    )?;

    // Platform joint closing the first limb's serial chain onto the tool
    model.add_joint(
        "joint7",
        "joint4",
        Some(TOOL_NAME),
        Vector3::zeros(),
        UnitQuaternion::identity(),
        Vector3::z_axis(),
        None,
    )?;

    model.add_end_effector(
        TOOL_NAME,
        "joint7",
        Vector3::zeros(),
        UnitQuaternion::identity(),
    )?;

    Ok(model)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_chain_shape() {
        let model = build_chain().unwrap();

        let actuated = model.actuated();
        assert_eq!(actuated.len(), 3);
        assert_eq!(actuated[0], ("joint1".into(), ActId::Joint1));
        assert_eq!(actuated[1], ("joint2".into(), ActId::Joint2));
        assert_eq!(actuated[2], ("joint3".into(), ActId::Joint3));

        assert_eq!(
            model.passive(),
            vec![
                "joint4".to_string(),
                "joint5".to_string(),
                "joint6".to_string(),
                "joint7".to_string()
            ]
        );

        assert_eq!(model.root_name(), Some(ROOT_NAME));
        assert_eq!(model.end_effector_name(), Some(TOOL_NAME));
        assert_eq!(model.num_frames(), 9);
    }

    #[test]
    fn test_tool_chain_runs_through_first_limb() {
        let model = build_chain().unwrap();

        let chain = model.chain_to(TOOL_NAME).unwrap();
        let names: Vec<&str> = chain.iter().map(|j| j.name.as_str()).collect();

        assert_eq!(names, vec!["world", "joint1", "joint4", "joint7", "tool"]);
    }
}
