//! Declarative joint tree and chain traversal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry3, Unit, UnitQuaternion, Vector3};
use std::collections::HashMap;

// Internal
use super::{ModelError, Pose};
use comms_if::eqpt::act::ActId;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single joint (or fixed frame) in the chain.
///
/// Each joint carries a fixed offset and orientation relative to its parent,
/// followed by a rotation of `pos_rad` about `axis`. The root and end
/// effector are plain frames whose rotation stays at zero.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Unique name of this joint.
    pub name: String,

    /// Name of the parent joint, `None` for the root.
    pub parent: Option<String>,

    /// Declared child of this joint, `None` for leaves.
    ///
    /// Recorded for completeness of the declaration, not used in traversal,
    /// which always walks parent links.
    pub child: Option<String>,

    /// Fixed translation from the parent frame to this joint's frame.
    ///
    /// Units: meters
    pub offset_m: Vector3<f64>,

    /// Fixed orientation of this joint's frame relative to the parent.
    pub orientation: UnitQuaternion<f64>,

    /// Axis the joint rotates about, expressed in the joint's own frame.
    pub axis: Unit<Vector3<f64>>,

    /// The actuator driving this joint, `None` for passive joints and frames.
    pub act_id: Option<ActId>,

    /// Current angle of the joint.
    ///
    /// Units: radians
    pub pos_rad: f64,

    /// Current angular rate of the joint.
    ///
    /// Units: radians/second
    pub vel_rads: f64,
}

/// The manipulator's joint tree.
///
/// Joints are declared root first, then parents before children. Names must
/// be unique and parents must already exist, violations are raised as
/// [`ModelError`]s at declaration time.
#[derive(Debug, Clone, Default)]
pub struct ManipModel {
    /// All declared joints by name.
    joints: HashMap<String, Joint>,

    /// Names in declaration order, for stable iteration.
    order: Vec<String>,

    /// Name of the root frame.
    root: Option<String>,

    /// Name of the end effector frame.
    end_effector: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ManipModel {
    /// Create an empty model with no joints declared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the root frame of the chain.
    ///
    /// The root is fixed in the base frame and carries no rotation.
    pub fn add_root(&mut self, name: &str, child: &str) -> Result<(), ModelError> {
        if let Some(ref root) = self.root {
            return Err(ModelError::DuplicateRoot(root.clone()));
        }
        if self.joints.contains_key(name) {
            return Err(ModelError::DuplicateName(name.into()));
        }

        self.insert(Joint {
            name: name.into(),
            parent: None,
            child: Some(child.into()),
            offset_m: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            axis: Vector3::z_axis(),
            act_id: None,
            pos_rad: 0.0,
            vel_rads: 0.0,
        });
        self.root = Some(name.into());

        Ok(())
    }

    /// Declare a joint in the chain.
    ///
    /// The parent must already be declared and `name` must be unique. An
    /// `act_id` marks the joint as actuated, each actuator may only drive one
    /// joint.
    pub fn add_joint(
        &mut self,
        name: &str,
        parent: &str,
        child: Option<&str>,
        offset_m: Vector3<f64>,
        orientation: UnitQuaternion<f64>,
        axis: Unit<Vector3<f64>>,
        act_id: Option<ActId>,
    ) -> Result<(), ModelError> {
        self.check_new(name, parent)?;

        if let Some(id) = act_id {
            if let Some(existing) = self
                .order
                .iter()
                .find(|n| self.joints[*n].act_id == Some(id))
            {
                return Err(ModelError::DuplicateActId(id, existing.clone()));
            }
        }

        self.insert(Joint {
            name: name.into(),
            parent: Some(parent.into()),
            child: child.map(|c| c.into()),
            offset_m,
            orientation,
            axis,
            act_id,
            pos_rad: 0.0,
            vel_rads: 0.0,
        });

        Ok(())
    }

    /// Declare the end effector frame.
    ///
    /// The end effector is a leaf frame rigidly attached to its parent.
    pub fn add_end_effector(
        &mut self,
        name: &str,
        parent: &str,
        offset_m: Vector3<f64>,
        orientation: UnitQuaternion<f64>,
    ) -> Result<(), ModelError> {
        if let Some(ref ee) = self.end_effector {
            return Err(ModelError::DuplicateEndEffector(ee.clone()));
        }
        self.check_new(name, parent)?;

        self.insert(Joint {
            name: name.into(),
            parent: Some(parent.into()),
            child: None,
            offset_m,
            orientation,
            axis: Vector3::z_axis(),
            act_id: None,
            pos_rad: 0.0,
            vel_rads: 0.0,
        });
        self.end_effector = Some(name.into());

        Ok(())
    }

    /// Get a reference to the named joint.
    pub fn joint(&self, name: &str) -> Result<&Joint, ModelError> {
        self.joints
            .get(name)
            .ok_or_else(|| ModelError::UnknownJoint(name.into()))
    }

    /// Get the chain of joints from the root to the named joint, root first.
    pub fn chain_to(&self, name: &str) -> Result<Vec<&Joint>, ModelError> {
        if self.root.is_none() {
            return Err(ModelError::NoRoot);
        }

        let mut joint = self.joint(name)?;
        let mut chain = vec![joint];

        // Parents are validated at declaration so the walk cannot dangle.
        while let Some(ref parent) = joint.parent {
            joint = self.joint(parent)?;
            chain.push(joint);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Compose the pose of the named joint's frame in the base frame.
    ///
    /// Walks the chain from the root, applying each joint's fixed offset and
    /// orientation followed by its current rotation about its axis.
    pub fn pose_of(&self, name: &str) -> Result<Pose, ModelError> {
        let mut iso = Isometry3::identity();

        for joint in self.chain_to(name)? {
            iso *= Isometry3::from_parts(
                joint.offset_m.into(),
                joint.orientation * UnitQuaternion::from_axis_angle(&joint.axis, joint.pos_rad),
            );
        }

        Ok(iso.into())
    }

    /// Set the state of the named joint.
    pub fn set_joint_state(
        &mut self,
        name: &str,
        pos_rad: f64,
        vel_rads: f64,
    ) -> Result<(), ModelError> {
        match self.joints.get_mut(name) {
            Some(joint) => {
                joint.pos_rad = pos_rad;
                joint.vel_rads = vel_rads;
                Ok(())
            }
            None => Err(ModelError::UnknownJoint(name.into())),
        }
    }

    /// Get the names of all actuated joints, in declaration order.
    pub fn actuated(&self) -> Vec<(String, ActId)> {
        self.order
            .iter()
            .filter_map(|n| self.joints[n].act_id.map(|id| (n.clone(), id)))
            .collect()
    }

    /// Get the current angles of the actuated joints, in declaration order.
    pub fn actuated_pos_rad(&self) -> Vec<f64> {
        self.order
            .iter()
            .filter(|n| self.joints[*n].act_id.is_some())
            .map(|n| self.joints[n].pos_rad)
            .collect()
    }

    /// Get the names of all passive joints, in declaration order.
    ///
    /// The root and end effector frames are not joints and are excluded.
    pub fn passive(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|n| {
                self.joints[*n].act_id.is_none()
                    && self.root.as_ref() != Some(*n)
                    && self.end_effector.as_ref() != Some(*n)
            })
            .cloned()
            .collect()
    }

    /// Name of the root frame, if declared.
    pub fn root_name(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Name of the end effector frame, if declared.
    pub fn end_effector_name(&self) -> Option<&str> {
        self.end_effector.as_deref()
    }

    /// Total number of declared frames, including root and end effector.
    pub fn num_frames(&self) -> usize {
        self.order.len()
    }

    /// Check that `name` is free and `parent` exists.
    fn check_new(&self, name: &str, parent: &str) -> Result<(), ModelError> {
        if self.joints.contains_key(name) {
            return Err(ModelError::DuplicateName(name.into()));
        }
        if !self.joints.contains_key(parent) {
            return Err(ModelError::DanglingReference(name.into(), parent.into()));
        }
        Ok(())
    }

    fn insert(&mut self, joint: Joint) {
        self.order.push(joint.name.clone());
        self.joints.insert(joint.name.clone(), joint);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use std::f64::consts::FRAC_PI_2;

    /// Build a simple two joint planar arm for traversal tests.
    fn two_joint_arm() -> ManipModel {
        let mut model = ManipModel::new();
        model.add_root("world", "shoulder").unwrap();
        model
            .add_joint(
                "shoulder",
                "world",
                Some("elbow"),
                Vector3::zeros(),
                UnitQuaternion::identity(),
                Vector3::z_axis(),
                Some(ActId::Joint1),
            )
            .unwrap();
        model
            .add_joint(
                "elbow",
                "shoulder",
                Some("tip"),
                Vector3::new(1.0, 0.0, 0.0),
                UnitQuaternion::identity(),
                Vector3::z_axis(),
                Some(ActId::Joint2),
            )
            .unwrap();
        model
            .add_end_effector(
                "tip",
                "elbow",
                Vector3::new(1.0, 0.0, 0.0),
                UnitQuaternion::identity(),
            )
            .unwrap();
        model
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut model = two_joint_arm();

        let result = model.add_joint(
            "elbow",
            "world",
            None,
            Vector3::zeros(),
            UnitQuaternion::identity(),
            Vector3::z_axis(),
            None,
        );

        assert!(matches!(result, Err(ModelError::DuplicateName(_))));
    }

    #[test]
    fn test_dangling_parent_rejected() {
        let mut model = two_joint_arm();

        let result = model.add_joint(
            "wrist",
            "forearm",
            None,
            Vector3::zeros(),
            UnitQuaternion::identity(),
            Vector3::z_axis(),
            None,
        );

        assert!(matches!(result, Err(ModelError::DanglingReference(_, _))));
    }

    #[test]
    fn test_duplicate_act_id_rejected() {
        let mut model = two_joint_arm();

        let result = model.add_joint(
            "wrist",
            "elbow",
            None,
            Vector3::zeros(),
            UnitQuaternion::identity(),
            Vector3::z_axis(),
            Some(ActId::Joint1),
        );

        assert!(matches!(result, Err(ModelError::DuplicateActId(_, _))));
    }

    #[test]
    fn test_chain_order() {
        let model = two_joint_arm();

        let chain = model.chain_to("tip").unwrap();
        let names: Vec<&str> = chain.iter().map(|j| j.name.as_str()).collect();

        assert_eq!(names, vec!["world", "shoulder", "elbow", "tip"]);
    }

    #[test]
    fn test_unknown_joint_rejected() {
        let model = two_joint_arm();

        assert!(matches!(
            model.chain_to("forearm"),
            Err(ModelError::UnknownJoint(_))
        ));
        assert!(matches!(
            model.joint("forearm"),
            Err(ModelError::UnknownJoint(_))
        ));
    }

    #[test]
    fn test_pose_composition() {
        let mut model = two_joint_arm();

        // Fully extended along X
        let pose = model.pose_of("tip").unwrap();
        assert!((pose.position_m - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-12);

        // Shoulder at 90 deg folds the arm along Y
        model.set_joint_state("shoulder", FRAC_PI_2, 0.0).unwrap();
        let pose = model.pose_of("tip").unwrap();
        assert!((pose.position_m - Vector3::new(0.0, 2.0, 0.0)).norm() < 1e-12);

        // Elbow at -90 deg brings the tip back over the shoulder
        model.set_joint_state("elbow", -FRAC_PI_2, 0.0).unwrap();
        let pose = model.pose_of("tip").unwrap();
        assert!((pose.position_m - Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_actuated_and_passive_listing() {
        let mut model = two_joint_arm();
        model
            .add_joint(
                "wrist",
                "elbow",
                None,
                Vector3::zeros(),
                UnitQuaternion::identity(),
                Vector3::z_axis(),
                None,
            )
            .unwrap();

        let actuated = model.actuated();
        assert_eq!(actuated.len(), 2);
        assert_eq!(actuated[0], ("shoulder".into(), ActId::Joint1));
        assert_eq!(actuated[1], ("elbow".into(), ActId::Joint2));

        assert_eq!(model.passive(), vec!["wrist".to_string()]);
    }
}
