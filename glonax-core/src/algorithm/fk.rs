use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

use crate::geometry::{Axis, Transform};

/// Arm joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    /// Rotates the arm about the vertical axis of the base.
    Slew = 0,
    /// First hinge, between column and boom.
    Boom = 1,
    /// Second hinge, between boom and arm.
    Arm = 2,
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Joint::Slew => write!(f, "slew"),
            Joint::Boom => write!(f, "boom"),
            Joint::Arm => write!(f, "arm"),
        }
    }
}

/// Joint angles in degrees.
///
/// Angles are not normalized, a joint can rotate indefinitely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles([f32; 3]);

impl JointAngles {
    pub fn new(slew: f32, boom: f32, arm: f32) -> Self {
        Self([slew, boom, arm])
    }

    #[inline]
    pub fn get(&self, joint: Joint) -> f32 {
        self.0[joint as usize]
    }

    /// Add a delta in degrees to the joint angle.
    #[inline]
    pub fn rotate(&mut self, joint: Joint, delta: f32) {
        self.0[joint as usize] += delta;
    }

    #[inline]
    pub fn as_array(&self) -> [f32; 3] {
        self.0
    }
}

impl std::fmt::Display for JointAngles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slew: {:.1}°; Boom: {:.1}°; Arm: {:.1}°",
            self.0[0], self.0[1], self.0[2]
        )
    }
}

/// Dimension is not a positive finite number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidDimension {
    pub name: &'static str,
    pub value: f32,
}

impl std::fmt::Display for InvalidDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dimension '{}' must be positive and finite, got {}",
            self.name, self.value
        )
    }
}

impl std::error::Error for InvalidDimension {}

/// Fixed arm dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkDimensions {
    /// Height of the base.
    pub base_height: f32,
    /// Length of the column, boom and arm links.
    pub link_lengths: [f32; 3],
    /// Radius of the hinges between links.
    pub hinge_radius: f32,
    /// Distance beyond the arm tip where the target is held.
    pub catch_offset: f32,
    /// Maximum distance between effector and target for a capture.
    pub tolerance: f32,
    /// Height of the target object.
    pub target_height: f32,
}

impl Default for LinkDimensions {
    fn default() -> Self {
        Self {
            base_height: 0.1,
            link_lengths: [1.0, 1.0, 1.0],
            hinge_radius: 0.05,
            catch_offset: 0.1,
            tolerance: 0.1,
            target_height: 0.1,
        }
    }
}

impl LinkDimensions {
    /// Validate the dimensions.
    ///
    /// This should be called once on startup, the kinematic chain does not
    /// check its inputs.
    pub fn validate(&self) -> Result<(), InvalidDimension> {
        let dimensions = [
            ("base_height", self.base_height),
            ("link_lengths[0]", self.link_lengths[0]),
            ("link_lengths[1]", self.link_lengths[1]),
            ("link_lengths[2]", self.link_lengths[2]),
            ("hinge_radius", self.hinge_radius),
            ("tolerance", self.tolerance),
            ("target_height", self.target_height),
        ];

        for (name, value) in dimensions {
            if !value.is_finite() || value <= 0.0 {
                return Err(InvalidDimension { name, value });
            }
        }

        if !self.catch_offset.is_finite() || self.catch_offset < 0.0 {
            return Err(InvalidDimension {
                name: "catch_offset",
                value: self.catch_offset,
            });
        }

        Ok(())
    }

    /// Lowest height of the target center.
    #[inline]
    pub fn target_floor(&self) -> f32 {
        self.target_height / 2.0
    }

    /// Height of the effector above the ground with all joints at zero.
    pub fn reach(&self) -> f32 {
        self.base_height
            + self.link_lengths.iter().sum::<f32>()
            + 4.0 * self.hinge_radius
            + self.catch_offset
    }
}

/// Named location along the arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Ground origin of the base.
    Base,
    /// Bottom of the column, on top of the base.
    Column,
    /// Center of the boom hinge.
    BoomPivot,
    /// Bottom of the boom.
    Boom,
    /// Center of the arm hinge.
    ArmPivot,
    /// Bottom of the arm.
    Arm,
    /// Catch point beyond the arm tip.
    Effector,
}

enum Step {
    Transform(Transform),
    Mark(Segment),
}

/// Ordered chain of rigid body transforms.
///
/// The chain is folded left to right, every operation acts in the frame
/// left by the previous ones.
#[derive(Default)]
pub struct TransformChain {
    steps: Vec<Step>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, transform: Transform) -> Self {
        self.steps.push(Step::Transform(transform));
        self
    }

    /// Record the current frame as the world pose of the segment.
    pub fn mark(mut self, segment: Segment) -> Self {
        self.steps.push(Step::Mark(segment));
        self
    }

    /// Transform operations of this chain in order.
    pub fn transforms(&self) -> impl Iterator<Item = &Transform> {
        self.steps.iter().filter_map(|step| match step {
            Step::Transform(transform) => Some(transform),
            Step::Mark(_) => None,
        })
    }

    /// Compose the chain into a single world transformation.
    pub fn world_transformation(&self) -> Matrix4<f32> {
        self.transforms()
            .fold(Matrix4::identity(), |pose, transform| {
                pose * transform.to_homogeneous()
            })
    }

    /// Compose the chain while recording every intermediate frame.
    pub fn pose(&self) -> ArmPose {
        let mut pose = Matrix4::identity();
        let mut transforms = Vec::with_capacity(self.steps.len());
        let mut segments = Vec::new();

        for step in &self.steps {
            match step {
                Step::Transform(transform) => {
                    pose = pose * transform.to_homogeneous();
                    transforms.push(pose);
                }
                Step::Mark(segment) => segments.push((*segment, pose)),
            }
        }

        ArmPose {
            transforms,
            segments,
            effector: pose.transform_point(&Point3::origin()),
        }
    }
}

/// World pose of the arm.
///
/// Derived from joint angles and dimensions, never stored between frames.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmPose {
    transforms: Vec<Matrix4<f32>>,
    segments: Vec<(Segment, Matrix4<f32>)>,
    effector: Point3<f32>,
}

impl ArmPose {
    /// Cumulative transforms from base to effector.
    #[inline]
    pub fn transforms(&self) -> &[Matrix4<f32>] {
        &self.transforms
    }

    /// World transform of a segment.
    pub fn segment(&self, segment: Segment) -> Option<&Matrix4<f32>> {
        self.segments
            .iter()
            .find(|(s, _)| *s == segment)
            .map(|(_, transform)| transform)
    }

    /// World location of a segment origin.
    pub fn segment_location(&self, segment: Segment) -> Option<Point3<f32>> {
        self.segment(segment)
            .map(|transform| transform.transform_point(&Point3::origin()))
    }

    /// All segments with their world transform.
    #[inline]
    pub fn segments(&self) -> &[(Segment, Matrix4<f32>)] {
        &self.segments
    }

    /// World location of the end effector.
    #[inline]
    pub fn effector(&self) -> Point3<f32> {
        self.effector
    }
}

/// Forward kinematics of the three joint arm.
pub struct ForwardKinematics {
    dimensions: LinkDimensions,
}

impl ForwardKinematics {
    pub fn new(dimensions: LinkDimensions) -> Self {
        Self { dimensions }
    }

    #[inline]
    pub fn dimensions(&self) -> &LinkDimensions {
        &self.dimensions
    }

    /// Build the transform chain for the joint angles.
    pub fn chain(&self, angles: &JointAngles) -> TransformChain {
        let [column, boom, arm] = self.dimensions.link_lengths;
        let hinge = self.dimensions.hinge_radius;

        TransformChain::new()
            .mark(Segment::Base)
            .then(Transform::up(self.dimensions.base_height))
            .then(Transform::rotate(Axis::Vertical, angles.get(Joint::Slew)))
            .mark(Segment::Column)
            .then(Transform::up(column))
            .then(Transform::up(hinge))
            .mark(Segment::BoomPivot)
            .then(Transform::rotate(Axis::Lateral, angles.get(Joint::Boom)))
            .then(Transform::up(hinge))
            .mark(Segment::Boom)
            .then(Transform::up(boom))
            .then(Transform::up(hinge))
            .mark(Segment::ArmPivot)
            .then(Transform::rotate(Axis::Lateral, angles.get(Joint::Arm)))
            .then(Transform::up(hinge))
            .mark(Segment::Arm)
            .then(Transform::up(arm))
            .then(Transform::up(self.dimensions.catch_offset))
            .mark(Segment::Effector)
    }

    /// World location of the end effector.
    pub fn solve(&self, angles: &JointAngles) -> Point3<f32> {
        self.chain(angles)
            .world_transformation()
            .transform_point(&Point3::origin())
    }

    /// Full arm pose for the joint angles.
    pub fn pose(&self, angles: &JointAngles) -> ArmPose {
        self.chain(angles).pose()
    }
}
