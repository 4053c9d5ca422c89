use nalgebra::{Matrix4, Unit, Vector3};

/// Rotation axis in the local frame of a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Normal axis, pointing up.
    Vertical,
    /// Transverse axis.
    Lateral,
}

impl Axis {
    /// Unit vector of the axis.
    pub fn unit(&self) -> Unit<Vector3<f32>> {
        match self {
            Axis::Vertical => Vector3::y_axis(),
            Axis::Lateral => Vector3::x_axis(),
        }
    }
}

/// Rigid body transform operation.
///
/// Operations are applied in the local frame established by all
/// preceding operations of a chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// Translate along the vector.
    Translate(Vector3<f32>),
    /// Rotate about the axis by an angle in degrees.
    Rotate { axis: Axis, degrees: f32 },
}

impl Transform {
    /// Translate along the local vertical axis.
    #[inline]
    pub fn up(distance: f32) -> Self {
        Transform::Translate(Vector3::new(0.0, distance, 0.0))
    }

    /// Rotate about the axis by an angle in degrees.
    #[inline]
    pub fn rotate(axis: Axis, degrees: f32) -> Self {
        Transform::Rotate { axis, degrees }
    }

    /// Homogeneous matrix of this operation.
    pub fn to_homogeneous(&self) -> Matrix4<f32> {
        match self {
            Transform::Translate(vector) => Matrix4::new_translation(vector),
            Transform::Rotate { axis, degrees } => {
                Matrix4::from_axis_angle(&axis.unit(), degrees.to_radians())
            }
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::Translate(v) => write!(f, "T({:.2}, {:.2}, {:.2})", v.x, v.y, v.z),
            Transform::Rotate { axis, degrees } => write!(f, "R({:?}, {:.1}°)", axis, degrees),
        }
    }
}
