use std::fmt;

use super::metadata_error::{Angle, MetadataError};
use super::metadata_object::MetadataBase;
use super::object_type::ObjectType;

/// Tracking identifier of a face within one continuous detection run.
///
/// Issued by the tracker: unique among faces present at the same time,
/// assigned in increasing order, and never reissued after its face leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u64);

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single detected face.
///
/// Roll and yaw are in degrees (0 = level / straight on) and are only
/// present when the detector measured them. An absent angle is not zero.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObject {
    base: MetadataBase,
    face_id: FaceId,
    roll_angle: Option<f64>,
    yaw_angle: Option<f64>,
}

impl FaceObject {
    pub fn new(
        base: MetadataBase,
        face_id: FaceId,
        roll_angle: Option<f64>,
        yaw_angle: Option<f64>,
    ) -> Result<Self, MetadataError> {
        if *base.object_type() != ObjectType::Face {
            return Err(MetadataError::TypeMismatch {
                expected: "face",
                found: base.object_type().to_string(),
            });
        }
        check_finite(Angle::Roll, roll_angle)?;
        check_finite(Angle::Yaw, yaw_angle)?;
        Ok(Self {
            base,
            face_id,
            roll_angle,
            yaw_angle,
        })
    }

    pub(crate) fn with_face_id(&self, face_id: FaceId) -> Self {
        Self {
            face_id,
            ..self.clone()
        }
    }

    pub fn base(&self) -> &MetadataBase {
        &self.base
    }

    pub fn face_id(&self) -> FaceId {
        self.face_id
    }

    pub fn roll_angle(&self) -> Option<f64> {
        self.roll_angle
    }

    pub fn yaw_angle(&self) -> Option<f64> {
        self.yaw_angle
    }

    pub fn has_roll_angle(&self) -> bool {
        self.roll_angle.is_some()
    }

    pub fn has_yaw_angle(&self) -> bool {
        self.yaw_angle.is_some()
    }

    /// Two-phase accessor: fails unless [`has_roll_angle`](Self::has_roll_angle) is true.
    pub fn try_roll_angle(&self) -> Result<f64, MetadataError> {
        self.roll_angle
            .ok_or(MetadataError::AngleUnavailable { angle: Angle::Roll })
    }

    /// Two-phase accessor: fails unless [`has_yaw_angle`](Self::has_yaw_angle) is true.
    pub fn try_yaw_angle(&self) -> Result<f64, MetadataError> {
        self.yaw_angle
            .ok_or(MetadataError::AngleUnavailable { angle: Angle::Yaw })
    }
}

pub(crate) fn check_finite(angle: Angle, value: Option<f64>) -> Result<(), MetadataError> {
    match value {
        Some(v) if !v.is_finite() => Err(MetadataError::NonFiniteAngle { angle, value: v }),
        _ => Ok(()),
    }
}
