use crate::shared::geometry::Rect;
use crate::shared::media_time::MediaTime;

use super::face_object::FaceObject;
use super::machine_readable_code_object::MachineReadableCodeObject;
use super::metadata_error::MetadataError;
use super::object_type::ObjectType;

/// Attributes shared by every detected feature: when it was captured, for
/// how long, where in the picture, and what it is.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataBase {
    time: MediaTime,
    duration: MediaTime,
    bounds: Rect,
    object_type: ObjectType,
}

impl MetadataBase {
    /// An `Other` tag spelling a recognized type is stored as that type, so
    /// equal tags always compare equal.
    pub fn new(
        time: MediaTime,
        duration: MediaTime,
        bounds: Rect,
        object_type: ObjectType,
    ) -> Result<Self, MetadataError> {
        if object_type.as_str().is_empty() {
            return Err(MetadataError::EmptyType);
        }
        if !bounds.is_finite() {
            return Err(MetadataError::NonFiniteCoordinate);
        }
        let object_type = match object_type {
            ObjectType::Other(tag) => ObjectType::from(tag.as_str()),
            recognized => recognized,
        };
        Ok(Self {
            time,
            duration,
            bounds,
            object_type,
        })
    }

    /// Finite corners map to finite bounds, so no revalidation is needed.
    pub(crate) fn with_bounds(&self, bounds: Rect) -> Self {
        Self {
            bounds,
            ..self.clone()
        }
    }

    /// Capture time, or `MediaTime::INVALID` when the source has none.
    pub fn time(&self) -> MediaTime {
        self.time
    }

    pub fn duration(&self) -> MediaTime {
        self.duration
    }

    /// `Rect::ZERO`-area bounds mean the object has no spatial extent.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }
}

/// A feature whose type tag is not recognized; only the base attributes
/// are meaningful.
#[derive(Clone, Debug, PartialEq)]
pub struct OpaqueObject {
    base: MetadataBase,
}

impl OpaqueObject {
    pub fn new(base: MetadataBase) -> Result<Self, MetadataError> {
        if base.object_type().is_recognized() {
            return Err(MetadataError::TypeMismatch {
                expected: "unrecognized",
                found: base.object_type().to_string(),
            });
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &MetadataBase {
        &self.base
    }
}

/// One detected feature in one processed frame.
///
/// The variant always agrees with the base type tag: faces carry
/// `ObjectType::Face`, codes carry their symbology, and any unrecognized
/// tag is delivered as `Other` with only the base attributes. Each payload
/// type checks its tag on construction.
#[derive(Clone, Debug, PartialEq)]
pub enum MetadataObject {
    Face(FaceObject),
    MachineReadableCode(MachineReadableCodeObject),
    Other(OpaqueObject),
}

impl MetadataObject {
    pub fn base(&self) -> &MetadataBase {
        match self {
            MetadataObject::Face(face) => face.base(),
            MetadataObject::MachineReadableCode(code) => code.base(),
            MetadataObject::Other(opaque) => opaque.base(),
        }
    }

    pub fn time(&self) -> MediaTime {
        self.base().time()
    }

    pub fn duration(&self) -> MediaTime {
        self.base().duration()
    }

    pub fn bounds(&self) -> Rect {
        self.base().bounds()
    }

    pub fn object_type(&self) -> &ObjectType {
        self.base().object_type()
    }

    pub fn as_face(&self) -> Option<&FaceObject> {
        match self {
            MetadataObject::Face(face) => Some(face),
            _ => None,
        }
    }

    pub fn as_machine_readable_code(&self) -> Option<&MachineReadableCodeObject> {
        match self {
            MetadataObject::MachineReadableCode(code) => Some(code),
            _ => None,
        }
    }
}

impl From<FaceObject> for MetadataObject {
    fn from(face: FaceObject) -> Self {
        MetadataObject::Face(face)
    }
}

impl From<MachineReadableCodeObject> for MetadataObject {
    fn from(code: MachineReadableCodeObject) -> Self {
        MetadataObject::MachineReadableCode(code)
    }
}

impl From<OpaqueObject> for MetadataObject {
    fn from(opaque: OpaqueObject) -> Self {
        MetadataObject::Other(opaque)
    }
}

/// Objects in `objects` whose type tag matches `object_type`, in order.
pub fn filter_by_type<'a>(
    objects: &'a [MetadataObject],
    object_type: &'a ObjectType,
) -> impl Iterator<Item = &'a MetadataObject> + 'a {
    objects
        .iter()
        .filter(move |o| o.object_type() == object_type)
}
