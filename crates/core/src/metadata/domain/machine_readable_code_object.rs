use crate::shared::geometry::{CoordinateSpace, Point, Rect, Winding};
use crate::shared::media_time::MediaTime;

use super::metadata_error::MetadataError;
use super::metadata_object::MetadataBase;
use super::object_type::{ObjectType, Symbology};
use super::payload_decoder::decode_payload;

const MIN_CORNERS: usize = 3;

/// A detected barcode or 2D code.
///
/// Corners run counter-clockwise from the code's canonical top-left corner
/// (clockwise when the code or image is mirrored). Bounds are always the
/// axis-aligned envelope of the corners.
#[derive(Clone, Debug, PartialEq)]
pub struct MachineReadableCodeObject {
    base: MetadataBase,
    symbology: Symbology,
    corners: Vec<Point>,
    payload: Vec<u8>,
}

impl MachineReadableCodeObject {
    pub fn new(
        time: MediaTime,
        duration: MediaTime,
        symbology: Symbology,
        corners: Vec<Point>,
        payload: Vec<u8>,
    ) -> Result<Self, MetadataError> {
        if corners.len() < MIN_CORNERS {
            return Err(MetadataError::TooFewCorners {
                count: corners.len(),
            });
        }
        if !corners.iter().all(Point::is_finite) {
            return Err(MetadataError::NonFiniteCoordinate);
        }
        let bounds = Rect::enclosing(&corners);
        let base = MetadataBase::new(time, duration, bounds, ObjectType::from(symbology))?;
        Ok(Self {
            base,
            symbology,
            corners,
            payload,
        })
    }

    pub fn base(&self) -> &MetadataBase {
        &self.base
    }

    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    pub fn corners(&self) -> &[Point] {
        &self.corners
    }

    /// The canonical top-left corner of the code.
    pub fn anchor(&self) -> Point {
        self.corners[0]
    }

    /// Error-corrected payload bytes as delivered by the detector.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload rendered as text under the symbology's rules, or `None` when
    /// it has no text form. Decoded on every call; the object holds no cache.
    pub fn string_value(&self) -> Option<String> {
        decode_payload(&self.payload, self.symbology)
    }

    pub fn winding(&self) -> Winding {
        Winding::of(&self.corners)
    }

    /// The same code as seen in a horizontally mirrored image.
    ///
    /// Every corner keeps its logical identity and position in the list, so
    /// the anchor stays first while the winding direction reverses.
    pub fn mirrored(&self, space: CoordinateSpace) -> Self {
        let corners: Vec<Point> = self.corners.iter().map(|p| space.mirror_point(*p)).collect();
        let bounds = Rect::enclosing(&corners);
        Self {
            base: self.base.with_bounds(bounds),
            symbology: self.symbology,
            corners,
            payload: self.payload.clone(),
        }
    }
}
