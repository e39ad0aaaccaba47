use crate::shared::geometry::{CoordinateSpace, Point, Rect};
use crate::shared::media_time::MediaTime;
use crate::tracking::face_tracker::FaceObservation;

use super::face_object::{check_finite, FaceId, FaceObject};
use super::machine_readable_code_object::MachineReadableCodeObject;
use super::metadata_error::{Angle, MetadataError};
use super::metadata_object::{MetadataBase, MetadataObject, OpaqueObject};
use super::object_type::ObjectType;

/// One raw detector result, before validation.
///
/// Which fields matter depends on the type tag: faces read `face_id` and
/// the angles, codes read `corners` and `payload`. Code bounds are always
/// derived from the corners, so `bounds` is only consulted for other types.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionRecord {
    pub object_type: String,
    pub time: Option<MediaTime>,
    pub duration: Option<MediaTime>,
    pub bounds: Option<Rect>,
    pub corners: Vec<Point>,
    pub payload: Vec<u8>,
    pub face_id: Option<FaceId>,
    pub roll_angle: Option<f64>,
    pub yaw_angle: Option<f64>,
}

/// Turns detector records into metadata objects for one delivery batch.
///
/// The batch's coordinate regime is declared up front; every record's
/// geometry must lie inside it.
pub struct MetadataObjectBuilder {
    space: CoordinateSpace,
}

impl MetadataObjectBuilder {
    pub fn new(space: CoordinateSpace) -> Self {
        Self { space }
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn build(&self, record: &DetectionRecord) -> Result<MetadataObject, MetadataError> {
        self.try_build(record).map_err(|err| {
            log::debug!("rejected '{}' detection: {err}", record.object_type);
            err
        })
    }

    /// All-or-nothing: the first invalid record fails the whole batch.
    pub fn build_batch(
        &self,
        records: &[DetectionRecord],
    ) -> Result<Vec<MetadataObject>, MetadataError> {
        records.iter().map(|r| self.build(r)).collect()
    }

    /// Validates a face record that still needs an id from a tracker.
    ///
    /// Geometry and angles are checked as for [`build`](Self::build); the
    /// record's `face_id` is ignored.
    pub fn build_observation(
        &self,
        record: &DetectionRecord,
        score: f64,
    ) -> Result<FaceObservation, MetadataError> {
        self.try_build_observation(record, score).map_err(|err| {
            log::debug!("rejected untracked '{}' detection: {err}", record.object_type);
            err
        })
    }

    fn try_build_observation(
        &self,
        record: &DetectionRecord,
        score: f64,
    ) -> Result<FaceObservation, MetadataError> {
        if !ObjectType::from(record.object_type.as_str()).is_face() {
            return Err(MetadataError::TypeMismatch {
                expected: "face",
                found: record.object_type.clone(),
            });
        }
        let bounds = self.checked_bounds(record.bounds)?;
        check_finite(Angle::Roll, record.roll_angle)?;
        check_finite(Angle::Yaw, record.yaw_angle)?;
        Ok(FaceObservation {
            bounds,
            score,
            time: record.time.unwrap_or(MediaTime::INVALID),
            duration: record.duration.unwrap_or(MediaTime::INVALID),
            roll_angle: record.roll_angle,
            yaw_angle: record.yaw_angle,
        })
    }

    fn try_build(&self, record: &DetectionRecord) -> Result<MetadataObject, MetadataError> {
        if record.object_type.is_empty() {
            return Err(MetadataError::EmptyType);
        }
        let object_type = ObjectType::from(record.object_type.as_str());
        let time = record.time.unwrap_or(MediaTime::INVALID);
        let duration = record.duration.unwrap_or(MediaTime::INVALID);

        match object_type {
            ObjectType::MachineReadableCode(symbology) => {
                self.check_points(&record.corners)?;
                let code = MachineReadableCodeObject::new(
                    time,
                    duration,
                    symbology,
                    record.corners.clone(),
                    record.payload.clone(),
                )?;
                Ok(code.into())
            }
            ObjectType::Face => {
                let face_id = record.face_id.ok_or(MetadataError::MissingFaceId)?;
                let bounds = self.checked_bounds(record.bounds)?;
                let base = MetadataBase::new(time, duration, bounds, ObjectType::Face)?;
                let face = FaceObject::new(base, face_id, record.roll_angle, record.yaw_angle)?;
                Ok(face.into())
            }
            other @ ObjectType::Other(_) => {
                let bounds = self.checked_bounds(record.bounds)?;
                let base = MetadataBase::new(time, duration, bounds, other)?;
                Ok(OpaqueObject::new(base)?.into())
            }
        }
    }

    fn check_points(&self, points: &[Point]) -> Result<(), MetadataError> {
        if !points.iter().all(Point::is_finite) {
            return Err(MetadataError::NonFiniteCoordinate);
        }
        if !points.iter().all(|p| self.space.contains_point(*p)) {
            return Err(MetadataError::OutOfRange);
        }
        Ok(())
    }

    /// Missing bounds become `Rect::ZERO` ("no bounds").
    fn checked_bounds(&self, bounds: Option<Rect>) -> Result<Rect, MetadataError> {
        let Some(bounds) = bounds else {
            return Ok(Rect::ZERO);
        };
        if !bounds.is_finite() {
            return Err(MetadataError::NonFiniteCoordinate);
        }
        if !self.space.contains_rect(&bounds) {
            return Err(MetadataError::OutOfRange);
        }
        Ok(bounds)
    }
}
