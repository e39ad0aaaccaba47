//! JSON batch files: detector output recorded frame by frame.
//!
//! ```json
//! {
//!   "coordinate_space": { "kind": "normalized" },
//!   "frames": [
//!     [
//!       { "type": "face", "face_id": 1, "bounds": [0.1, 0.1, 0.2, 0.3], "roll_angle": 4.0 },
//!       { "type": "org.iso.QRCode", "corners": [[0.5, 0.5], [0.7, 0.5], [0.7, 0.7], [0.5, 0.7]],
//!         "payload_text": "HELLO", "time": { "value": 1, "timescale": 30 } }
//!     ]
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use metadata_core::metadata::domain::face_object::FaceId;
use metadata_core::metadata::domain::metadata_object_builder::DetectionRecord;
use metadata_core::metadata::domain::object_type::FACE_TAG;
use metadata_core::shared::geometry::{CoordinateSpace, Point, Rect};
use metadata_core::shared::media_time::MediaTime;

/// Score assumed for recorded faces that carry none.
const DEFAULT_SCORE: f64 = 1.0;

#[derive(Error, Debug)]
pub enum BatchFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid batch file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpaceSpec {
    Normalized,
    Absolute { width: f64, height: f64 },
}

impl From<SpaceSpec> for CoordinateSpace {
    fn from(spec: SpaceSpec) -> Self {
        match spec {
            SpaceSpec::Normalized => CoordinateSpace::Normalized,
            SpaceSpec::Absolute { width, height } => CoordinateSpace::Absolute { width, height },
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct TimeSpec {
    pub value: i64,
    pub timescale: i32,
}

impl From<TimeSpec> for MediaTime {
    fn from(t: TimeSpec) -> Self {
        MediaTime::new(t.value, t.timescale)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordSpec {
    #[serde(rename = "type")]
    pub object_type: String,
    pub time: Option<TimeSpec>,
    pub duration: Option<TimeSpec>,
    /// `[x, y, width, height]`
    pub bounds: Option<[f64; 4]>,
    pub corners: Vec<[f64; 2]>,
    pub payload: Option<Vec<u8>>,
    pub payload_text: Option<String>,
    pub face_id: Option<u64>,
    pub score: Option<f64>,
    pub roll_angle: Option<f64>,
    pub yaw_angle: Option<f64>,
}

impl RecordSpec {
    /// Faces recorded before tracking; their ids come from a tracker.
    pub fn is_untracked_face(&self) -> bool {
        self.object_type == FACE_TAG && self.face_id.is_none()
    }

    pub fn to_record(&self) -> DetectionRecord {
        DetectionRecord {
            object_type: self.object_type.clone(),
            time: self.time.map(MediaTime::from),
            duration: self.duration.map(MediaTime::from),
            bounds: self.bounds.map(to_rect),
            corners: self.corners.iter().map(|&[x, y]| Point::new(x, y)).collect(),
            payload: self.payload_bytes(),
            face_id: self.face_id.map(FaceId),
            roll_angle: self.roll_angle,
            yaw_angle: self.yaw_angle,
        }
    }

    /// Detector confidence for tracking.
    pub fn score(&self) -> f64 {
        self.score.unwrap_or(DEFAULT_SCORE)
    }

    /// Raw bytes win over `payload_text` when both are present.
    fn payload_bytes(&self) -> Vec<u8> {
        match (&self.payload, &self.payload_text) {
            (Some(bytes), _) => bytes.clone(),
            (None, Some(text)) => text.as_bytes().to_vec(),
            (None, None) => Vec::new(),
        }
    }
}

fn to_rect([x, y, w, h]: [f64; 4]) -> Rect {
    Rect::new(x, y, w, h)
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BatchFile {
    pub coordinate_space: SpaceSpec,
    pub frames: Vec<Vec<RecordSpec>>,
}

impl BatchFile {
    pub fn parse(path: &Path, text: &str) -> Result<Self, BatchFileError> {
        serde_json::from_str(text).map_err(|source| BatchFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, BatchFileError> {
        let text = fs::read_to_string(path).map_err(|source| BatchFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }
}
