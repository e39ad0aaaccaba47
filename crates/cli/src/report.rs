use serde::Serialize;

use metadata_core::metadata::domain::metadata_object::MetadataObject;
use metadata_core::shared::geometry::Winding;

/// Flattened, serializable view of one metadata object.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ObjectReport {
    pub frame: usize,
    #[serde(rename = "type")]
    pub object_type: String,
    pub time_seconds: Option<f64>,
    pub duration_seconds: Option<f64>,
    /// `[x, y, width, height]`; absent when the object has no bounds.
    pub bounds: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corners: Option<Vec<[f64; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winding: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

impl ObjectReport {
    pub fn new(frame: usize, object: &MetadataObject) -> Self {
        let bounds = object.bounds();
        let mut report = Self {
            frame,
            object_type: object.object_type().to_string(),
            time_seconds: object.time().as_secs_f64(),
            duration_seconds: object.duration().as_secs_f64(),
            bounds: (!bounds.is_empty()).then_some([
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
            ]),
            face_id: None,
            roll_angle: None,
            yaw_angle: None,
            corners: None,
            winding: None,
            string_value: None,
        };
        match object {
            MetadataObject::Face(face) => {
                report.face_id = Some(face.face_id().0);
                report.roll_angle = face.roll_angle();
                report.yaw_angle = face.yaw_angle();
            }
            MetadataObject::MachineReadableCode(code) => {
                report.corners = Some(code.corners().iter().map(|p| [p.x, p.y]).collect());
                report.winding = Some(winding_name(code.winding()));
                report.string_value = code.string_value();
            }
            MetadataObject::Other(_) => {}
        }
        report
    }

    pub fn to_line(&self) -> String {
        let mut line = format!("[frame {}] {}", self.frame, self.object_type);
        match self.bounds {
            Some([x, y, w, h]) => line.push_str(&format!(" bounds=({x}, {y}, {w}, {h})")),
            None => line.push_str(" bounds=none"),
        }
        if let Some(t) = self.time_seconds {
            line.push_str(&format!(" t={t:.3}s"));
        }
        if let Some(id) = self.face_id {
            line.push_str(&format!(" id={id}"));
            line.push_str(&format!(" roll={}", angle_text(self.roll_angle)));
            line.push_str(&format!(" yaw={}", angle_text(self.yaw_angle)));
        }
        if let Some(winding) = self.winding {
            line.push_str(&format!(" winding={winding}"));
            match &self.string_value {
                Some(text) => line.push_str(&format!(" value={text:?}")),
                None => line.push_str(" value=<binary>"),
            }
        }
        line
    }
}

fn angle_text(angle: Option<f64>) -> String {
    angle.map_or_else(|| "-".to_string(), |a| format!("{a:.1}"))
}

fn winding_name(winding: Winding) -> &'static str {
    match winding {
        Winding::CounterClockwise => "ccw",
        Winding::Clockwise => "cw",
        Winding::Degenerate => "degenerate",
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct InspectionReport {
    pub frames: usize,
    pub objects: Vec<ObjectReport>,
    pub rejected: usize,
    pub faces_issued: u64,
}

impl InspectionReport {
    pub fn summary(&self) -> String {
        format!(
            "{} objects in {} frames ({} rejected, {} face ids issued by tracker)",
            self.objects.len(),
            self.frames,
            self.rejected,
            self.faces_issued
        )
    }
}
