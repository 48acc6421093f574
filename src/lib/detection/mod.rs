//! Detection intake: parsing one newline-delimited frame record at a time.

pub mod postprocess;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lib::geometry::Rect;

/// The two labels the tracker cares about; anything else is ignored during
/// box cleanup (§4.2).
pub const TARGET_LABELS: [&str; 2] = ["car", "Service_car"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawDetection {
    pub label: String,
    pub bbox: [f32; 4],
}

impl RawDetection {
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.bbox[0], self.bbox[1], self.bbox[2], self.bbox[3])
    }

    pub fn is_target_label(&self) -> bool {
        TARGET_LABELS.contains(&self.label.as_str())
    }
}

/// One inbound frame record: `{"frame": <uint>, "detections": [...]}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionRecord {
    pub frame: i64,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// Raw JSON shape where `frame` may be absent — used only to detect and
/// silently drop records missing that field (§4.1), rather than failing.
#[derive(Debug, Deserialize)]
struct LooseRecord {
    frame: Option<i64>,
    #[serde(default)]
    detections: Vec<RawDetection>,
}

#[derive(Debug)]
pub enum IntakeError {
    Decode(serde_json::Error),
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeError::Decode(err) => write!(f, "malformed detection record: {}", err),
        }
    }
}

impl std::error::Error for IntakeError {}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        IntakeError::Decode(err)
    }
}

/// Parses one line of the inbound stream into a `DetectionRecord`.
///
/// Returns `Ok(None)` for a structurally valid record that is missing
/// `frame` (dropped silently per §4.1, not treated as an error) and blank
/// lines (a producer may emit a bare newline as a keepalive).
pub fn parse_line(line: &str) -> Result<Option<DetectionRecord>, IntakeError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let loose: LooseRecord = serde_json::from_str(trimmed)?;
    Ok(loose.frame.map(|frame| DetectionRecord {
        frame,
        detections: loose.detections,
    }))
}
