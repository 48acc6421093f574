//! A single tracked-vehicle slot (§3).

use crate::lib::aoi::AoiName;
use crate::lib::geometry::Rect;

#[derive(Debug, Clone)]
pub struct Slot {
    pub id: String,
    pub bbox: Rect,
    pub last_seen_frame: i64,
    pub absent_frames: u32,
    pub active_aois: Vec<AoiName>,
}

impl Slot {
    pub fn has_aoi(&self, name: AoiName) -> bool {
        self.active_aois.contains(&name)
    }

    pub fn has_any_aoi(&self, names: &[AoiName]) -> bool {
        names.iter().any(|n| self.has_aoi(*n))
    }

    pub fn has_all_aois(&self, names: &[AoiName]) -> bool {
        names.iter().all(|n| self.has_aoi(*n))
    }
}
