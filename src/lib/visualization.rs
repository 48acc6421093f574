//! Read-only visualization surface (§6, §10.4): a point-in-time snapshot of
//! the tracker, independent of any GUI. The REST layer serializes this
//! directly; no rendering lives in this crate.

use serde::Serialize;
use utoipa::ToSchema;

use crate::lib::aoi::AoiName;
use crate::lib::geometry::Rect;
use crate::lib::state_machine::LaneTracker;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlotSnapshot {
    pub id: String,
    pub bbox: Rect,
    pub active_aois: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AoiSnapshot {
    pub name: String,
    pub latched: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Snapshot {
    pub frame: i64,
    pub state: String,
    pub total_passed: u64,
    pub slot1: Option<SlotSnapshot>,
    pub slot2: Option<SlotSnapshot>,
    pub aois: Vec<AoiSnapshot>,
}

impl Snapshot {
    pub fn capture(tracker: &LaneTracker) -> Self {
        let frame = tracker.last_processed_frame;
        let aois = AoiName::ALL
            .iter()
            .map(|&name| AoiSnapshot {
                name: name.as_str().to_string(),
                latched: tracker.latch.is_latched(name, frame),
            })
            .collect();

        Self {
            frame,
            state: tracker.state.as_str().to_string(),
            total_passed: tracker.total_passed,
            slot1: tracker.slots.slot1.as_ref().map(slot_snapshot),
            slot2: tracker.slots.slot2.as_ref().map(slot_snapshot),
            aois,
        }
    }
}

fn slot_snapshot(slot: &crate::lib::tracker::slot::Slot) -> SlotSnapshot {
    SlotSnapshot {
        id: slot.id.clone(),
        bbox: slot.bbox,
        active_aois: slot.active_aois.iter().map(|a| a.as_str().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lib::aoi::AoiTable;
    use crate::lib::detection::{DetectionRecord, RawDetection};

    fn sample_table() -> AoiTable {
        AoiTable {
            left: Rect::new(20.0, 165.0, 8.0, 150.0),
            middle: Rect::new(316.0, 165.0, 8.0, 150.0),
            right: Rect::new(612.0, 165.0, 8.0, 150.0),
        }
    }

    #[test]
    fn captures_occupied_slot_and_state() {
        let mut tracker = LaneTracker::new(sample_table());
        tracker.ingest(&DetectionRecord {
            frame: 1,
            detections: vec![RawDetection {
                label: "car".to_string(),
                bbox: [15.0, 180.0, 40.0, 80.0],
            }],
        });
        let snapshot = Snapshot::capture(&tracker);
        assert_eq!(snapshot.state, "one_car");
        assert!(snapshot.slot1.is_some());
        assert!(snapshot.slot2.is_none());
    }

    #[test]
    fn captures_empty_tracker() {
        let tracker = LaneTracker::new(sample_table());
        let snapshot = Snapshot::capture(&tracker);
        assert_eq!(snapshot.state, "zero_cars");
        assert_eq!(snapshot.total_passed, 0);
        assert!(snapshot.slot1.is_none());
    }
}
