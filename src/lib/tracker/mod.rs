//! Identity tracker (§4.3): two ordered slots matched positionally against
//! the cleaned-up detections of the current frame.

pub mod slot;

use crate::lib::constants::{OVERLAP_MERGE_THRESHOLD, SLOT_EVICTION_FRAMES};
use crate::lib::geometry::{overlap, Rect};
use crate::lib::identity::fingerprint;
use slot::Slot;

/// Per-slot eviction flags for the frame just processed, consumed by the
/// state machine's `slotN evicted` conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearedSlots {
    pub slot1: bool,
    pub slot2: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityTracker {
    pub slot1: Option<Slot>,
    pub slot2: Option<Slot>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_cars(&self) -> usize {
        self.slot1.is_some() as usize + self.slot2.is_some() as usize
    }

    pub fn reset(&mut self) {
        self.slot1 = None;
        self.slot2 = None;
    }

    /// Advances both slots by one frame given the cleaned-up `current_cars`
    /// list (at most two boxes, left-to-right). Returns which slots were
    /// just evicted (absent for `SLOT_EVICTION_FRAMES` consecutive frames).
    pub fn advance(&mut self, current_cars: &[Rect], current_frame: i64) -> ClearedSlots {
        let mut cleared = ClearedSlots::default();
        self.slot1 = Self::advance_slot(self.slot1.take(), current_cars.first(), current_frame, &mut cleared.slot1);
        self.slot2 = Self::advance_slot(self.slot2.take(), current_cars.get(1), current_frame, &mut cleared.slot2);
        cleared
    }

    fn advance_slot(prior: Option<Slot>, new_box: Option<&Rect>, current_frame: i64, cleared: &mut bool) -> Option<Slot> {
        match new_box {
            Some(bbox) => {
                let id = match &prior {
                    Some(p) if overlap(bbox, &p.bbox) > OVERLAP_MERGE_THRESHOLD => p.id.clone(),
                    _ => fingerprint(bbox),
                };
                Some(Slot {
                    id,
                    bbox: *bbox,
                    last_seen_frame: current_frame,
                    absent_frames: 0,
                    active_aois: Vec::new(),
                })
            }
            None => match prior {
                Some(mut p) => {
                    p.absent_frames += 1;
                    p.active_aois.clear();
                    if p.absent_frames >= SLOT_EVICTION_FRAMES {
                        *cleared = true;
                        None
                    } else {
                        Some(p)
                    }
                }
                None => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32) -> Rect {
        Rect::new(x, 180.0, 40.0, 80.0)
    }

    #[test]
    fn fresh_detection_gets_a_new_identity() {
        let mut tracker = IdentityTracker::new();
        tracker.advance(&[r(15.0)], 1);
        assert!(tracker.slot1.is_some());
        assert_eq!(tracker.slot1.as_ref().unwrap().absent_frames, 0);
    }

    #[test]
    fn overlapping_redetection_keeps_identity() {
        let mut tracker = IdentityTracker::new();
        tracker.advance(&[r(15.0)], 1);
        let id = tracker.slot1.as_ref().unwrap().id.clone();
        tracker.advance(&[r(17.0)], 2);
        assert_eq!(tracker.slot1.as_ref().unwrap().id, id);
    }

    #[test]
    fn non_overlapping_redetection_gets_a_new_identity() {
        let mut tracker = IdentityTracker::new();
        tracker.advance(&[r(15.0)], 1);
        let id = tracker.slot1.as_ref().unwrap().id.clone();
        tracker.advance(&[r(400.0)], 2);
        assert_ne!(tracker.slot1.as_ref().unwrap().id, id);
    }

    #[test]
    fn absent_slot_is_evicted_after_six_consecutive_misses() {
        let mut tracker = IdentityTracker::new();
        tracker.advance(&[r(15.0)], 1);
        let mut cleared = ClearedSlots::default();
        for frame in 2..=6 {
            cleared = tracker.advance(&[], frame);
            assert!(!cleared.slot1, "should not be cleared before 6 absences");
        }
        cleared = tracker.advance(&[], 7);
        assert!(cleared.slot1);
        assert!(tracker.slot1.is_none());
    }

    #[test]
    fn positional_matching_assigns_second_box_to_slot2() {
        let mut tracker = IdentityTracker::new();
        tracker.advance(&[r(15.0), r(100.0)], 1);
        assert_eq!(tracker.num_cars(), 2);
        assert_eq!(tracker.slot1.as_ref().unwrap().bbox.x, 15.0);
        assert_eq!(tracker.slot2.as_ref().unwrap().bbox.x, 100.0);
    }
}
