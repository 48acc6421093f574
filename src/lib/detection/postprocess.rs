//! Box cleanup (§4.2): filter to recognized labels, round, sort, and drop a
//! left box that is largely covered by its right neighbor.

use crate::lib::constants::OVERLAP_MERGE_THRESHOLD;
use crate::lib::detection::RawDetection;
use crate::lib::geometry::{overlap, Rect};

/// Produces the ordered `current_cars[0..=2]` list the identity tracker
/// matches positionally against its two slots.
pub fn clean_boxes(detections: &[RawDetection]) -> Vec<Rect> {
    let mut boxes: Vec<Rect> = detections
        .iter()
        .filter(|d| d.is_target_label())
        .map(|d| d.as_rect().rounded())
        .collect();

    boxes.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    if boxes.len() == 2 && overlap(&boxes[0], &boxes[1]) > OVERLAP_MERGE_THRESHOLD {
        return vec![boxes[1]];
    }

    boxes.truncate(2);
    boxes
}
