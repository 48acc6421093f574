//! Areas of interest (§4.4): three fixed spatial triggers and their
//! 5-frame latch.

use serde::{Deserialize, Serialize};

use crate::lib::constants::AOI_LATCH_FRAMES;
use crate::lib::geometry::{overlap, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AoiName {
    Left,
    Middle,
    Right,
}

impl AoiName {
    pub const ALL: [AoiName; 3] = [AoiName::Left, AoiName::Middle, AoiName::Right];

    pub fn index(&self) -> usize {
        match self {
            AoiName::Left => 0,
            AoiName::Middle => 1,
            AoiName::Right => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AoiName::Left => "Left",
            AoiName::Middle => "Middle",
            AoiName::Right => "Right",
        }
    }
}

/// The three fixed rectangles, supplied at startup (§3). Indexed
/// `0=Left, 1=Middle, 2=Right`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AoiTable {
    pub left: Rect,
    pub middle: Rect,
    pub right: Rect,
}

impl AoiTable {
    pub fn rect(&self, name: AoiName) -> &Rect {
        match name {
            AoiName::Left => &self.left,
            AoiName::Middle => &self.middle,
            AoiName::Right => &self.right,
        }
    }
}

/// Per-AOI "last active frame" bookkeeping and the 5-frame visualization
/// latch derived from it. The state machine reads `last_active_frame`
/// directly; only the visualization snapshot consumes `is_latched`.
#[derive(Debug, Clone)]
pub struct AoiLatch {
    last_active_frame: [i64; 3],
}

impl AoiLatch {
    pub fn new() -> Self {
        Self {
            last_active_frame: [i64::MIN / 2; 3],
        }
    }

    pub fn last_active_frame(&self, name: AoiName) -> i64 {
        self.last_active_frame[name.index()]
    }

    fn mark_active(&mut self, name: AoiName, current_frame: i64) {
        self.last_active_frame[name.index()] = current_frame;
    }

    pub fn is_latched(&self, name: AoiName, current_frame: i64) -> bool {
        current_frame - self.last_active_frame(name) <= AOI_LATCH_FRAMES
    }
}

impl Default for AoiLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Recomputes `active_aois` for a single slot's box and updates the latch
/// for every AOI the box overlaps at all (§4.4: "any non-zero overlap").
pub fn active_aois(bbox: &Rect, table: &AoiTable, latch: &mut AoiLatch, current_frame: i64) -> Vec<AoiName> {
    let mut active = Vec::with_capacity(3);
    for name in AoiName::ALL {
        if overlap(bbox, table.rect(name)) > 0.0 {
            active.push(name);
            latch.mark_active(name, current_frame);
        }
    }
    active
}
