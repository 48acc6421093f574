//! Integer rectangle geometry for detection boxes and AOI triggers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An axis-aligned rectangle `(x, y, w, h)` in the detection coordinate frame.
///
/// Coordinates may arrive fractional from the detector; they are rounded to
/// one decimal place during box cleanup (§4.2) and kept as `f32` from then on
/// so overlap ratios stay precise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Rounds each coordinate to one decimal place, mirroring the
    /// `round(coord, 1)` step detections go through before cleanup.
    pub fn rounded(&self) -> Self {
        Self {
            x: round1(self.x),
            y: round1(self.y),
            w: round1(self.w),
            h: round1(self.h),
        }
    }

    fn intersection_area(&self, other: &Rect) -> f32 {
        let left = self.x.max(other.x);
        let right = (self.x + self.w).min(other.x + other.w);
        let top = self.y.max(other.y);
        let bottom = (self.y + self.h).min(other.y + other.h);
        if right <= left || bottom <= top {
            return 0.0;
        }
        (right - left) * (bottom - top)
    }
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

/// Intersection area over `a`'s own area — asymmetric on purpose. Using `a`
/// as the denominator is what makes box cleanup (§4.2) favor discarding the
/// left (less advanced) box when it is mostly covered by the right one.
pub fn overlap(a: &Rect, b: &Rect) -> f32 {
    let area = a.area();
    if area <= 0.0 {
        return 0.0;
    }
    a.intersection_area(b) / area
}
