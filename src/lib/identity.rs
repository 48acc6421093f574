//! Deterministic identity fingerprints for tracked slots.
//!
//! The source derives an identity from a hash of the bounding-box
//! coordinates at first sighting. This is a stable fingerprint, not a
//! cryptographic one — collisions between genuinely distinct boxes are
//! acceptable since a fresh fingerprint is only ever compared against the
//! prior slot it might be re-sighting, never against a global set.

use sha2::{Digest, Sha256};

use crate::lib::geometry::Rect;

/// Derives an 8-character hex fingerprint from a box's rounded coordinates.
pub fn fingerprint(bbox: &Rect) -> String {
    let text = format!("{:.1}_{:.1}_{:.1}_{:.1}", bbox.x, bbox.y, bbox.w, bbox.h);
    let digest = Sha256::digest(text.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..8].to_string()
}
