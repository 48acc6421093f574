/// Shared numeric constants for the tracker's state machine.

/// Consecutive absent frames after which a slot is evicted.
pub const SLOT_EVICTION_FRAMES: u32 = 6;

/// Window (in frames) an AOI stays "latched" active after its last true overlap.
pub const AOI_LATCH_FRAMES: i64 = 5;

/// Consecutive empty frames required to close out `night_pass`.
pub const NIGHT_PASS_EMPTY_FRAMES: u32 = 7;

/// Consecutive one-car frames required before `two_cars`/`2_cars_left` may resolve.
pub const ONE_CAR_RESOLVE_FRAMES: u32 = 5;

/// Overlap ratio above which the left box is discarded during cleanup, and
/// above which a new detection is considered a re-sighting of a prior slot.
pub const OVERLAP_MERGE_THRESHOLD: f32 = 0.5;
