pub mod aoi;
pub mod constants;
pub mod detection;
pub mod emitter;
pub mod geometry;
pub mod identity;
pub mod state_machine;
pub mod tracker;
pub mod visualization;
