//! Core data models for the rotation tracker.

mod draw_tracker;
mod ids;
mod match_record;
mod session;

pub use draw_tracker::*;
pub use ids::*;
pub use match_record::*;
pub use session::*;
