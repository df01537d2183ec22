//! # Rotation Tracker
//!
//! Winner-stays-on rotation of teams through a shared playing slot.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (teams, matches, draw trackers, session)
//! - **scheduler**: The rotation state machine and its operations
//! - **calculate**: Standings and other statistics from the match log
//! - **storage**: Session snapshots and JSONL exports
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod scheduler;
pub mod storage;

pub use models::*;
pub use scheduler::{RotationError, RotationScheduler};
