//! Shared types and utilities for the labwalk workspace.

pub mod math;
pub mod types;

pub use math::{damp, horizontal, horizontal_len, safe_normalize_xz};
pub use types::Transform;
