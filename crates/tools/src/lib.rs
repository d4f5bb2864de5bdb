//! Developer tooling: read-only simulation inspector.
//!
//! # Invariants
//! - Tools never mutate simulation state.

mod inspector;

pub use inspector::{ObstacleInfo, SimInspector, SimSummary};
