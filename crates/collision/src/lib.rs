//! Collision: static axis-aligned box obstacles queried with a circle on the
//! ground plane.
//!
//! # Invariants
//! - Obstacles are immutable once added and are tested in insertion order.
//! - Queries are 2D on X/Z; the Y extent is stored but never tested.
//! - A returned push always leaves the probe at least `radius` away from the
//!   obstacle that produced it.

mod system;

pub use system::{CollisionError, CollisionSystem, Obstacle, ObstacleId, ObstacleShape, ResolveMode};
