//! Rendering adapter: renderer-agnostic presentation of the simulation.
//!
//! # Invariants
//! - Renderers never mutate simulation state.
//! - Everything drawn derives from the simulation and the view.
//!
//! The kernel exposes plain state; this crate turns it into a list of
//! coloured boxes plus overlay state that any backend can draw.

pub mod pose;
mod renderer;
pub mod scene;

pub use pose::{BodyShape, StickmanPose, visual_origin};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{BoxInstance, DrawList, Rgba};
