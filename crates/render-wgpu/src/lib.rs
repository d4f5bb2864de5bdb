//! wgpu render backend for the entrance scene.
//!
//! Draws a ground grid and one instanced unit box per [`labwalk_render::BoxInstance`],
//! lit by a single directional light and faded into the sky with distance fog.
//!
//! # Invariants
//! - Renderer never mutates simulation state.
//! - Frame rate is independent of the simulation step.

mod camera;
mod gpu;
mod mesh;
mod shaders;

pub use camera::Projection;
pub use gpu::WgpuRenderer;
