//! Simulation kernel: avatar locomotion, camera follow, door sequence, and the
//! per-frame simulation step that drives them.
//!
//! # Invariants
//! - Every frame runs controller, then avatar physics, then camera, then the
//!   door trigger. Nothing else mutates avatar position or velocity.
//! - The step is pure with respect to its inputs: the same config and the
//!   same snapshot sequence reproduce the same state.
//! - Timers run on simulation time and can be cancelled.

pub mod avatar;
pub mod camera;
pub mod config;
pub mod controller;
pub mod gait;
pub mod layout;
pub mod sim;
pub mod trigger;

pub use avatar::Avatar;
pub use camera::CameraRig;
pub use config::{
    AvatarConfig, CameraConfig, ConfigError, ControllerConfig, DoorConfig, LayoutConfig, SimConfig,
};
pub use controller::PlayerController;
pub use gait::Gait;
pub use layout::{EntranceLayout, Prop, PropKind};
pub use sim::{SimEvent, Simulation};
pub use trigger::{DoorSequence, TriggerState};
