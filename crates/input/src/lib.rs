//! Input capture: keyboard, mouse-look and touch joystick events folded into
//! per-frame snapshots.
//!
//! # Invariants
//! - The simulation only ever sees an [`InputSnapshot`], never live state.
//! - Key state is level-triggered: a key is held from key-down to key-up.
//! - Look deltas are consumed exactly once, by the snapshot that reads them.

pub mod action;
pub mod joystick;
pub mod state;

pub use action::{KeyBindings, MoveAction};
pub use joystick::{DEFAULT_DEAD_ZONE, Joystick};
pub use state::{InputEvent, InputSnapshot, InputState, MouseButton};
