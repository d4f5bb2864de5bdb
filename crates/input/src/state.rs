use crate::action::{KeyBindings, MoveAction, normalize_key};
use crate::joystick::Joystick;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Mouse buttons the input layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A raw event delivered by the host between frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Relative pointer motion in pixels.
    MouseMove { dx: f32, dy: f32 },
    /// Touch drag offset from the joystick origin, in pixels.
    JoystickDrag { x: f32, y: f32 },
    JoystickRelease,
    /// Window lost focus: every held key and the drag are released.
    FocusLost,
}

/// Everything one simulation step needs from the input layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Forward intent in `[-1, 1]`; opposite keys cancel.
    pub forward: f32,
    /// Strafe intent in `[-1, 1]`; positive is right.
    pub right: f32,
    /// Pointer motion accumulated while dragging since the previous snapshot.
    pub look_delta: Vec2,
    pub dragging: bool,
}

impl InputSnapshot {
    /// Snapshot holding a fixed move intent and no look motion.
    pub fn moving(forward: f32, right: f32) -> Self {
        Self {
            forward,
            right,
            ..Self::default()
        }
    }

    pub fn has_move_intent(&self) -> bool {
        self.forward != 0.0 || self.right != 0.0
    }
}

/// Live input record written by event handlers and read once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    held: BTreeSet<String>,
    dragging: bool,
    look_delta: Vec2,
    joystick: Joystick,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::KeyUp(key) => self.key_up(key),
            InputEvent::MouseDown(button) => self.mouse_down(*button),
            InputEvent::MouseUp(button) => self.mouse_up(*button),
            InputEvent::MouseMove { dx, dy } => self.mouse_moved(*dx, *dy),
            InputEvent::JoystickDrag { x, y } => self.joystick.drag(Vec2::new(*x, *y)),
            InputEvent::JoystickRelease => self.joystick.release(),
            InputEvent::FocusLost => self.release_all(),
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.held.insert(normalize_key(key));
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&normalize_key(key));
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&normalize_key(key))
    }

    pub fn mouse_down(&mut self, button: MouseButton) {
        if button == MouseButton::Left {
            self.dragging = true;
        }
    }

    pub fn mouse_up(&mut self, button: MouseButton) {
        if button == MouseButton::Left {
            self.dragging = false;
        }
    }

    /// Pointer motion only turns the view while the left button is held.
    pub fn mouse_moved(&mut self, dx: f32, dy: f32) {
        if self.dragging {
            self.look_delta += Vec2::new(dx, dy);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn joystick(&self) -> &Joystick {
        &self.joystick
    }

    pub fn joystick_mut(&mut self) -> &mut Joystick {
        &mut self.joystick
    }

    pub fn release_all(&mut self) {
        if !self.held.is_empty() || self.dragging {
            tracing::debug!(held = self.held.len(), "releasing all input");
        }
        self.held.clear();
        self.dragging = false;
        self.look_delta = Vec2::ZERO;
        self.joystick.release();
    }

    fn action_held(&self, action: MoveAction) -> bool {
        self.held
            .iter()
            .any(|key| self.bindings.action_for(key) == Some(action))
    }

    /// Take the per-frame view of the input, consuming the look delta.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
        let stick = self.joystick.delta();

        let forward = axis(
            self.action_held(MoveAction::Forward),
            self.action_held(MoveAction::Backward),
        ) - stick.y;
        let right = axis(
            self.action_held(MoveAction::StrafeRight),
            self.action_held(MoveAction::StrafeLeft),
        ) + stick.x;

        InputSnapshot {
            forward: forward.clamp(-1.0, 1.0),
            right: right.clamp(-1.0, 1.0),
            look_delta: std::mem::take(&mut self.look_delta),
            dragging: self.dragging,
        }
    }
}
