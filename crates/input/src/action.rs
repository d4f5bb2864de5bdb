use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A locomotion intent that keys can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAction {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
}

/// Maps textual key identifiers (case-insensitive) to move actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    map: BTreeMap<String, MoveAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind("w", MoveAction::Forward);
        bindings.bind("s", MoveAction::Backward);
        bindings.bind("a", MoveAction::StrafeLeft);
        bindings.bind("d", MoveAction::StrafeRight);
        bindings.bind("arrowup", MoveAction::Forward);
        bindings.bind("arrowdown", MoveAction::Backward);
        bindings.bind("arrowleft", MoveAction::StrafeLeft);
        bindings.bind("arrowright", MoveAction::StrafeRight);
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Bind `key` to `action`, replacing any previous binding for that key.
    pub fn bind(&mut self, key: &str, action: MoveAction) {
        self.map.insert(normalize_key(key), action);
    }

    pub fn unbind(&mut self, key: &str) -> Option<MoveAction> {
        self.map.remove(&normalize_key(key))
    }

    pub fn action_for(&self, key: &str) -> Option<MoveAction> {
        self.map.get(&normalize_key(key)).copied()
    }

    /// Keys bound to `action`, in sorted order.
    pub fn keys_for(&self, action: MoveAction) -> impl Iterator<Item = &str> {
        self.map
            .iter()
            .filter(move |(_, a)| **a == action)
            .map(|(k, _)| k.as_str())
    }
}

pub(crate) fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase()
}
