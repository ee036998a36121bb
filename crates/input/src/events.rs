use crate::keys::{Key, KeyAction, MouseButton};

/// An immutable keyboard event as received from the window callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
    /// 1.0 for press, 0.0 for release. Doubles as the axis input value.
    pub value: f32,
}

/// Mouse movement or scroll, expressed as deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub dx: f32,
    pub dy: f32,
    pub wheel: f32,
}

/// A mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseClickEvent {
    pub button: MouseButton,
    pub action: KeyAction,
    pub value: f32,
}
