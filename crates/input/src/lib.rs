//! Input routing: OS callbacks to buffered events to stable per-frame state.
//!
//! Raw window callbacks only enqueue immutable event records. Once per
//! frame [`InputRouter::process_events`] drains the queues and updates
//! discrete key/button state and continuous, smoothed, named axes.
//!
//! # Invariants
//! - Callbacks never mutate key/axis state; only the drain step does.
//! - All event queues are empty after `process_events` returns.
//! - `Repeat` key actions are discarded before they enter a queue.

mod axis;
mod events;
mod keys;
mod router;

pub use axis::{Axis, AxisMapping};
pub use events::{KeyEvent, MouseClickEvent, MouseEvent};
pub use keys::{Key, KeyAction, MouseButton};
pub use router::{InputRouter, KeyState, MouseState};
