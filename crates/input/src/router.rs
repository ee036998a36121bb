use crate::axis::{Axis, AxisMapping};
use crate::events::{KeyEvent, MouseClickEvent, MouseEvent};
use crate::keys::{Key, KeyAction, MouseButton};
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

/// Discrete state of one key or mouse button.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyState {
    pub down: bool,
    /// 0.0 or 1.0, mirroring press/release.
    pub value: f32,
    pub raw_value: f32,
    /// True only during the frame the transition occurred.
    pub has_changed: bool,
}

/// Accumulated mouse movement for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub dx: f32,
    pub dy: f32,
    pub wheel: f32,
    pub has_changed: bool,
}

struct ActionBinding {
    key: Key,
    when: KeyAction,
    callback: Box<dyn FnMut()>,
}

/// Routes buffered window events into per-frame input state.
///
/// Owned by the application; passed by reference into systems. There is no
/// global input state, so routers in tests are fully isolated.
#[derive(Default)]
pub struct InputRouter {
    key_events: VecDeque<KeyEvent>,
    mouse_events: VecDeque<MouseEvent>,
    mouse_click_events: VecDeque<MouseClickEvent>,
    keys: BTreeMap<Key, KeyState>,
    mouse_buttons: BTreeMap<MouseButton, KeyState>,
    mouse: MouseState,
    axes: Vec<Axis>,
    axis_ids: BTreeMap<String, usize>,
    mappings: Vec<AxisMapping>,
    actions: Vec<ActionBinding>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with the stock axis setup: `Horizontal` on A/D, `Vertical`
    /// on W/S and `Up` on Space/LeftShift.
    pub fn with_default_bindings() -> Self {
        let mut router = Self::new();
        router.add_axis("Horizontal");
        router.add_axis("Vertical");
        router.add_axis("Up");
        router.add_axis_mapping(AxisMapping::new("Vertical", Key::W));
        router.add_axis_mapping(AxisMapping::new("Vertical", Key::S).with_scale(-1.0));
        router.add_axis_mapping(AxisMapping::new("Horizontal", Key::A).with_scale(-1.0));
        router.add_axis_mapping(AxisMapping::new("Horizontal", Key::D));
        router.add_axis_mapping(AxisMapping::new("Up", Key::Space));
        router.add_axis_mapping(AxisMapping::new("Up", Key::LeftShift).with_scale(-1.0));
        router
    }

    // --- Callback boundary ---
    //
    // These are the only entry points the window collaborator calls. They
    // enqueue and return; all state mutation happens in `process_events`.

    /// Window key callback. `Repeat` actions are discarded here so a held
    /// key cannot generate additional transitions.
    pub fn on_key(&mut self, key: Key, action: KeyAction) {
        if action == KeyAction::Repeat {
            return;
        }
        let value = if action == KeyAction::Press { 1.0 } else { 0.0 };
        self.key_events.push_back(KeyEvent { key, action, value });
    }

    /// Window cursor callback, already converted to deltas.
    pub fn on_mouse_move(&mut self, dx: f32, dy: f32) {
        self.mouse_events.push_back(MouseEvent {
            dx,
            dy,
            wheel: 0.0,
        });
    }

    /// Window scroll callback.
    pub fn on_scroll(&mut self, wheel: f32) {
        self.mouse_events.push_back(MouseEvent {
            dx: 0.0,
            dy: 0.0,
            wheel,
        });
    }

    /// Window mouse button callback.
    pub fn on_mouse_button(&mut self, button: MouseButton, action: KeyAction) {
        if action == KeyAction::Repeat {
            return;
        }
        let value = if action == KeyAction::Press { 1.0 } else { 0.0 };
        self.mouse_click_events.push_back(MouseClickEvent {
            button,
            action,
            value,
        });
    }

    // --- Registration ---

    /// Register a named axis. Duplicate names keep the first registration.
    pub fn add_axis(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.axis_ids.contains_key(&name) {
            tracing::warn!(axis = %name, "axis already registered, keeping first");
            return;
        }
        let id = self.axes.len();
        self.axis_ids.insert(name.clone(), id);
        self.axes.push(Axis {
            name,
            id,
            raw_value: 0.0,
            value: 0.0,
        });
    }

    /// Register a key-to-axis mapping. Mappings on `Key::Unknown` are
    /// rejected.
    pub fn add_axis_mapping(&mut self, mapping: AxisMapping) {
        if mapping.key == Key::Unknown {
            tracing::warn!(axis = %mapping.axis, "rejected axis mapping on Key::Unknown");
            return;
        }
        self.mappings.push(mapping);
    }

    /// Bind a callback to a key transition. Triggered synchronously, once
    /// per matching queued event, during `process_events`.
    pub fn bind_action(&mut self, key: Key, when: KeyAction, callback: impl FnMut() + 'static) {
        self.actions.push(ActionBinding {
            key,
            when,
            callback: Box::new(callback),
        });
    }

    /// Load axes and mappings from a JSON config file.
    ///
    /// A missing file is skipped silently; a malformed one is skipped with
    /// a warning. Neither is an error to the caller.
    pub fn load_config(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => {
                tracing::debug!(?path, "no input config file, skipping");
                return;
            }
        };
        let config: InputConfig = match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(?path, %err, "invalid input config, skipping");
                return;
            }
        };
        for axis in config.axes {
            self.add_axis(axis.name);
        }
        for mapping in config.mappings {
            self.add_axis_mapping(mapping);
        }
    }

    // --- Per-frame drain ---

    /// Drain all event queues and update key, mouse and axis state.
    ///
    /// Called exactly once per frame. Events enqueued by callbacks firing
    /// during the drain land in the reused queues and are processed next
    /// frame; nothing is dropped.
    pub fn process_events(&mut self, dt: f32) {
        self.process_key_events();
        self.process_mouse_events();
        self.update_axis_values(dt);
    }

    fn process_key_events(&mut self) {
        for state in self.keys.values_mut() {
            state.has_changed = false;
        }

        while let Some(event) = self.key_events.pop_front() {
            for binding in &mut self.actions {
                if binding.key == event.key && binding.when == event.action {
                    (binding.callback)();
                }
            }

            let state = self.keys.entry(event.key).or_default();
            state.has_changed = true;
            match event.action {
                KeyAction::Press => state.down = true,
                KeyAction::Release => state.down = false,
                KeyAction::Repeat => {}
            }
            state.value = event.value;
            state.raw_value = event.value;
        }
    }

    fn process_mouse_events(&mut self) {
        self.mouse = MouseState::default();
        while let Some(event) = self.mouse_events.pop_front() {
            self.mouse.has_changed = true;
            self.mouse.dx += event.dx;
            self.mouse.dy += event.dy;
            self.mouse.wheel += event.wheel;
        }

        for state in self.mouse_buttons.values_mut() {
            state.has_changed = false;
        }
        while let Some(event) = self.mouse_click_events.pop_front() {
            let state = self.mouse_buttons.entry(event.button).or_default();
            state.has_changed = true;
            state.down = event.action == KeyAction::Press;
            state.value = event.value;
            state.raw_value = event.value;
        }
    }

    /// Recompute every mapping, then rebuild each axis as the sum of its
    /// mappings' contributions.
    fn update_axis_values(&mut self, dt: f32) {
        for mapping in &mut self.mappings {
            if !self.axis_ids.contains_key(&mapping.axis) {
                tracing::warn!(axis = %mapping.axis, "axis mapping references unregistered axis");
                continue;
            }
            let key_raw = self.keys.get(&mapping.key).map_or(0.0, |s| s.raw_value);
            mapping.raw_value = mapping.sensitivity.signum() * mapping.scale * key_raw;

            // Smoothing factor is clamped so a long frame cannot overshoot
            // the target.
            let t = (mapping.sensitivity.abs() * dt).clamp(0.0, 1.0);
            mapping.value += (mapping.raw_value - mapping.value) * t;
        }

        for axis in &mut self.axes {
            axis.raw_value = 0.0;
            axis.value = 0.0;
            for mapping in &self.mappings {
                if self.axis_ids.get(&mapping.axis) == Some(&axis.id) {
                    axis.raw_value += mapping.raw_value;
                    axis.value += mapping.value;
                }
            }
        }
    }

    // --- Queries ---

    /// Smoothed value of a named axis, or 0.0 with a warning if the axis
    /// does not exist.
    pub fn axis(&self, name: &str) -> f32 {
        match self.find_axis(name) {
            Some(axis) => axis.value,
            None => {
                tracing::warn!(axis = %name, "no axis with this name");
                0.0
            }
        }
    }

    /// Instantaneous value of a named axis, or 0.0 with a warning.
    pub fn axis_raw(&self, name: &str) -> f32 {
        match self.find_axis(name) {
            Some(axis) => axis.raw_value,
            None => {
                tracing::warn!(axis = %name, "no axis with this name");
                0.0
            }
        }
    }

    fn find_axis(&self, name: &str) -> Option<&Axis> {
        let id = *self.axis_ids.get(name)?;
        self.axes.get(id)
    }

    pub fn key(&self, key: Key) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.key(key).down
    }

    pub fn mouse_button(&self, button: MouseButton) -> KeyState {
        self.mouse_buttons.get(&button).copied().unwrap_or_default()
    }

    pub fn mouse(&self) -> MouseState {
        self.mouse
    }

    /// Number of events waiting across all queues.
    pub fn pending_events(&self) -> usize {
        self.key_events.len() + self.mouse_events.len() + self.mouse_click_events.len()
    }
}

#[derive(Debug, Deserialize)]
struct InputConfig {
    #[serde(rename = "Axes", default)]
    axes: Vec<AxisDecl>,
    #[serde(rename = "AxisMappings", default)]
    mappings: Vec<AxisMapping>,
}

#[derive(Debug, Deserialize)]
struct AxisDecl {
    #[serde(rename = "Name")]
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn hold(router: &mut InputRouter, key: Key) {
        router.on_key(key, KeyAction::Press);
    }

    #[test]
    fn press_release_transitions() {
        let mut router = InputRouter::new();
        router.on_key(Key::W, KeyAction::Press);
        router.process_events(DT);
        assert!(router.key_down(Key::W));
        assert!(router.key(Key::W).has_changed);
        assert_eq!(router.key(Key::W).raw_value, 1.0);

        router.on_key(Key::W, KeyAction::Release);
        router.process_events(DT);
        assert!(!router.key_down(Key::W));
        assert!(router.key(Key::W).has_changed);
        assert_eq!(router.key(Key::W).raw_value, 0.0);
    }

    #[test]
    fn held_key_generates_no_further_transitions() {
        let mut router = InputRouter::new();
        hold(&mut router, Key::D);
        router.process_events(DT);
        assert!(router.key(Key::D).has_changed);

        // Held across several frames: the OS sends only repeats, which the
        // callback boundary drops.
        for _ in 0..5 {
            router.on_key(Key::D, KeyAction::Repeat);
            router.process_events(DT);
            assert!(router.key_down(Key::D));
            assert!(!router.key(Key::D).has_changed);
        }
    }

    #[test]
    fn queues_empty_after_processing() {
        let mut router = InputRouter::new();
        for _ in 0..10 {
            router.on_key(Key::A, KeyAction::Press);
            router.on_mouse_move(1.0, -1.0);
            router.on_mouse_button(MouseButton::Left, KeyAction::Press);
        }
        assert_eq!(router.pending_events(), 30);
        router.process_events(DT);
        assert_eq!(router.pending_events(), 0);
    }

    #[test]
    fn repeat_never_enqueues() {
        let mut router = InputRouter::new();
        router.on_key(Key::E, KeyAction::Repeat);
        router.on_mouse_button(MouseButton::Right, KeyAction::Repeat);
        assert_eq!(router.pending_events(), 0);
    }

    #[test]
    fn mouse_deltas_accumulate_within_frame() {
        let mut router = InputRouter::new();
        router.on_mouse_move(2.0, 1.0);
        router.on_mouse_move(3.0, -0.5);
        router.on_scroll(1.0);
        router.process_events(DT);
        let mouse = router.mouse();
        assert!(mouse.has_changed);
        assert_eq!(mouse.dx, 5.0);
        assert_eq!(mouse.dy, 0.5);
        assert_eq!(mouse.wheel, 1.0);

        // Next frame with no events resets the deltas.
        router.process_events(DT);
        assert_eq!(router.mouse(), MouseState::default());
    }

    #[test]
    fn opposing_mappings_cancel() {
        let mut router = InputRouter::new();
        router.add_axis("Strafe");
        router.add_axis_mapping(AxisMapping::new("Strafe", Key::Q));
        router.add_axis_mapping(AxisMapping::new("Strafe", Key::Q).with_scale(-1.0));
        hold(&mut router, Key::Q);
        router.process_events(DT);
        assert_eq!(router.axis_raw("Strafe"), 0.0);
    }

    #[test]
    fn axis_value_converges_to_raw() {
        let mut router = InputRouter::new();
        router.add_axis("Throttle");
        router.add_axis_mapping(AxisMapping::new("Throttle", Key::W));
        hold(&mut router, Key::W);

        let mut previous = 0.0;
        for _ in 0..1000 {
            router.process_events(DT);
            let value = router.axis("Throttle");
            assert!(value >= previous, "smoothing must be monotonic");
            previous = value;
        }
        assert!((router.axis("Throttle") - 1.0).abs() < 1e-4);
        assert_eq!(router.axis_raw("Throttle"), 1.0);
    }

    #[test]
    fn horizontal_axis_scenario() {
        let mut router = InputRouter::with_default_bindings();
        hold(&mut router, Key::D);
        for _ in 0..10 {
            router.process_events(DT);
        }
        assert_eq!(router.axis_raw("Horizontal"), 1.0);
        let value = router.axis("Horizontal");
        assert!(value > 0.0 && value < 1.0);
    }

    #[test]
    fn large_dt_does_not_overshoot() {
        let mut router = InputRouter::new();
        router.add_axis("Zoom");
        router.add_axis_mapping(AxisMapping::new("Zoom", Key::Z).with_sensitivity(10.0));
        hold(&mut router, Key::Z);
        router.process_events(5.0);
        assert_eq!(router.axis("Zoom"), 1.0);
    }

    #[test]
    fn unknown_axis_reads_zero() {
        let router = InputRouter::new();
        assert_eq!(router.axis("Missing"), 0.0);
        assert_eq!(router.axis_raw("Missing"), 0.0);
    }

    #[test]
    fn unknown_key_mapping_rejected() {
        let mut router = InputRouter::new();
        router.add_axis("Fire");
        router.add_axis_mapping(AxisMapping::new("Fire", Key::Unknown));
        hold(&mut router, Key::Space);
        router.process_events(DT);
        assert_eq!(router.axis_raw("Fire"), 0.0);
    }

    #[test]
    fn mapping_on_unregistered_axis_contributes_nothing() {
        let mut router = InputRouter::new();
        router.add_axis_mapping(AxisMapping::new("Ghost", Key::G));
        hold(&mut router, Key::G);
        // Must not panic; the mapping is skipped with a warning.
        router.process_events(DT);
        assert_eq!(router.axis("Ghost"), 0.0);
    }

    #[test]
    fn action_triggers_once_per_event() {
        let mut router = InputRouter::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        router.bind_action(Key::Space, KeyAction::Press, move || {
            seen.set(seen.get() + 1);
        });

        router.on_key(Key::Space, KeyAction::Press);
        router.on_key(Key::Space, KeyAction::Release);
        router.on_key(Key::Space, KeyAction::Press);
        router.process_events(DT);
        assert_eq!(count.get(), 2);

        // Polling frames without events must not re-trigger.
        router.process_events(DT);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn config_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "Axes": [{{"Name": "Horizontal"}}, {{"Name": "Vertical"}}],
                "AxisMappings": [
                    {{"Axis": "Horizontal", "Key": "D", "Sensitivity": 1.0, "Scale": 1.0}},
                    {{"Axis": "Horizontal", "Key": "A", "Sensitivity": 1.0, "Scale": -1.0}}
                ]
            }}"#
        )
        .unwrap();

        let mut router = InputRouter::new();
        router.load_config(file.path());
        hold(&mut router, Key::D);
        router.process_events(DT);
        assert_eq!(router.axis_raw("Horizontal"), 1.0);
        assert_eq!(router.axis_raw("Vertical"), 0.0);
    }

    #[test]
    fn missing_config_is_skipped() {
        let mut router = InputRouter::new();
        router.load_config("/nonexistent/input.json");
        assert_eq!(router.axis("Horizontal"), 0.0);
    }
}
