//! Per-tick keyboard and mouse state
//!
//! The host feeds raw [`InputEvent`]s; [`Input::begin_tick`] folds them into
//! held durations. A key `was_pressed` exactly on the tick its held time
//! goes from 0 to 1, and the state stays frozen for the rest of the tick.

use std::collections::{BTreeMap, HashMap};

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    D,
    W,
    S,
    J,
    K,
    R,
    F,
    Digit(u8),
    Shift,
    Tab,
    Escape,
    F1,
    F2,
    F4,
    F5,
}

impl Key {
    /// Parse the names used by input scripts ("a", "shift", "f5", "3", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let key = match lower.as_str() {
            "a" => Key::A,
            "d" => Key::D,
            "w" => Key::W,
            "s" => Key::S,
            "j" => Key::J,
            "k" => Key::K,
            "r" => Key::R,
            "f" => Key::F,
            "shift" => Key::Shift,
            "tab" => Key::Tab,
            "escape" | "esc" => Key::Escape,
            "f1" => Key::F1,
            "f2" => Key::F2,
            "f4" => Key::F4,
            "f5" => Key::F5,
            digit if digit.len() == 1 => {
                let d = digit.chars().next()?.to_digit(10)?;
                Key::Digit(d as u8)
            }
            _ => return None,
        };
        Some(key)
    }
}

/// Mouse buttons the editor uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

/// Raw host event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Cursor position in screen pixels
    MouseMove { x: i32, y: i32 },
}

/// Frozen input state for one tick
#[derive(Debug, Clone, Default)]
pub struct Input {
    down: HashMap<Key, bool>,
    held: HashMap<Key, u32>,
    mouse_down: HashMap<MouseButton, bool>,
    mouse_held: HashMap<MouseButton, u32>,
    /// Cursor position in screen pixels
    pub mouse_pos: IVec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain this tick's host events and advance held durations
    pub fn begin_tick(&mut self, events: &[InputEvent]) {
        for event in events {
            match *event {
                InputEvent::KeyDown(key) => {
                    self.down.insert(key, true);
                }
                InputEvent::KeyUp(key) => {
                    self.down.insert(key, false);
                }
                InputEvent::MouseDown(button) => {
                    self.mouse_down.insert(button, true);
                }
                InputEvent::MouseUp(button) => {
                    self.mouse_down.insert(button, false);
                }
                InputEvent::MouseMove { x, y } => self.mouse_pos = IVec2::new(x, y),
            }
        }

        for (key, is_down) in &self.down {
            let held = self.held.entry(*key).or_insert(0);
            *held = if *is_down { held.saturating_add(1) } else { 0 };
        }
        for (button, is_down) in &self.mouse_down {
            let held = self.mouse_held.entry(*button).or_insert(0);
            *held = if *is_down { held.saturating_add(1) } else { 0 };
        }
    }

    /// Ticks the key has been held, 0 if up
    pub fn time_held(&self, key: Key) -> u32 {
        self.held.get(&key).copied().unwrap_or(0)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.time_held(key) > 0
    }

    /// True only on the first tick of a press
    pub fn was_pressed(&self, key: Key) -> bool {
        self.time_held(key) == 1
    }

    pub fn mouse_time_held(&self, button: MouseButton) -> u32 {
        self.mouse_held.get(&button).copied().unwrap_or(0)
    }

    pub fn mouse_was_pressed(&self, button: MouseButton) -> bool {
        self.mouse_time_held(button) == 1
    }

    /// Horizontal movement axis from A/D: -1, 0 or 1
    pub fn keyboard_x(&self) -> i32 {
        let mut x = 0;
        if self.is_held(Key::A) {
            x -= 1;
        }
        if self.is_held(Key::D) {
            x += 1;
        }
        x
    }

    /// The digit key pressed this tick, if any
    pub fn digit_pressed(&self) -> Option<u8> {
        (0..=9).find(|&d| self.was_pressed(Key::Digit(d)))
    }
}

/// Input events keyed by the tick they fire on, read from a script file
///
/// One event per line: `<tick> down|up <key>`, `<tick> press|release
/// left|right`, or `<tick> move <x> <y>`. Blank lines and `#` comments are
/// ignored; malformed lines are logged and skipped.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    events: BTreeMap<u64, Vec<InputEvent>>,
}

impl InputScript {
    pub fn parse(text: &str) -> Self {
        let mut events: BTreeMap<u64, Vec<InputEvent>> = BTreeMap::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match Self::parse_line(line) {
                Some((tick, event)) => events.entry(tick).or_default().push(event),
                None => log::warn!("script line {}: cannot parse `{}`", index + 1, line),
            }
        }
        Self { events }
    }

    fn parse_line(line: &str) -> Option<(u64, InputEvent)> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let tick = words.first()?.parse().ok()?;
        let button = |name: &str| match name {
            "left" => Some(MouseButton::Left),
            "right" => Some(MouseButton::Right),
            _ => None,
        };
        let event = match words.get(1..)? {
            ["down", key] => InputEvent::KeyDown(Key::from_name(*key)?),
            ["up", key] => InputEvent::KeyUp(Key::from_name(*key)?),
            ["press", b] => InputEvent::MouseDown(button(*b)?),
            ["release", b] => InputEvent::MouseUp(button(*b)?),
            ["move", x, y] => InputEvent::MouseMove {
                x: x.parse().ok()?,
                y: y.parse().ok()?,
            },
            _ => return None,
        };
        Some((tick, event))
    }

    /// Events scheduled for `tick`
    pub fn events_at(&self, tick: u64) -> &[InputEvent] {
        self.events.get(&tick).map_or(&[], Vec::as_slice)
    }

    /// Last tick with an event
    pub fn last_tick(&self) -> Option<u64> {
        self.events.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_parsing() {
        let script = InputScript::parse(
            "# walk right, then jump\n\
             1 down d\n\
             1 move 10 20\n\
             30 down w\n\
             31 up w\n\
             32 press left\n\
             40 hop w\n\
             x down d\n",
        );
        assert_eq!(
            script.events_at(1),
            &[
                InputEvent::KeyDown(Key::D),
                InputEvent::MouseMove { x: 10, y: 20 }
            ]
        );
        assert_eq!(script.events_at(32), &[InputEvent::MouseDown(MouseButton::Left)]);
        assert!(script.events_at(40).is_empty());
        assert_eq!(script.last_tick(), Some(32));
    }

    #[test]
    fn test_press_is_edge_triggered() {
        let mut input = Input::new();
        input.begin_tick(&[InputEvent::KeyDown(Key::W)]);
        assert!(input.was_pressed(Key::W));
        assert_eq!(input.time_held(Key::W), 1);

        input.begin_tick(&[]);
        assert!(!input.was_pressed(Key::W));
        assert!(input.is_held(Key::W));
        assert_eq!(input.time_held(Key::W), 2);

        input.begin_tick(&[InputEvent::KeyUp(Key::W)]);
        assert!(!input.is_held(Key::W));
        input.begin_tick(&[InputEvent::KeyDown(Key::W)]);
        assert!(input.was_pressed(Key::W));
    }

    #[test]
    fn test_keyboard_axis_cancels() {
        let mut input = Input::new();
        input.begin_tick(&[InputEvent::KeyDown(Key::A)]);
        assert_eq!(input.keyboard_x(), -1);
        input.begin_tick(&[InputEvent::KeyDown(Key::D)]);
        assert_eq!(input.keyboard_x(), 0);
        input.begin_tick(&[InputEvent::KeyUp(Key::A)]);
        assert_eq!(input.keyboard_x(), 1);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Shift"), Some(Key::Shift));
        assert_eq!(Key::from_name("7"), Some(Key::Digit(7)));
        assert_eq!(Key::from_name("f5"), Some(Key::F5));
        assert_eq!(Key::from_name("q"), None);
    }

    #[test]
    fn test_mouse_edges_and_position() {
        let mut input = Input::new();
        input.begin_tick(&[
            InputEvent::MouseMove { x: 40, y: 12 },
            InputEvent::MouseDown(MouseButton::Left),
        ]);
        assert!(input.mouse_was_pressed(MouseButton::Left));
        assert_eq!(input.mouse_pos, IVec2::new(40, 12));
        input.begin_tick(&[]);
        assert!(!input.mouse_was_pressed(MouseButton::Left));
    }
}
