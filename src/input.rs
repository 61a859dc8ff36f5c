//! Key event to command mapping

use crate::control::Command;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Quit,
}

/// Key bindings configuration - supports multiple keys per command
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub hold: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub start: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let lower = s.to_lowercase();
        let code = match lower.as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            f if f.len() > 1 && f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    tracing::warn!("Unknown key binding {:?}", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            rotate_cw: Self::parse_keys(&settings.keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&settings.keys.rotate_ccw),
            hold: Self::parse_keys(&settings.keys.hold),
            pause: Self::parse_keys(&settings.keys.pause),
            start: Self::parse_keys(&settings.keys.start),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }

    /// Bindings checked in order; the first match wins
    fn table(&self) -> [(&[KeyCode], Input); 10] {
        [
            (self.move_left.as_slice(), Input::Command(Command::MoveLeft)),
            (self.move_right.as_slice(), Input::Command(Command::MoveRight)),
            (self.soft_drop.as_slice(), Input::Command(Command::SoftDrop)),
            (self.hard_drop.as_slice(), Input::Command(Command::HardDrop)),
            (self.rotate_cw.as_slice(), Input::Command(Command::RotateCW)),
            (self.rotate_ccw.as_slice(), Input::Command(Command::RotateCCW)),
            (self.hold.as_slice(), Input::Command(Command::Hold)),
            (self.pause.as_slice(), Input::Command(Command::Pause)),
            (self.start.as_slice(), Input::Command(Command::Start)),
            (self.quit.as_slice(), Input::Quit),
        ]
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Turns key presses into inputs
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    bindings: KeyBindings,
}

impl InputHandler {
    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
        }
    }

    /// Handle a key press event
    pub fn key_down(&self, key: KeyEvent) -> Option<Input> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Input::Quit);
        }

        let code = normalize_key(key.code);
        self.bindings
            .table()
            .into_iter()
            .find(|(codes, _)| codes.contains(&code))
            .map(|(_, input)| input)
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        KeyCode::Modifier(ModifierKeyCode::RightShift) => {
            KeyCode::Modifier(ModifierKeyCode::LeftShift)
        }
        KeyCode::Modifier(ModifierKeyCode::RightControl) => {
            KeyCode::Modifier(ModifierKeyCode::LeftControl)
        }
        KeyCode::Modifier(ModifierKeyCode::RightAlt) => {
            KeyCode::Modifier(ModifierKeyCode::LeftAlt)
        }
        other => other,
    }
}
