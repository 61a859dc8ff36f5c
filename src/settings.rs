//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blocktris/settings.toml (or platform equivalent)

use crate::game::Rules;
use crate::score::Gravity;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gravity and line clear timing
    pub gameplay: GameplaySettings,
    /// Where the high score lives; platform data dir when unset
    pub high_score_path: Option<PathBuf>,
}

/// Key bindings (stored as strings for easy editing)
/// Each command can have one or more keys bound to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_cw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_ccw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hold: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub start: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if let [only] = keys {
        serializer.serialize_str(only)
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

/// Visual settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Gravity and animation timing, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Fall interval at level 1
    pub base_interval_ms: u64,
    /// Interval reduction per level
    pub interval_step_ms: u64,
    /// Fastest fall interval
    pub min_interval_ms: u64,
    /// Frames a cleared row flashes before removal, 0 to skip
    pub clear_animation_steps: u32,
    /// Length of one flash frame
    pub animation_frame_ms: u64,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string(), "a".to_string()],
            move_right: vec!["Right".to_string(), "d".to_string()],
            soft_drop: vec!["Down".to_string(), "s".to_string()],
            hard_drop: vec!["Space".to_string()],
            rotate_cw: vec!["Up".to_string(), "w".to_string()],
            rotate_ccw: vec!["z".to_string()],
            hold: vec!["c".to_string(), "Shift".to_string()],
            pause: vec!["p".to_string(), "Esc".to_string()],
            start: vec!["Enter".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            base_interval_ms: 500,
            interval_step_ms: 50,
            min_interval_ms: 100,
            clear_animation_steps: 5,
            animation_frame_ms: 50,
        }
    }
}

impl GameplaySettings {
    pub fn rules(&self) -> Rules {
        Rules {
            gravity: Gravity {
                base: Duration::from_millis(self.base_interval_ms),
                step: Duration::from_millis(self.interval_step_ms),
                min: Duration::from_millis(self.min_interval_ms),
            },
            clear_animation_steps: self.clear_animation_steps,
        }
    }

    pub fn animation_frame(&self) -> Duration {
        Duration::from_millis(self.animation_frame_ms.max(1))
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blocktris", "blocktris")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or create default
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid settings file: {}", e);
            Self::default()
        })
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), String> {
        let Some(dir) = Self::config_dir() else {
            return Err("Could not determine config directory".to_string());
        };

        let Some(path) = Self::settings_path() else {
            return Err("Could not determine settings path".to_string());
        };

        // Create directory if needed
        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config dir: {}", e))?;

        let contents =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;

        fs::write(&path, contents).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}

impl VisualSettings {
    /// Get the block characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}
