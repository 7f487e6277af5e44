//! Splash-screen configuration: theme defaults, caller overrides, and TOML
//! loading for the bootstrap loader.
//!
//! Overrides use replace-not-merge semantics: a supplied `text`, `bar`, or
//! `icon` section replaces the corresponding built-in section wholesale rather
//! than being merged field-by-field. The same applies to TOML input, where
//! fields absent from a supplied section fall back to that section's own
//! defaults. Nothing is validated at merge time; out-of-range geometry or
//! colors surface later as rendering artifacts, not as configuration errors.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

mod color;

pub use color::Rgba;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid color: {0}")]
    Color(String),
}

/// Fully-resolved loader settings. Built once via [`SplashConfig::resolve`]
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SplashConfig {
    #[serde(default = "default_logo")]
    pub logo: PathBuf,
    #[serde(default = "default_background")]
    pub background: PathBuf,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub bar: BarConfig,
    #[serde(default)]
    pub icon: IconConfig,
}

/// Caller-supplied overrides. Each present section replaces the default
/// section at the top level.
#[derive(Debug, Clone, Default)]
pub struct SplashOverrides {
    pub logo: Option<PathBuf>,
    pub background: Option<PathBuf>,
    pub text: Option<TextConfig>,
    pub bar: Option<BarConfig>,
    pub icon: Option<IconConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextConfig {
    #[serde(default = "default_first_start")]
    pub first_start: String,
    #[serde(default = "default_downloading")]
    pub downloading: Vec<String>,
    #[serde(default = "default_compiling")]
    pub compiling: String,
    #[serde(default = "default_init")]
    pub init: String,
    #[serde(default = "default_complete")]
    pub complete: String,
    /// How often the downloading label rotates through its variants.
    #[serde(
        default = "default_rotate_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub rotate_interval: Duration,
    #[serde(default)]
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextStyle {
    #[serde(default = "default_text_color")]
    pub color: Rgba,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Path to a TTF/OTF used for the label. When unset the label is skipped.
    #[serde(default)]
    pub font: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BarConfig {
    #[serde(default = "default_bar_width")]
    pub width: f32,
    #[serde(default = "default_bar_height")]
    pub height: f32,
    #[serde(default = "default_bar_background")]
    pub background: Rgba,
    #[serde(default = "default_bar_fill")]
    pub fill: Rgba,
    #[serde(default = "default_bar_radius")]
    pub corner_radius: f32,
    #[serde(default = "default_bar_padding")]
    pub padding: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IconConfig {
    #[serde(default = "default_icon_visible")]
    pub visible: bool,
    #[serde(default = "default_icon_width")]
    pub width: f32,
    #[serde(default = "default_icon_height")]
    pub height: f32,
    #[serde(default = "default_icon_bottom")]
    pub bottom: f32,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            logo: default_logo(),
            background: default_background(),
            text: TextConfig::default(),
            bar: BarConfig::default(),
            icon: IconConfig::default(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            first_start: default_first_start(),
            downloading: default_downloading(),
            compiling: default_compiling(),
            init: default_init(),
            complete: default_complete(),
            rotate_interval: default_rotate_interval(),
            style: TextStyle::default(),
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: default_text_color(),
            font_size: default_font_size(),
            font: None,
        }
    }
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: default_bar_width(),
            height: default_bar_height(),
            background: default_bar_background(),
            fill: default_bar_fill(),
            corner_radius: default_bar_radius(),
            padding: default_bar_padding(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            visible: default_icon_visible(),
            width: default_icon_width(),
            height: default_icon_height(),
            bottom: default_icon_bottom(),
        }
    }
}

impl SplashConfig {
    /// Merges caller overrides over the built-in defaults. Present sections
    /// replace the default section wholesale.
    pub fn resolve(overrides: SplashOverrides) -> Self {
        let defaults = Self::default();
        Self {
            logo: overrides.logo.unwrap_or(defaults.logo),
            background: overrides.background.unwrap_or(defaults.background),
            text: overrides.text.unwrap_or(defaults.text),
            bar: overrides.bar.unwrap_or(defaults.bar),
            icon: overrides.icon.unwrap_or(defaults.icon),
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

fn default_logo() -> PathBuf {
    PathBuf::from("images/logo.png")
}

fn default_background() -> PathBuf {
    PathBuf::from("images/background.png")
}

fn default_first_start() -> String {
    "First launch may take a moment".to_string()
}

fn default_downloading() -> Vec<String> {
    vec![
        "Loading resources".to_string(),
        "Loading...".to_string(),
        "Please wait...".to_string(),
    ]
}

fn default_compiling() -> String {
    "Compiling".to_string()
}

fn default_init() -> String {
    "Initializing".to_string()
}

fn default_complete() -> String {
    "Starting".to_string()
}

fn default_rotate_interval() -> Duration {
    Duration::from_millis(1500)
}

fn default_text_color() -> Rgba {
    Rgba::from_rgb8(0xff, 0xff, 0xff)
}

fn default_font_size() -> f32 {
    14.0
}

fn default_bar_width() -> f32 {
    240.0
}

fn default_bar_height() -> f32 {
    25.0
}

fn default_bar_background() -> Rgba {
    Rgba::new(0.0, 0.0, 0.0, 0.5)
}

fn default_bar_fill() -> Rgba {
    Rgba::from_rgb8(0x4c, 0xaf, 0x50)
}

fn default_bar_radius() -> f32 {
    20.0
}

fn default_bar_padding() -> f32 {
    2.0
}

fn default_icon_visible() -> bool {
    true
}

fn default_icon_width() -> f32 {
    74.0
}

fn default_icon_height() -> f32 {
    30.0
}

fn default_icon_bottom() -> f32 {
    20.0
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration in milliseconds or a human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_millis(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_millis(v as u64))
        }
    }

    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_without_overrides_yields_defaults() {
        let config = SplashConfig::resolve(SplashOverrides::default());
        assert_eq!(config, SplashConfig::default());
        assert_eq!(config.bar.width, 240.0);
        assert_eq!(config.text.downloading.len(), 3);
    }

    #[test]
    fn supplied_section_replaces_default_wholesale() {
        let bar = BarConfig {
            width: 320.0,
            ..BarConfig::default()
        };
        let config = SplashConfig::resolve(SplashOverrides {
            bar: Some(bar.clone()),
            ..SplashOverrides::default()
        });
        assert_eq!(config.bar, bar);
        // Untouched sections stay at their defaults.
        assert_eq!(config.icon, IconConfig::default());
        assert_eq!(config.logo, PathBuf::from("images/logo.png"));
    }

    #[test]
    fn parses_partial_toml_sections() {
        let config = SplashConfig::from_toml_str(
            r##"
logo = "art/mark.png"

[bar]
width = 300
fill = "#ff8800"

[text]
rotate_interval = "2s"
"##,
        )
        .expect("parse config");
        assert_eq!(config.logo, PathBuf::from("art/mark.png"));
        assert_eq!(config.bar.width, 300.0);
        assert_eq!(config.bar.fill, Rgba::from_rgb8(0xff, 0x88, 0x00));
        // Fields absent from a supplied section take that section's defaults.
        assert_eq!(config.bar.height, 25.0);
        assert_eq!(config.text.rotate_interval, Duration::from_secs(2));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = SplashConfig::from_toml_str("[bar]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn duration_accepts_millis_and_strings() {
        let config =
            SplashConfig::from_toml_str("[text]\nrotate_interval = 750").expect("parse config");
        assert_eq!(config.text.rotate_interval, Duration::from_millis(750));
    }
}
