use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::ConfigError;

/// Straight-alpha RGBA color, components in `0.0..=1.0`.
///
/// Parses the forms the theme files use: `#rgb`, `#rrggbb`, `#rrggbbaa`, and
/// `rgba(r, g, b, a)` with byte channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            1.0,
        )
    }

    /// Channels as bytes, alpha included.
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }
}

impl FromStr for Rgba {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ConfigError::Color(raw.to_string()));
        }
        if let Some(body) = trimmed
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgba_call(body).ok_or_else(|| ConfigError::Color(raw.to_string()));
        }
        Err(ConfigError::Color(raw.to_string()))
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let expand = |nibble: u8| nibble << 4 | nibble;
    match hex.len() {
        3 => {
            let value = u16::from_str_radix(hex, 16).ok()?;
            Some(Rgba::from_rgb8(
                expand((value >> 8) as u8 & 0xf),
                expand((value >> 4) as u8 & 0xf),
                expand(value as u8 & 0xf),
            ))
        }
        6 => {
            let value = u32::from_str_radix(hex, 16).ok()?;
            Some(Rgba::from_rgb8(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            ))
        }
        8 => {
            let value = u32::from_str_radix(hex, 16).ok()?;
            let mut color = Rgba::from_rgb8(
                (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
            );
            color.a = (value & 0xff) as f32 / 255.0;
            Some(color)
        }
        _ => None,
    }
}

fn parse_rgba_call(body: &str) -> Option<Rgba> {
    let mut parts = body.split(',').map(str::trim);
    let r = parts.next()?.parse::<f32>().ok()?;
    let g = parts.next()?.parse::<f32>().ok()?;
    let b = parts.next()?.parse::<f32>().ok()?;
    let a = parts.next()?.parse::<f32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgba::new(r / 255.0, g / 255.0, b / 255.0, a))
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

impl Serialize for Rgba {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba::from_rgb8(255, 255, 255));
        assert_eq!(
            "#4CAF50".parse::<Rgba>().unwrap(),
            Rgba::from_rgb8(0x4c, 0xaf, 0x50)
        );
        let with_alpha = "#00000080".parse::<Rgba>().unwrap();
        assert!((with_alpha.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn parses_rgba_call() {
        let color = "rgba(0, 0, 0, 0.5)".parse::<Rgba>().unwrap();
        assert_eq!(color, Rgba::new(0.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn rejects_garbage() {
        assert!("blue".parse::<Rgba>().is_err());
        assert!("#12345".parse::<Rgba>().is_err());
        assert!("rgba(1,2,3)".parse::<Rgba>().is_err());
    }

    #[test]
    fn round_trips_through_display() {
        let color = Rgba::from_rgb8(0x4c, 0xaf, 0x50);
        assert_eq!(color.to_string().parse::<Rgba>().unwrap(), color);
    }
}
