use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Oil-recovery process being illustrated. Selects wall geometry and the
/// per-kind behavior rules.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mechanism {
    Wettability,
    Tension,
    Emulsification,
    #[default]
    General,
}

impl Mechanism {
    /// The three mechanisms shown side by side on the dashboard.
    pub const PANELS: [Mechanism; 3] = [
        Mechanism::Wettability,
        Mechanism::Tension,
        Mechanism::Emulsification,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mechanism::Wettability => "wettability",
            Mechanism::Tension => "tension",
            Mechanism::Emulsification => "emulsification",
            Mechanism::General => "general",
        }
    }

    /// Lenient parse; anything unrecognized is `General`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "wettability" => Mechanism::Wettability,
            "tension" => Mechanism::Tension,
            "emulsification" => Mechanism::Emulsification,
            _ => Mechanism::General,
        }
    }
}

impl From<String> for Mechanism {
    fn from(tag: String) -> Self {
        Mechanism::from_tag(&tag)
    }
}

impl From<Mechanism> for String {
    fn from(mechanism: Mechanism) -> Self {
        mechanism.as_str().to_string()
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 8-bit RGBA color, written as `#RRGGBB` / `#RRGGBBAA` in JSON.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigit(s.to_string()));
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
        let parsed = match hex.len() {
            3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
            6 => (byte(0), byte(2), byte(4), Ok(255)),
            8 => (byte(0), byte(2), byte(4), byte(6)),
            _ => return Err(ColorError::BadLength(s.to_string())),
        };
        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self { r, g, b, a }),
            _ => Err(ColorError::BadDigit(s.to_string())),
        }
    }

    /// CSS `rgba(...)` string for canvas fill/stroke styles.
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Packed `0xRRGGBBAA`.
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Visual and behavioral parameters for one simulation run.
///
/// Produced by the explanation collaborator and immutable for the lifetime
/// of a scene. `oil_density`, `surfactant_density` and `pore_width` are
/// carried through untouched.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(default)]
    pub mechanism: Mechanism,
    pub oil_color: Color,
    pub water_color: Color,
    pub surfactant_color: Color,
    pub rock_color: Color,
    /// 1..10
    pub flow_speed: f32,
    /// 0..1
    pub turbulence: f32,
    /// 0.1..0.9
    pub viscosity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil_density: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surfactant_density: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pore_width: Option<f32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mechanism: Mechanism::General,
            oil_color: Color::rgb(0x2F, 0x1B, 0x1B),
            water_color: Color::rgb(0xE0, 0xF7, 0xFA),
            surfactant_color: Color::rgb(0xFF, 0x57, 0x22),
            rock_color: Color::rgb(0x3E, 0x3E, 0x3E),
            flow_speed: 5.0,
            turbulence: 0.5,
            viscosity: 0.5,
            oil_density: None,
            surfactant_density: None,
            pore_width: None,
        }
    }
}

impl SimulationConfig {
    /// Copy of this config with the mechanism overridden, as each dashboard
    /// panel receives it.
    pub fn for_mechanism(&self, mechanism: Mechanism) -> Self {
        Self {
            mechanism,
            ..self.clone()
        }
    }
}
