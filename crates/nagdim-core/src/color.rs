//! Dim color derivation.
//!
//! The dim text color sits partway between a profile's background and
//! foreground, so dimmed lines stay legible on any theme. Derivation is pure
//! and never fails: anything missing or malformed falls back to a fixed
//! literal.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// How far from background toward foreground (0.0 = invisible, 1.0 = full
/// brightness).
pub const DIM_FACTOR: f64 = 0.25;

/// Highlight parameter used when either profile color is unavailable.
pub const FALLBACK_DIM_PARAM: &str = "{#555555,}";

/// An RGB color with 0-255 channels. The host reports channels as floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel, 0-255.
    pub red: f64,
    /// Green channel, 0-255.
    pub green: f64,
    /// Blue channel, 0-255.
    pub blue: f64,
}

impl Rgb {
    /// Construct from channel values.
    #[must_use]
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Parse a host color value, returning `None` for anything malformed
    /// (missing channel, non-numeric channel, non-object).
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let channel = |name: &str| obj.get(name).and_then(Value::as_f64);
        Some(Self {
            red: channel("red")?,
            green: channel("green")?,
            blue: channel("blue")?,
        })
    }
}

/// Deserialize an optional host color leniently: absent, null, or malformed
/// values all become `None` instead of failing the whole profile parse.
pub(crate) fn lenient_color<'de, D>(deserializer: D) -> Result<Option<Rgb>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Rgb::from_value))
}

/// Derive the highlight parameter for dim text.
///
/// Each channel is `clamp(round(bg + (fg - bg) * factor), 0, 255)`, and the
/// result is serialized as `{#rrggbb,}` — the host's highlight markup with a
/// text color and no background color.
#[must_use]
pub fn dim_parameter(bg: Option<Rgb>, fg: Option<Rgb>, factor: f64) -> String {
    let (Some(bg), Some(fg)) = (bg, fg) else {
        return FALLBACK_DIM_PARAM.to_string();
    };
    let mix = |b: f64, f: f64| (b + (f - b) * factor).round().clamp(0.0, 255.0) as u8;
    format!(
        "{{#{:02x}{:02x}{:02x},}}",
        mix(bg.red, fg.red),
        mix(bg.green, fg.green),
        mix(bg.blue, fg.blue)
    )
}
