//! Shared color palette

use serde::{Deserialize, Serialize};

/// RGBA color with 0-1 float channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build from a 0xRRGGBB literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// HSL -> RGB (hue in degrees, saturation/lightness 0-1)
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self::rgb(r + m, g + m, b + m)
    }

    /// Linear blend toward `other` (t = 0 keeps self)
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// CSS `rgba(...)` string for the canvas fill style
    pub fn to_css(&self) -> String {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({}, {}, {}, {:.3})",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }
}

pub const BACKGROUND: Color = Color::hex(0x1a1025);
pub const SURFACE: Color = Color::hex(0x2d1b3d);
pub const TEXT: Color = Color::hex(0xfdf2f8);
pub const MUTED: Color = Color::hex(0x9d8ba7);
pub const PINK: Color = Color::hex(0xff6fa8);
pub const ROSE: Color = Color::hex(0xff4f79);
pub const PEACH: Color = Color::hex(0xffb38a);
pub const GOLD: Color = Color::hex(0xffd166);
pub const MINT: Color = Color::hex(0x7ee8c4);
pub const SKY: Color = Color::hex(0x74c0fc);
pub const LILAC: Color = Color::hex(0xb197fc);
pub const DANGER: Color = Color::hex(0xff3b3b);

/// Row colors for brick/stack style games
pub const ROWS: [Color; 6] = [ROSE, PINK, PEACH, GOLD, MINT, SKY];

/// Lane colors for the rhythm game
pub const LANES: [Color; 4] = [PINK, GOLD, MINT, SKY];

/// Warm-pink hue band for default particle colors (degrees)
pub const WARM_PINK_HUE: std::ops::Range<f32> = 330.0..350.0;

/// Color for row `i`, cycling through `ROWS`
pub fn row_color(i: usize) -> Color {
    ROWS[i % ROWS.len()]
}
