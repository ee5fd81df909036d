// Gradient presets
//
// Each gradient maps to a fixed style descriptor. The mapping is an
// exhaustive match so adding a gradient without a preset fails to compile.

use super::Gradient;
use std::fmt;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// From a `0xRRGGBB` literal
    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Linear interpolation between two colors, `t` in [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Resolved visual preset for a gradient choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientStyle {
    /// Top-left stop
    pub from: Rgb,
    /// Bottom-right stop
    pub to: Rgb,
    /// Primary text on top of the gradient
    pub text: Rgb,
    /// Secondary text (contact lines, headings)
    pub muted: Rgb,
}

const WHITE: Rgb = Rgb::hex(0xffffff);
const WHITE_MUTED: Rgb = Rgb::hex(0xe5e7eb);
const GRAY_800: Rgb = Rgb::hex(0x1f2937);
const GRAY_500: Rgb = Rgb::hex(0x6b7280);

impl GradientStyle {
    const fn on_color(from: u32, to: u32) -> Self {
        Self {
            from: Rgb::hex(from),
            to: Rgb::hex(to),
            text: WHITE,
            muted: WHITE_MUTED,
        }
    }

    /// Neutral gray, used when no gradient was chosen
    pub const FALLBACK: GradientStyle = GradientStyle::on_color(0x6b7280, 0x374151);

    pub fn for_gradient(gradient: Option<Gradient>) -> Self {
        let Some(gradient) = gradient else {
            return Self::FALLBACK;
        };

        match gradient {
            Gradient::Blue => Self::on_color(0x3b82f6, 0x1d4ed8),
            Gradient::Purple => Self::on_color(0xa855f7, 0x7e22ce),
            Gradient::Teal => Self::on_color(0x14b8a6, 0x0f766e),
            Gradient::Orange => Self::on_color(0xfb923c, 0xea580c),
            Gradient::Green => Self::on_color(0x22c55e, 0x15803d),
            Gradient::Dark => Self::on_color(0x111827, 0x1f2937),
            Gradient::Light => Self {
                from: Rgb::hex(0xf3f4f6),
                to: WHITE,
                text: GRAY_800,
                muted: GRAY_500,
            },
        }
    }

    /// CSS background for HTML output
    pub fn css_background(&self) -> String {
        format!("linear-gradient(135deg, {} 0%, {} 100%)", self.from, self.to)
    }

    /// Color at position `t` along the diagonal
    pub fn sample(&self, t: f32) -> Rgb {
        self.from.lerp(self.to, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_gradient_uses_fallback() {
        assert_eq!(GradientStyle::for_gradient(None), GradientStyle::FALLBACK);
    }

    #[test]
    fn test_light_gradient_uses_dark_text() {
        let style = GradientStyle::for_gradient(Some(Gradient::Light));
        assert_eq!(style.text, GRAY_800);
        let style = GradientStyle::for_gradient(Some(Gradient::Blue));
        assert_eq!(style.text, WHITE);
    }

    #[test]
    fn test_every_gradient_has_distinct_preset() {
        let mut seen = Vec::new();
        for g in Gradient::ALL {
            let style = GradientStyle::for_gradient(Some(g));
            assert!(!seen.contains(&style.from), "duplicate preset for {g}");
            seen.push(style.from);
        }
    }

    #[test]
    fn test_css_background() {
        let style = GradientStyle::for_gradient(Some(Gradient::Blue));
        assert_eq!(
            style.css_background(),
            "linear-gradient(135deg, #3b82f6 0%, #1d4ed8 100%)"
        );
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb(0, 0, 0);
        let b = Rgb(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb(100, 50, 25));
    }
}
