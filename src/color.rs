use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

use crate::data::derive::{IncomeBracket, Tier};
use crate::data::model::Education;

// ---------------------------------------------------------------------------
// Fixed category colors
// ---------------------------------------------------------------------------

/// Loan-status colors: blue for "no loan", orange for "accepted".
pub const NO_LOAN: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
pub const ACCEPTED_LOAN: Color32 = Color32::from_rgb(0xff, 0x7f, 0x0e);

/// Tier colors: green / orange / blue / red, best to worst.
pub fn tier_color(tier: Tier) -> Color32 {
    match tier {
        Tier::Vip => Color32::from_rgb(0x2c, 0xa0, 0x2c),
        Tier::Core => Color32::from_rgb(0xff, 0x7f, 0x0e),
        Tier::Secondary => Color32::from_rgb(0x1f, 0x77, 0xb4),
        Tier::DoNotPursue => Color32::from_rgb(0xd6, 0x27, 0x28),
    }
}

pub fn education_color(education: Education) -> Color32 {
    match education {
        Education::Undergrad => Color32::from_rgb(0x1f, 0x77, 0xb4),
        Education::Graduate => Color32::from_rgb(0xff, 0x7f, 0x0e),
        Education::Professional => Color32::from_rgb(0x2c, 0xa0, 0x2c),
    }
}

pub fn bracket_color(bracket: IncomeBracket) -> Color32 {
    let i = IncomeBracket::ALL
        .iter()
        .position(|&b| b == bracket)
        .unwrap_or(0);
    generate_palette(IncomeBracket::ALL.len())[i]
}

// ---------------------------------------------------------------------------
// Generated palettes and colormaps
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

fn mix(a: Srgb, b: Srgb, t: f32) -> Color32 {
    let m = a.into_linear().mix(b.into_linear(), t);
    let s: Srgb = Srgb::from_linear(m);
    Color32::from_rgb(
        (s.red * 255.0) as u8,
        (s.green * 255.0) as u8,
        (s.blue * 255.0) as u8,
    )
}

/// Diverging blue → white → red map for correlation values in [-1, 1].
/// NaN renders as grey.
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::GRAY;
    }
    let v = value.clamp(-1.0, 1.0) as f32;
    let blue = Srgb::new(0.13, 0.40, 0.67);
    let white = Srgb::new(0.97, 0.97, 0.97);
    let red = Srgb::new(0.70, 0.09, 0.17);
    if v < 0.0 {
        mix(white, blue, -v)
    } else {
        mix(white, red, v)
    }
}

/// Sequential red → yellow → green map for conversion rates in [0, 1].
pub fn red_yellow_green(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::GRAY;
    }
    let v = value.clamp(0.0, 1.0) as f32;
    let red = Srgb::new(0.84, 0.19, 0.15);
    let yellow = Srgb::new(1.0, 1.0, 0.75);
    let green = Srgb::new(0.10, 0.59, 0.31);
    if v < 0.5 {
        mix(red, yellow, v * 2.0)
    } else {
        mix(yellow, green, (v - 0.5) * 2.0)
    }
}
