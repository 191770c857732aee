//! Colour maps used by the charts.

use plotters::style::RGBColor;

/// Viridis anchor stops, evenly spaced over [0, 1].
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (72, 40, 120),
    (62, 73, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (110, 206, 88),
    (253, 231, 37),
];

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

/// Relative luminance above which annotations are drawn in black.
const DARK_TEXT_LUMINANCE: f64 = 0.408;

fn lerp(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> RGBColor {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Sample viridis at `t` in [0, 1].
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    lerp(VIRIDIS[index], VIRIDIS[index + 1], scaled - index as f64)
}

/// `count` viridis colours, skipping the two extremes of the map.
pub fn viridis_palette(count: usize) -> Vec<RGBColor> {
    (1..=count)
        .map(|i| viridis(i as f64 / (count + 1) as f64))
        .collect()
}

/// Diverging blue-grey-red colour for a coefficient in [-1, 1].
pub fn coolwarm(value: f64) -> RGBColor {
    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0).clamp(0.0, 1.0);
    if t <= 0.5 {
        lerp(COOL, NEUTRAL, t * 2.0)
    } else {
        lerp(NEUTRAL, WARM, (t - 0.5) * 2.0)
    }
}

/// WCAG relative luminance of an sRGB colour.
pub fn relative_luminance(color: RGBColor) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.039_28 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(color.0) + 0.7152 * linear(color.1) + 0.0722 * linear(color.2)
}

/// Black on light cells, white on dark ones.
pub fn annotation_color(background: RGBColor) -> RGBColor {
    if relative_luminance(background) > DARK_TEXT_LUMINANCE {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}
