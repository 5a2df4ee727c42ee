use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Bar palette
// ---------------------------------------------------------------------------

const BAR_HUE: f32 = 210.0;

/// One colour per histogram bar, in rank order.
///
/// All bars share a hue; the top-ranked bar is the most saturated and each
/// following bar gets lighter, so rank reads at a glance.
pub fn rank_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let span = (n.max(2) - 1) as f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / span;
            let hsl = Hsl::new(BAR_HUE, 0.70 - 0.35 * t, 0.40 + 0.30 * t);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}
