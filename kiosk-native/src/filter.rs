//! Photo filters applied to captured frames before they go on the strip.

use image::{Rgba, RgbaImage};

use crate::style::FilterKind;

/// Contrast factor the default layout adds on top of the greyscale filter
pub const GREYSCALE_CONTRAST: f32 = 1.5;

/// Return a filtered copy of `image`. `FilterKind::None` is a plain copy.
pub fn apply_filter(image: &RgbaImage, kind: FilterKind) -> RgbaImage {
    let mut out = image.clone();
    let map: fn([f32; 3]) -> [f32; 3] = match kind {
        FilterKind::None => return out,
        FilterKind::Greyscale => greyscale,
        FilterKind::Sepia => sepia,
        FilterKind::Vintage => vintage,
        FilterKind::Cool => cool,
    };
    for pixel in out.pixels_mut() {
        map_rgb(pixel, map);
    }
    out
}

/// Linear contrast around mid-grey, same curve as CSS `contrast()`:
/// a factor of 1.5 matches `contrast(150%)`.
pub fn boost_contrast(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let Rgba([r, g, b, _]) = *pixel;
        let adjust = |c: u8| ((c as f32 / 255.0 - 0.5) * factor + 0.5) * 255.0;
        pixel.0[0] = clamp_channel(adjust(r));
        pixel.0[1] = clamp_channel(adjust(g));
        pixel.0[2] = clamp_channel(adjust(b));
    }
}

fn map_rgb(pixel: &mut Rgba<u8>, f: fn([f32; 3]) -> [f32; 3]) {
    let [r, g, b] = f([pixel.0[0] as f32, pixel.0[1] as f32, pixel.0[2] as f32]);
    pixel.0[0] = clamp_channel(r);
    pixel.0[1] = clamp_channel(g);
    pixel.0[2] = clamp_channel(b);
}

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn greyscale([r, g, b]: [f32; 3]) -> [f32; 3] {
    let luma = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    [luma, luma, luma]
}

fn sepia([r, g, b]: [f32; 3]) -> [f32; 3] {
    [
        0.393 * r + 0.769 * g + 0.189 * b,
        0.349 * r + 0.686 * g + 0.168 * b,
        0.272 * r + 0.534 * g + 0.131 * b,
    ]
}

/// Half-strength sepia with lifted blacks
fn vintage(rgb: [f32; 3]) -> [f32; 3] {
    let toned = sepia(rgb);
    let mut out = [0.0; 3];
    for i in 0..3 {
        let mixed = (rgb[i] + toned[i]) * 0.5;
        out[i] = 24.0 + mixed * (231.0 / 255.0);
    }
    out
}

fn cool([r, g, b]: [f32; 3]) -> [f32; 3] {
    [r * 0.88, g * 0.98, b * 1.08 + 12.0]
}
