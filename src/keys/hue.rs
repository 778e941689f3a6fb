/*
Note Colors
===========

Each note gets a hue from its frequency on a logarithmic scale, so equal
musical intervals are equal steps around the color wheel:

    v   = (ln f - ln C3) / (ln B5 - ln C3)
    hue = round(((v mod 1) + 1) * 360) mod 360

The reference range C3..B5 spans roughly 2.9 octaves, wider than the
keyboard itself, so the 24 keys use about 70% of the wheel. Frequencies
outside the range wrap around instead of clamping.
*/

/// C3
const HUE_MIN_FREQ: f64 = 130.812_782_650_299_3;
/// B5
const HUE_MAX_FREQ: f64 = 987.766_602_512_248_2;

/// Hue in degrees, always in [0, 360).
pub fn freq_to_hue(frequency: f32) -> u16 {
    let v = ((frequency as f64).ln() - HUE_MIN_FREQ.ln()) / (HUE_MAX_FREQ.ln() - HUE_MIN_FREQ.ln());
    let wrapped = v.rem_euclid(1.0);
    (((wrapped + 1.0) * 360.0).round() as u32 % 360) as u16
}

/// HSL (hue in degrees, saturation and lightness in [0, 1]) to 8-bit RGB.
pub fn hsl_to_rgb(hue: u16, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let h = (hue % 360) as f32 / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
