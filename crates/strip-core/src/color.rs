//! Hue/RGB conversion.
//!
//! Colors are `glam::Vec3` triples with each channel in \[0, 1\]. Hues are in
//! degrees. The integer-degree hue key produced here is what presence
//! reconciliation matches on.

use glam::Vec3;

/// Convert an HSV color to RGB. `hue_deg` is wrapped into \[0, 360); `saturation`
/// and `value` are clamped to \[0, 1\].
pub fn hsv_to_rgb(hue_deg: f32, saturation: f32, value: f32) -> Vec3 {
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(v);
    }
    let h6 = hue_deg.rem_euclid(360.0) / 60.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u8 % 6 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

/// Full-saturation, full-value color for a hue.
#[inline]
pub fn hue_color(hue_deg: f32) -> Vec3 {
    hsv_to_rgb(hue_deg, 1.0, 1.0)
}

/// Recover the hue of an RGB color, rounded to the nearest integer degree.
///
/// Achromatic colors (all channels equal) have no hue and map to 0.
pub fn rgb_to_hue(rgb: Vec3) -> u16 {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let delta = max - min;
    if delta <= f32::EPSILON {
        return 0;
    }
    let sector = if max == rgb.x {
        ((rgb.y - rgb.z) / delta).rem_euclid(6.0)
    } else if max == rgb.y {
        (rgb.z - rgb.x) / delta + 2.0
    } else {
        (rgb.x - rgb.y) / delta + 4.0
    };
    hue_key(sector * 60.0)
}

/// Integer-degree matching key for a stored hue, wrapped into \[0, 360).
#[inline]
pub fn hue_key(hue_deg: f32) -> u16 {
    (hue_deg.round() as i64).rem_euclid(360) as u16
}

/// Scale a unit color to bytes, saturating at 255 instead of wrapping.
#[inline]
pub fn to_rgb8(rgb: Vec3, brightness: f32) -> [u8; 3] {
    let c = rgb * brightness;
    [channel_u8(c.x), channel_u8(c.y), channel_u8(c.z)]
}

/// Truncate a channel value to a byte, clamping into 0..=255.
#[inline]
pub fn channel_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Unit color from a byte triple, as carried by the presence feed.
#[inline]
pub fn from_rgb8(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_convert_exactly() {
        assert_eq!(hue_color(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hue_color(120.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(hue_color(240.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(hue_color(360.0), hue_color(0.0));
        assert_eq!(hue_color(-120.0), hue_color(240.0));
    }

    #[test]
    fn zero_saturation_is_gray() {
        assert_eq!(hsv_to_rgb(200.0, 0.0, 0.4), Vec3::splat(0.4));
        assert_eq!(rgb_to_hue(Vec3::splat(0.4)), 0);
    }

    #[test]
    fn hue_key_wraps_and_rounds() {
        assert_eq!(hue_key(359.6), 0);
        assert_eq!(hue_key(10.4), 10);
        assert_eq!(hue_key(-1.0), 359);
        assert_eq!(hue_key(725.0), 5);
    }

    #[test]
    fn bytes_saturate() {
        assert_eq!(to_rgb8(Vec3::new(1.0, 0.5, 2.0), 250.0), [250, 125, 255]);
        assert_eq!(channel_u8(-3.0), 0);
        assert_eq!(channel_u8(f32::NAN), 0);
    }
}
