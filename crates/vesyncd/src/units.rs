//! Conversions between VeSync percent scales and normalized entity scales.
//!
//! The cloud API reports brightness and color temperature as 0-100 percent
//! values and fan speed as a small integer level. Entities expose brightness
//! as 0-255, color temperature in Mireds, and fan speed as a percentage.
//! Every function clamps its input before converting and its output after,
//! so bad vendor data can never escape the valid range.

/// Coldest supported white temperature (1,000,000 / 6500 K).
pub const MIN_MIREDS: u16 = 154;

/// Warmest supported white temperature (1,000,000 / 2700 K).
pub const MAX_MIREDS: u16 = 370;

/// Fan speed levels. Off is a separate boolean state, not level 0.
pub const SPEED_RANGE: (u8, u8) = (1, 3);

/// Convert a vendor brightness percent (0-100) to the 0-255 entity scale.
///
/// A vendor value of 0 is treated as 1: brightness 0 is never produced,
/// because "off" is signaled by the device status flag instead.
pub fn brightness_pct_to_ha(pct: u8) -> u8 {
    let pct = u32::from(pct.clamp(0, 100).max(1));
    ((pct * 255 + 50) / 100).min(255) as u8
}

/// Convert a 0-255 entity brightness to the vendor percent scale (1-100).
pub fn brightness_ha_to_pct(value: u8) -> u8 {
    let value = u32::from(value.max(1));
    (((value * 100 + 127) / 255) as u8).clamp(1, 100)
}

/// Convert a vendor color-temperature percent to Mireds.
///
/// The vendor scale is warm-high-percent while Mireds are warm-high-Mired,
/// so the percent is inverted before interpolating into `[min, max]`.
pub fn color_temp_pct_to_mireds(pct: u8, min_mireds: u16, max_mireds: u16) -> u16 {
    let inverted = u32::from(100 - pct.clamp(0, 100));
    let span = u32::from(max_mireds - min_mireds);
    let mireds = u32::from(min_mireds) + (span * inverted + 50) / 100;
    (mireds as u16).clamp(min_mireds, max_mireds)
}

/// Convert Mireds back to the vendor color-temperature percent (0-100).
pub fn color_temp_mireds_to_pct(mireds: u16, min_mireds: u16, max_mireds: u16) -> u8 {
    let mireds = mireds.clamp(min_mireds, max_mireds);
    let span = u32::from(max_mireds - min_mireds);
    let pct = (u32::from(mireds - min_mireds) * 100 + span / 2) / span;
    (100 - pct.min(100) as u8).clamp(0, 100)
}

/// Map a speed level inside a closed `(low, high)` range to a percentage.
pub fn ranged_value_to_percentage(range: (u8, u8), value: u8) -> u8 {
    let (low, high) = range;
    let value = value.clamp(low, high);
    let states = u32::from(high - low + 1);
    (u32::from(value - low + 1) * 100 / states) as u8
}

/// Map a percentage back to a speed level inside a closed `(low, high)` range.
///
/// Rounds up, so any nonzero percentage yields at least the lowest level and
/// never falls onto the off boundary below the range.
pub fn percentage_to_ranged_value(range: (u8, u8), percentage: u8) -> u8 {
    let (low, high) = range;
    let percentage = u32::from(percentage.clamp(0, 100));
    let states = u32::from(high - low + 1);
    let level = (states * percentage).div_ceil(100) + u32::from(low) - 1;
    (level as u8).clamp(low, high)
}
