//! Wire quantization: positions as signed centimeters, angles in
//! π-normalized signed 16-bit units.

use std::f32::consts::PI;

/// Quantizes meters to clamped signed centimeters.
pub fn quantize_cm(meters: f32) -> i16 {
    (meters * 100.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Expands signed centimeters back to meters.
pub fn dequantize_cm(cm: i16) -> f32 {
    cm as f32 / 100.0
}

/// Quantizes an angle in radians to π-normalized i16 units.
pub fn quantize_angle(radians: f32) -> i16 {
    (radians / PI * 32767.0)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Expands a π-normalized i16 angle back to radians.
pub fn dequantize_angle(q: i16) -> f32 {
    q as f32 / 32767.0 * PI
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
