//! Packed 32-bit colors.
//!
//! Colors are stored as `u32` in ARGB8888 layout (`0xAARRGGBB`), the layout
//! the SDL streaming texture expects, so the color buffer can be uploaded
//! without conversion.

pub const BACKGROUND: u32 = 0xFF1E1E1E;
pub const WIREFRAME: u32 = 0xFFE0E0E0;
pub const NORMAL: u32 = 0xFFFFFF00;

pub const RED: u32 = 0xFFFF0000;
pub const GREEN: u32 = 0xFF00FF00;
pub const BLUE: u32 = 0xFF0000FF;
pub const CYAN: u32 = 0xFF00FFFF;
pub const MAGENTA: u32 = 0xFFFF00FF;
pub const YELLOW: u32 = 0xFFFFFF00;
pub const BLACK: u32 = 0xFF000000;

/// Palette used by meshes that do not bring their own.
pub const DEFAULT_PALETTE: [u32; 7] = [RED, GREEN, BLUE, CYAN, MAGENTA, YELLOW, BLACK];

/// Pack 8-bit channels into an ARGB color.
#[inline]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Split an ARGB color into `[r, g, b, a]`.
#[inline]
pub const fn channels(color: u32) -> [u8; 4] {
    [
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
        (color >> 24) as u8,
    ]
}

/// Pack normalized float channels, clamping each to [0, 1].
#[inline]
pub fn pack_color(r: f32, g: f32, b: f32, a: f32) -> u32 {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    rgba(to_u8(r), to_u8(g), to_u8(b), to_u8(a))
}

/// Multiply R, G and B by `intensity`; alpha is kept as is.
/// Channels saturate at 255.
#[inline]
pub fn modulate(color: u32, intensity: f32) -> u32 {
    let [r, g, b, a] = channels(color);
    let scale = |c: u8| (c as f32 * intensity).round().clamp(0.0, 255.0) as u8;
    rgba(scale(r), scale(g), scale(b), a)
}
