//! Packed colors and blend utilities

use petal_core::Rgba;

/// Color packed as `0xAARRGGBB`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffffff);
    pub const BLACK: Color = Color(0xff000000);
    pub const TRANSPARENT: Color = Color(0x00000000);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Same color with a different alpha channel
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self(self.0 & 0x00ffffff | (alpha as u32) << 24)
    }

    /// Payload form: channels as 0..=255 floats, alpha scaled to 0..=1
    pub fn to_rgba(self) -> Rgba {
        Rgba {
            r: self.red() as f32,
            g: self.green() as f32,
            b: self.blue() as f32,
            a: self.alpha() as f32 / 255.0,
        }
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Color(argb)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

fn blend_channel(base: u8, mix: u8, v: f32) -> u8 {
    (mix as f32 * v + base as f32 * (1.0 - v))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Blend `mix` over `base` by `v` (0 = base, 1 = mix), per RGB channel.
/// The result keeps `base`'s alpha.
pub fn mix(base: Color, mix: Color, v: f32) -> Color {
    Color::from_argb(
        base.alpha(),
        blend_channel(base.red(), mix.red(), v),
        blend_channel(base.green(), mix.green(), v),
        blend_channel(base.blue(), mix.blue(), v),
    )
}

/// Scale `c` towards black by `v` (0 = black, 1 = `c`), keeping `c`'s alpha
pub fn hsv(c: Color, v: f32) -> Color {
    mix(Color(c.0 & 0xff000000), c, v)
}
