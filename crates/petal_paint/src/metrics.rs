//! Text width estimation
//!
//! Widths are in em units, calibrated to the Ubuntu face. Multiply by the
//! font size for pixels.

/// Width of any code point outside the table
pub const FALLBACK_WIDTH: f32 = 1.0;

/// Advance width of each ASCII code point
#[rustfmt::skip]
pub const CHAR_WIDTHS: [f32; 128] = [
    // 0x00 control characters
    0.0, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.0, 0.24, 0.24, 0.24, 0.24, 0.24, 0.5, 0.5,
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.0, 0.5, 0.5,
    // 0x20 ` !"#$%&'()*+,-./`
    0.24, 0.286, 0.465, 0.699, 0.568, 0.918, 0.705, 0.247,
    0.356, 0.356, 0.502, 0.568, 0.246, 0.34, 0.246, 0.437,
    // 0x30 `0-9:;<=>?`
    0.568, 0.568, 0.568, 0.568, 0.568, 0.568, 0.568, 0.568,
    0.568, 0.568, 0.246, 0.246, 0.568, 0.568, 0.568, 0.455,
    // 0x40 `@A-O`
    0.974, 0.721, 0.672, 0.648, 0.737, 0.606, 0.574, 0.702,
    0.734, 0.316, 0.529, 0.684, 0.563, 0.897, 0.756, 0.79,
    // 0x50 `P-Z[\]^_`
    0.644, 0.79, 0.667, 0.582, 0.614, 0.707, 0.722, 0.948,
    0.675, 0.661, 0.61, 0.371, 0.437, 0.371, 0.568, 0.5,
    // 0x60 `` `a-o ``
    0.286, 0.553, 0.604, 0.5, 0.604, 0.584, 0.422, 0.594,
    0.589, 0.289, 0.289, 0.579, 0.316, 0.862, 0.589, 0.607,
    // 0x70 `p-z{|}~` DEL
    0.604, 0.604, 0.422, 0.485, 0.444, 0.589, 0.55, 0.784,
    0.554, 0.547, 0.5, 0.371, 0.322, 0.371, 0.568, 0.5,
];

/// Width of one code point in em units
pub fn char_width(ch: char) -> f32 {
    CHAR_WIDTHS
        .get(ch as usize)
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Estimated width of `text` in em units. Stops at the first NUL.
pub fn text_width(text: &str) -> f32 {
    text.chars()
        .take_while(|&ch| ch != '\0')
        .map(char_width)
        .sum()
}
