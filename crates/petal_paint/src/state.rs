//! Per-renderer state shadow, saved and restored by [`crate::RenderScope`]

use crate::color::Color;
use crate::transform::Transform;

/// Clip rectangle in surface space, positioned by its center
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ClipRect {
    /// The whole `width` x `height` surface
    pub fn full(width: f32, height: f32) -> Self {
        Self {
            x: width / 2.0,
            y: height / 2.0,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    /// Tint blended into every fill and stroke color
    pub color_filter: Color,
    /// Blend amount of `color_filter`, 0 = untinted
    pub amount: f32,
    pub clip: ClipRect,
    pub transform: Transform,
}

impl RenderState {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            color_filter: Color::TRANSPARENT,
            amount: 0.0,
            clip: ClipRect::full(width, height),
            transform: Transform::IDENTITY,
        }
    }

    /// Clear the tint and widen the clip to the full surface. The transform
    /// is left alone.
    pub fn reset(&mut self, width: f32, height: f32) {
        self.color_filter = Color::TRANSPARENT;
        self.amount = 0.0;
        self.clip = ClipRect::full(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_transform() {
        let mut state = RenderState::new(100.0, 50.0);
        state.color_filter = Color(0xff00ff00);
        state.amount = 0.5;
        state.clip = ClipRect {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        };
        state.transform.translate(7.0, 8.0);

        state.reset(200.0, 100.0);
        assert_eq!(state.color_filter, Color::TRANSPARENT);
        assert_eq!(state.amount, 0.0);
        assert_eq!(state.clip, ClipRect::full(200.0, 100.0));
        assert_eq!((state.transform.e, state.transform.f), (7.0, 8.0));
    }

    #[test]
    fn test_full_clip_is_centered() {
        let clip = ClipRect::full(800.0, 600.0);
        assert_eq!((clip.x, clip.y), (400.0, 300.0));
        assert_eq!((clip.width, clip.height), (800.0, 600.0));
    }
}
