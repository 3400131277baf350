//! Caller-side shadow of the surface transform
//!
//! `scale` and `translate` compose like the canvas methods of the same
//! name. `rotate` pre-multiplies the linear block by the rotation matrix
//! and leaves the translation alone.

/// 2D affine matrix in canvas `setTransform(a, b, c, d, e, f)` order
///
/// ```text
/// | a  c  e |
/// | b  d  f |
/// | 0  0  1 |
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn to_array(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.a *= x;
        self.b *= x;
        self.c *= y;
        self.d *= y;
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.e += x * self.a + y * self.c;
        self.f += x * self.b + y * self.d;
    }

    /// Rotate by `angle` radians, clockwise on a y-down surface.
    ///
    /// Each column of the linear block is rotated in surface space, so a
    /// prior non-uniform scale stretches along the surface axes.
    pub fn rotate(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let Transform { a, b, c, d, .. } = *self;
        self.a = a * cos - b * sin;
        self.b = a * sin + b * cos;
        self.c = c * cos - d * sin;
        self.d = c * sin + d * cos;
    }

    /// Map a point from local to surface space
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4
    }

    #[test]
    fn test_identity_scale_one_is_exact() {
        let mut t = Transform::IDENTITY;
        t.scale(1.0, 1.0);
        assert_eq!(t.to_array(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(t.is_identity());
    }

    #[test]
    fn test_translate_then_scale() {
        let mut t = Transform::IDENTITY;
        t.translate(10.0, 20.0);
        t.scale(2.0, 3.0);
        assert_eq!(t.to_array(), [2.0, 0.0, 0.0, 3.0, 10.0, 20.0]);
        assert_eq!(t.apply(1.0, 1.0), (12.0, 23.0));
    }

    #[test]
    fn test_scale_then_translate_scales_offset() {
        let mut t = Transform::IDENTITY;
        t.scale(2.0, 4.0);
        t.translate(5.0, 5.0);
        assert_eq!(t.e, 10.0);
        assert_eq!(t.f, 20.0);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut t = Transform::IDENTITY;
        t.rotate(std::f32::consts::FRAC_PI_2);
        // +x maps to +y on a y-down surface
        assert!(approx(t.apply(1.0, 0.0), (0.0, 1.0)));
        assert!(approx(t.apply(0.0, 1.0), (-1.0, 0.0)));
    }

    #[test]
    fn test_rotate_keeps_translation() {
        let mut t = Transform::IDENTITY;
        t.translate(3.0, 4.0);
        t.rotate(1.0);
        assert_eq!((t.e, t.f), (3.0, 4.0));
        assert!(approx(t.apply(0.0, 0.0), (3.0, 4.0)));
    }

    #[test]
    fn test_rotate_after_uneven_scale() {
        let mut t = Transform::IDENTITY;
        t.scale(2.0, 1.0);
        t.rotate(std::f32::consts::FRAC_PI_2);
        let [a, b, c, d, e, f] = t.to_array();
        for (got, want) in [(a, 0.0), (b, 2.0), (c, -1.0), (d, 0.0), (e, 0.0), (f, 0.0)] {
            assert!((got - want).abs() < 1e-6, "{:?}", t.to_array());
        }
    }

    #[test]
    fn test_rotate_sheared_matrix() {
        let mut t = Transform::new(1.0, 0.0, 0.5, 1.0, 4.0, 2.0);
        t.rotate(std::f32::consts::PI);
        let expected = [-1.0, 0.0, -0.5, -1.0, 4.0, 2.0];
        for (got, want) in t.to_array().into_iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{:?}", t.to_array());
        }
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut t = Transform::IDENTITY;
        t.scale(2.0, 2.0);
        t.rotate(0.7);
        t.rotate(-0.7);
        assert!(approx(t.apply(1.0, 1.0), (2.0, 2.0)));
    }
}
