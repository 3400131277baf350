//! Host-side replay of a batch
//!
//! [`replay`] is the reference consumer loop: walk the records by stride,
//! find the surface for each record's context, decode the opcode and call
//! the matching [`Canvas2d`] method with the payload fields that opcode
//! uses. Unused payload fields are ignored, not validated. Opcodes this
//! build does not know are skipped silently, there is no error channel back
//! to the producer.

use std::fmt;

use crate::host::Batch;
use crate::instruction::Op;
use crate::slots::ContextId;

/// Fill/stroke color as carried in the payload: channels in 0..=255, alpha in 0..=1
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl fmt::Display for Rgba {
    /// CSS form, e.g. `rgba(255,0,0,1)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Drawing API of one host surface, modelled on the 2D canvas
pub trait Canvas2d {
    fn set_fill_style(&mut self, color: Rgba);
    fn set_stroke_style(&mut self, color: Rgba);
    fn set_line_width(&mut self, width: f32);
    fn set_font_size(&mut self, size: f32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_line_cap_round(&mut self);
    fn set_line_join_round(&mut self);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline_middle(&mut self);
    /// Canvas `setTransform(a, b, c, d, e, f)`
    fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32);
    fn save(&mut self);
    fn restore(&mut self);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn quadratic_curve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    fn bezier_curve_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32);
    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32, ccw: bool);
    /// Full ellipse with zero rotation
    fn ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32);
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn clip(&mut self);
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
    fn stroke_text(&mut self, text: &str, x: f32, y: f32);
    fn close_path(&mut self);
}

/// Maps context ids to host surfaces
pub trait SurfaceLookup {
    type Surface: Canvas2d;

    fn surface_mut(&mut self, id: ContextId) -> Option<&mut Self::Surface>;
}

/// Counters from one [`replay`] run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Records applied to a surface
    pub applied: usize,
    /// Records with an unknown opcode
    pub ignored: usize,
    /// Records addressing a context with no surface
    pub missing_surface: usize,
}

/// Apply every record of `batch` to the surfaces, in append order
pub fn replay<S>(batch: &mut Batch<'_>, surfaces: &mut S) -> ReplayStats
where
    S: SurfaceLookup + ?Sized,
{
    let mut stats = ReplayStats::default();

    for record in batch.records() {
        // Released at the end of this iteration, or during unwinding if the
        // surface panics while drawing it.
        let text = record.text().and_then(|handle| batch.take_text(handle));

        let Some(op) = record.op() else {
            tracing::trace!(op = record.raw_op(), "ignoring unknown opcode");
            stats.ignored += 1;
            continue;
        };

        let ctx = record.context();
        let Some(surface) = surfaces.surface_mut(ctx) else {
            tracing::warn!(%ctx, %op, "no surface for context, record skipped");
            stats.missing_surface += 1;
            continue;
        };

        let [f0, f1, f2, f3, f4, f5] = *record.payload();
        match op {
            Op::SetFill => surface.set_fill_style(Rgba {
                r: f0,
                g: f1,
                b: f2,
                a: f3,
            }),
            Op::SetStroke => surface.set_stroke_style(Rgba {
                r: f0,
                g: f1,
                b: f2,
                a: f3,
            }),
            Op::LineWidth => surface.set_line_width(f0),
            Op::FontSize => surface.set_font_size(f0),
            Op::GlobalAlpha => surface.set_global_alpha(f0),
            Op::LineCapRound => surface.set_line_cap_round(),
            Op::LineJoinRound => surface.set_line_join_round(),
            Op::TextAlignCenter => surface.set_text_align(TextAlign::Center),
            Op::TextBaselineMiddle => surface.set_text_baseline_middle(),
            Op::SetTransform => surface.set_transform(f0, f1, f2, f3, f4, f5),
            Op::Save => surface.save(),
            Op::Restore => surface.restore(),
            Op::BeginPath => surface.begin_path(),
            Op::MoveTo => surface.move_to(f0, f1),
            Op::LineTo => surface.line_to(f0, f1),
            Op::QuadCurveTo => surface.quadratic_curve_to(f0, f1, f2, f3),
            Op::BezierCurveTo => surface.bezier_curve_to(f0, f1, f2, f3, f4, f5),
            Op::Arc => surface.arc(f0, f1, f2, f3, f4, f5 != 0.0),
            Op::Ellipse => surface.ellipse(f0, f1, f2, f3),
            Op::Rect => surface.rect(f0, f1, f2, f3),
            Op::RoundRect => surface.round_rect(f0, f1, f2, f3, f4),
            Op::FillRect => surface.fill_rect(f0, f1, f2, f3),
            Op::StrokeRect => surface.stroke_rect(f0, f1, f2, f3),
            Op::Fill => surface.fill(),
            Op::Stroke => surface.stroke(),
            Op::Clip => surface.clip(),
            Op::FillText | Op::StrokeText => {
                let Some(text) = text.as_ref() else {
                    tracing::warn!(%ctx, %op, "text record without a text buffer");
                    continue;
                };
                let text = text.to_string_lossy();
                if op == Op::FillText {
                    surface.fill_text(&text, 0.0, 0.0);
                } else {
                    surface.stroke_text(&text, 0.0, 0.0);
                }
            }
            Op::ClosePath => surface.close_path(),
            Op::TextAlignLeft => surface.set_text_align(TextAlign::Left),
            Op::TextAlignRight => surface.set_text_align(TextAlign::Right),
        }
        stats.applied += 1;
    }

    stats
}
