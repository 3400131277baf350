//! Renderer - the drawing API
//!
//! A renderer owns one context id on a [`Pipeline`] and a shadow of that
//! surface's state. Each drawing call becomes one record on the pipeline's
//! tape; nothing reaches the host until the tape is flushed. Derived values
//! such as the current transform or a measured text width are answered from
//! the shadow, so callers can read them back without waiting for a flush.

use std::f32::consts::TAU;

use petal_core::{ContextId, Instruction, Op, Pipeline, Result};

use crate::color::{mix, Color};
use crate::metrics;
use crate::scope::RenderScope;
use crate::state::RenderState;
use crate::transform::Transform;

/// Arguments for [`Renderer::draw_text`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub fill: Color,
    pub stroke: Color,
    /// Font size in pixels
    pub size: f32,
    /// Outline width relative to `size`, 0 for no outline
    pub stroke_scale: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            stroke: Color::BLACK,
            size: 16.0,
            stroke_scale: 0.12,
        }
    }
}

pub struct Renderer<'p> {
    pipeline: &'p Pipeline,
    id: ContextId,
    width: f32,
    height: f32,
    pub(crate) state: RenderState,
}

impl<'p> Renderer<'p> {
    /// Lease a fresh context on `pipeline`. Its surface starts at 1x1.
    pub fn new(pipeline: &'p Pipeline) -> Result<Self> {
        let id = pipeline.lease_context()?;
        Ok(Self::bind(pipeline, id, 1.0, 1.0))
    }

    /// Bind the primary context. Only one primary renderer may be alive at
    /// a time.
    pub fn primary(pipeline: &'p Pipeline) -> Result<Self> {
        pipeline.claim_primary()?;
        let config = pipeline.config();
        Ok(Self::bind(
            pipeline,
            ContextId::PRIMARY,
            config.primary_width,
            config.primary_height,
        ))
    }

    fn bind(pipeline: &'p Pipeline, id: ContextId, width: f32, height: f32) -> Self {
        Self {
            pipeline,
            id,
            width,
            height,
            state: RenderState::new(width, height),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn pipeline(&self) -> &'p Pipeline {
        self.pipeline
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn transform(&self) -> &Transform {
        &self.state.transform
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Flush every renderer's pending records, see [`Pipeline::flush`]
    pub fn flush(&self) {
        self.pipeline.flush();
    }

    fn emit(&self, op: Op) {
        self.pipeline.append(Instruction::new(op, self.id));
    }

    fn emit_payload(&self, op: Op, payload: &[f32]) {
        self.pipeline
            .append(Instruction::with_payload(op, self.id, payload));
    }

    fn emit_color(&self, op: Op, color: Color) {
        let rgba = mix(color, self.state.color_filter, self.state.amount).to_rgba();
        self.emit_payload(op, &[rgba.r, rgba.g, rgba.b, rgba.a]);
    }

    fn emit_transform(&self) {
        self.emit_payload(Op::SetTransform, &self.state.transform.to_array());
    }

    // === Surface ===

    /// Resize the surface. Applied on the host immediately, not taped.
    pub fn set_dimensions(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.pipeline.resize_surface(self.id, width, height);
    }

    /// Reset transform and text/line defaults, drop the tint and widen the
    /// clip to the whole surface
    pub fn reset(&mut self) {
        self.reset_transform();
        self.round_line_cap();
        self.round_line_join();
        self.center_text_align();
        self.center_text_baseline();
        self.state.reset(self.width, self.height);
    }

    /// Open a save/restore scope, see [`RenderScope`]
    pub fn save(&mut self) -> RenderScope<'_, 'p> {
        RenderScope::new(self)
    }

    // === Style ===

    pub fn set_fill(&mut self, color: Color) {
        self.emit_color(Op::SetFill, color);
    }

    pub fn set_stroke(&mut self, color: Color) {
        self.emit_color(Op::SetStroke, color);
    }

    /// Tint every following fill and stroke color by `amount` towards `color`
    pub fn add_color_filter(&mut self, color: Color, amount: f32) {
        self.state.color_filter = color;
        self.state.amount = amount;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.emit_payload(Op::LineWidth, &[width]);
    }

    pub fn set_text_size(&mut self, size: f32) {
        self.emit_payload(Op::FontSize, &[size]);
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.emit_payload(Op::GlobalAlpha, &[alpha]);
    }

    pub fn round_line_cap(&mut self) {
        self.emit(Op::LineCapRound);
    }

    pub fn round_line_join(&mut self) {
        self.emit(Op::LineJoinRound);
    }

    pub fn center_text_align(&mut self) {
        self.emit(Op::TextAlignCenter);
    }

    pub fn left_text_align(&mut self) {
        self.emit(Op::TextAlignLeft);
    }

    pub fn right_text_align(&mut self) {
        self.emit(Op::TextAlignRight);
    }

    pub fn center_text_baseline(&mut self) {
        self.emit(Op::TextBaselineMiddle);
    }

    // === Transforms ===

    pub fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.state.transform = Transform::new(a, b, c, d, e, f);
        self.emit_transform();
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Transform::IDENTITY;
        self.emit_transform();
    }

    pub fn scale(&mut self, s: f32) {
        self.scale_xy(s, s);
    }

    pub fn scale_xy(&mut self, x: f32, y: f32) {
        self.state.transform.scale(x, y);
        self.emit_transform();
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.state.transform.translate(x, y);
        self.emit_transform();
    }

    pub fn rotate(&mut self, angle: f32) {
        self.state.transform.rotate(angle);
        self.emit_transform();
    }

    // === Paths ===

    pub fn begin_path(&mut self) {
        self.emit(Op::BeginPath);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.emit_payload(Op::MoveTo, &[x, y]);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.emit_payload(Op::LineTo, &[x, y]);
    }

    /// Quadratic curve through control point (`cx`, `cy`)
    pub fn qcurve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.emit_payload(Op::QuadCurveTo, &[cx, cy, x, y]);
    }

    /// Cubic curve through two control points
    pub fn bcurve_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.emit_payload(Op::BezierCurveTo, &[c1x, c1y, c2x, c2y, x, y]);
    }

    pub fn partial_arc(&mut self, x: f32, y: f32, r: f32, start: f32, end: f32, ccw: bool) {
        let ccw = if ccw { 1.0 } else { 0.0 };
        self.emit_payload(Op::Arc, &[x, y, r, start, end, ccw]);
    }

    /// Full clockwise circle
    pub fn arc(&mut self, x: f32, y: f32, r: f32) {
        self.partial_arc(x, y, r, 0.0, TAU, false);
    }

    /// Full counter-clockwise circle, cuts holes under the nonzero rule
    pub fn reverse_arc(&mut self, x: f32, y: f32, r: f32) {
        self.partial_arc(x, y, r, 0.0, TAU, true);
    }

    pub fn ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32) {
        self.emit_payload(Op::Ellipse, &[x, y, rx, ry]);
    }

    /// Like [`Renderer::ellipse`]. The host always draws ellipses unrotated,
    /// so `_angle` is not recorded.
    pub fn ellipse_rotated(&mut self, x: f32, y: f32, rx: f32, ry: f32, _angle: f32) {
        self.ellipse(x, y, rx, ry);
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.emit_payload(Op::Rect, &[x, y, width, height]);
    }

    pub fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        self.emit_payload(Op::RoundRect, &[x, y, width, height, radius, 0.0]);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.emit_payload(Op::FillRect, &[x, y, width, height]);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.emit_payload(Op::StrokeRect, &[x, y, width, height]);
    }

    pub fn close_path(&mut self) {
        self.emit(Op::ClosePath);
    }

    // === Painting ===

    pub fn fill(&mut self) {
        self.emit(Op::Fill);
    }

    pub fn stroke(&mut self) {
        self.emit(Op::Stroke);
    }

    pub fn clip(&mut self) {
        self.emit(Op::Clip);
    }

    /// Clip to a `width` x `height` rectangle centered on (`x`, `y`).
    ///
    /// The recorded clip only follows the scale and translation of the
    /// current transform; rotation and skew are not tracked.
    pub fn clip_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let t = self.state.transform;
        self.state.clip.x = x * t.a + t.e;
        self.state.clip.width = width * t.a;
        self.state.clip.y = y * t.d + t.f;
        self.state.clip.height = height * t.d;

        self.begin_path();
        self.rect(x - width / 2.0, y - height / 2.0, width, height);
        self.clip();
    }

    // === Text ===

    /// Fill `text` at the origin. Text that cannot be handed to the host
    /// (interior NUL) is dropped.
    pub fn fill_text(&mut self, text: &str) {
        self.pipeline.append_text(Op::FillText, self.id, text);
    }

    pub fn stroke_text(&mut self, text: &str) {
        self.pipeline.append_text(Op::StrokeText, self.id, text);
    }

    /// Outlined text: colors, size, optional outline, then the fill on top
    pub fn draw_text(&mut self, text: &str, style: TextStyle) {
        self.set_fill(style.fill);
        self.set_stroke(style.stroke);
        self.set_text_size(style.size);
        if style.stroke_scale > 0.0 {
            self.set_line_width(style.size * style.stroke_scale);
            self.stroke_text(text);
        }
        self.fill_text(text);
    }

    /// Width of `text` in em units
    pub fn measure_text(&self, text: &str) -> f32 {
        metrics::text_width(text)
    }

    /// Width of `text` in pixels at font size `size`
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        metrics::text_width(text) * size
    }
}

impl Drop for Renderer<'_> {
    fn drop(&mut self) {
        if self.id.is_primary() {
            self.pipeline.unclaim_primary();
            return;
        }
        if let Err(err) = self.pipeline.release_context(self.id) {
            tracing::error!(id = %self.id, %err, "failed to release context");
        }
    }
}

impl std::fmt::Debug for Renderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("state", &self.state)
            .finish()
    }
}
