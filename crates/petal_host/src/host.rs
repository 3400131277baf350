//! Recording host
//!
//! An in-process [`RasterHost`] that paints nothing. Each submitted batch
//! is replayed with [`petal_core::replay`] against per-context
//! [`RecordedSurface`]s that log the canvas calls they receive.

use petal_core::{
    replay, Batch, Canvas2d, ContextId, HostError, PipelineConfig, RasterHost, Rgba,
    SurfaceLookup, TextAlign,
};
use rustc_hash::FxHashMap;

use crate::call::CanvasCall;
use crate::log::ReplayLog;

/// Canvas surface that logs instead of painting
#[derive(Debug)]
pub struct RecordedSurface {
    id: ContextId,
    font_family: String,
    log: ReplayLog,
}

impl RecordedSurface {
    fn record(&mut self, call: CanvasCall) {
        self.log.push(self.id, call);
    }

    pub fn id(&self) -> ContextId {
        self.id
    }
}

impl Canvas2d for RecordedSurface {
    fn set_fill_style(&mut self, color: Rgba) {
        self.record(CanvasCall::FillStyle(color.to_string()));
    }

    fn set_stroke_style(&mut self, color: Rgba) {
        self.record(CanvasCall::StrokeStyle(color.to_string()));
    }

    fn set_line_width(&mut self, width: f32) {
        self.record(CanvasCall::LineWidth(width));
    }

    fn set_font_size(&mut self, size: f32) {
        let font = format!("{size}px {}", self.font_family);
        self.record(CanvasCall::Font(font));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.record(CanvasCall::GlobalAlpha(alpha));
    }

    fn set_line_cap_round(&mut self) {
        self.record(CanvasCall::LineCap("round"));
    }

    fn set_line_join_round(&mut self) {
        self.record(CanvasCall::LineJoin("round"));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        let align = match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        };
        self.record(CanvasCall::TextAlign(align));
    }

    fn set_text_baseline_middle(&mut self) {
        self.record(CanvasCall::TextBaseline("middle"));
    }

    fn set_transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.record(CanvasCall::SetTransform([a, b, c, d, e, f]));
    }

    fn save(&mut self) {
        self.record(CanvasCall::Save);
    }

    fn restore(&mut self) {
        self.record(CanvasCall::Restore);
    }

    fn begin_path(&mut self) {
        self.record(CanvasCall::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.record(CanvasCall::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.record(CanvasCall::LineTo { x, y });
    }

    fn quadratic_curve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.record(CanvasCall::QuadraticCurveTo { cx, cy, x, y });
    }

    fn bezier_curve_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.record(CanvasCall::BezierCurveTo {
            c1x,
            c1y,
            c2x,
            c2y,
            x,
            y,
        });
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32, ccw: bool) {
        self.record(CanvasCall::Arc {
            x,
            y,
            radius,
            start,
            end,
            ccw,
        });
    }

    fn ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32) {
        self.record(CanvasCall::Ellipse { x, y, rx, ry });
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.record(CanvasCall::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        self.record(CanvasCall::RoundRect {
            x,
            y,
            width,
            height,
            radius,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.record(CanvasCall::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.record(CanvasCall::StrokeRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill(&mut self) {
        self.record(CanvasCall::Fill);
    }

    fn stroke(&mut self) {
        self.record(CanvasCall::Stroke);
    }

    fn clip(&mut self) {
        self.record(CanvasCall::Clip);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.record(CanvasCall::FillText {
            text: text.to_owned(),
            x,
            y,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        self.record(CanvasCall::StrokeText {
            text: text.to_owned(),
            x,
            y,
        });
    }

    fn close_path(&mut self) {
        self.record(CanvasCall::ClosePath);
    }
}

#[derive(Debug, Default)]
struct Surfaces(FxHashMap<ContextId, RecordedSurface>);

impl SurfaceLookup for Surfaces {
    type Surface = RecordedSurface;

    fn surface_mut(&mut self, id: ContextId) -> Option<&mut RecordedSurface> {
        self.0.get_mut(&id)
    }
}

/// Headless [`RasterHost`] backed by a [`ReplayLog`]
#[derive(Debug)]
pub struct RecordingHost {
    surfaces: Surfaces,
    font_family: String,
    log: ReplayLog,
    /// Error returned by the next submit, after the batch was replayed
    fail_next: Option<HostError>,
}

impl RecordingHost {
    /// Host with the primary surface sized from `config`
    pub fn new(config: &PipelineConfig) -> Self {
        let mut host = Self {
            surfaces: Surfaces::default(),
            font_family: config.font_family.clone(),
            log: ReplayLog::new(),
            fail_next: None,
        };
        host.create_surface(
            ContextId::PRIMARY,
            config.primary_width,
            config.primary_height,
        );
        host
    }

    /// Handle to the log this host writes to
    pub fn log(&self) -> ReplayLog {
        self.log.clone()
    }

    /// Make the next submit report `err`
    pub fn fail_next(&mut self, err: HostError) {
        self.fail_next = Some(err);
    }

    pub fn has_surface(&self, id: ContextId) -> bool {
        self.surfaces.0.contains_key(&id)
    }
}

impl RasterHost for RecordingHost {
    fn submit(&mut self, mut batch: Batch<'_>) -> Result<(), HostError> {
        for record in batch.records() {
            self.log.count_opcode(record.raw_op());
        }
        let stats = replay(&mut batch, &mut self.surfaces);
        tracing::trace!(
            records = batch.len(),
            applied = stats.applied,
            ignored = stats.ignored,
            "replayed batch"
        );
        self.log.finish_batch(batch.len(), stats);

        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn create_surface(&mut self, id: ContextId, width: f32, height: f32) {
        let surface = RecordedSurface {
            id,
            font_family: self.font_family.clone(),
            log: self.log.clone(),
        };
        if self.surfaces.0.insert(id, surface).is_some() {
            tracing::warn!(%id, "surface created twice, replacing");
        }
        self.log.surface_created(id, width, height);
        tracing::debug!(%id, width, height, "created canvas");
    }

    fn resize_surface(&mut self, id: ContextId, width: f32, height: f32) {
        if !self.has_surface(id) {
            tracing::warn!(%id, "resize of unknown surface");
            return;
        }
        self.log.surface_resized(id, width, height);
    }

    fn destroy_surface(&mut self, id: ContextId) {
        if self.surfaces.0.remove(&id).is_none() {
            tracing::warn!(%id, "destroy of unknown surface");
            return;
        }
        self.log.surface_destroyed(id);
        tracing::debug!(%id, "removed canvas");
    }
}
