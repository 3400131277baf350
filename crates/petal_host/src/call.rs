//! Decoded canvas calls as the recording host logs them

use std::fmt;

use serde::Serialize;

/// One call made on a host surface
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "call", content = "args", rename_all = "snake_case")]
pub enum CanvasCall {
    /// CSS color, e.g. `rgba(255,0,0,1)`
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f32),
    /// CSS font shorthand, e.g. `20px Ubuntu`
    Font(String),
    GlobalAlpha(f32),
    LineCap(&'static str),
    LineJoin(&'static str),
    TextAlign(&'static str),
    TextBaseline(&'static str),
    SetTransform([f32; 6]),
    Save,
    Restore,
    BeginPath,
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    QuadraticCurveTo {
        cx: f32,
        cy: f32,
        x: f32,
        y: f32,
    },
    BezierCurveTo {
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    },
    Arc {
        x: f32,
        y: f32,
        radius: f32,
        start: f32,
        end: f32,
        ccw: bool,
    },
    Ellipse {
        x: f32,
        y: f32,
        rx: f32,
        ry: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    RoundRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Fill,
    Stroke,
    Clip,
    FillText {
        text: String,
        x: f32,
        y: f32,
    },
    StrokeText {
        text: String,
        x: f32,
        y: f32,
    },
    ClosePath,
}

impl CanvasCall {
    /// Canvas method or property name
    pub fn name(&self) -> &'static str {
        match self {
            CanvasCall::FillStyle(_) => "fillStyle",
            CanvasCall::StrokeStyle(_) => "strokeStyle",
            CanvasCall::LineWidth(_) => "lineWidth",
            CanvasCall::Font(_) => "font",
            CanvasCall::GlobalAlpha(_) => "globalAlpha",
            CanvasCall::LineCap(_) => "lineCap",
            CanvasCall::LineJoin(_) => "lineJoin",
            CanvasCall::TextAlign(_) => "textAlign",
            CanvasCall::TextBaseline(_) => "textBaseline",
            CanvasCall::SetTransform(_) => "setTransform",
            CanvasCall::Save => "save",
            CanvasCall::Restore => "restore",
            CanvasCall::BeginPath => "beginPath",
            CanvasCall::MoveTo { .. } => "moveTo",
            CanvasCall::LineTo { .. } => "lineTo",
            CanvasCall::QuadraticCurveTo { .. } => "quadraticCurveTo",
            CanvasCall::BezierCurveTo { .. } => "bezierCurveTo",
            CanvasCall::Arc { .. } => "arc",
            CanvasCall::Ellipse { .. } => "ellipse",
            CanvasCall::Rect { .. } => "rect",
            CanvasCall::RoundRect { .. } => "roundRect",
            CanvasCall::FillRect { .. } => "fillRect",
            CanvasCall::StrokeRect { .. } => "strokeRect",
            CanvasCall::Fill => "fill",
            CanvasCall::Stroke => "stroke",
            CanvasCall::Clip => "clip",
            CanvasCall::FillText { .. } => "fillText",
            CanvasCall::StrokeText { .. } => "strokeText",
            CanvasCall::ClosePath => "closePath",
        }
    }
}

impl fmt::Display for CanvasCall {
    /// Script-like form, e.g. `fillRect(0, 0, 10, 10)` or `lineWidth = 2`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            CanvasCall::FillStyle(v)
            | CanvasCall::StrokeStyle(v)
            | CanvasCall::Font(v) => write!(f, "{name} = {v}"),
            CanvasCall::LineWidth(v) | CanvasCall::GlobalAlpha(v) => write!(f, "{name} = {v}"),
            CanvasCall::LineCap(v)
            | CanvasCall::LineJoin(v)
            | CanvasCall::TextAlign(v)
            | CanvasCall::TextBaseline(v) => write!(f, "{name} = {v}"),
            CanvasCall::SetTransform([a, b, c, d, e, g]) => {
                write!(f, "{name}({a}, {b}, {c}, {d}, {e}, {g})")
            }
            CanvasCall::MoveTo { x, y } | CanvasCall::LineTo { x, y } => {
                write!(f, "{name}({x}, {y})")
            }
            CanvasCall::QuadraticCurveTo { cx, cy, x, y } => {
                write!(f, "{name}({cx}, {cy}, {x}, {y})")
            }
            CanvasCall::BezierCurveTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => write!(f, "{name}({c1x}, {c1y}, {c2x}, {c2y}, {x}, {y})"),
            CanvasCall::Arc {
                x,
                y,
                radius,
                start,
                end,
                ccw,
            } => write!(f, "{name}({x}, {y}, {radius}, {start}, {end}, {ccw})"),
            CanvasCall::Ellipse { x, y, rx, ry } => {
                write!(f, "{name}({x}, {y}, {rx}, {ry}, 0, 0, 6.283185307179586)")
            }
            CanvasCall::Rect {
                x,
                y,
                width,
                height,
            }
            | CanvasCall::FillRect {
                x,
                y,
                width,
                height,
            }
            | CanvasCall::StrokeRect {
                x,
                y,
                width,
                height,
            } => write!(f, "{name}({x}, {y}, {width}, {height})"),
            CanvasCall::RoundRect {
                x,
                y,
                width,
                height,
                radius,
            } => write!(f, "{name}({x}, {y}, {width}, {height}, {radius})"),
            CanvasCall::FillText { text, x, y } | CanvasCall::StrokeText { text, x, y } => {
                write!(f, "{name}({text:?}, {x}, {y})")
            }
            CanvasCall::Save
            | CanvasCall::Restore
            | CanvasCall::BeginPath
            | CanvasCall::Fill
            | CanvasCall::Stroke
            | CanvasCall::Clip
            | CanvasCall::ClosePath => write!(f, "{name}()"),
        }
    }
}
