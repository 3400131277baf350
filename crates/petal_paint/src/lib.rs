//! Petal Paint
//!
//! The caller-facing drawing API on top of [`petal_core`]. A [`Renderer`]
//! leases a context from a [`Pipeline`](petal_core::Pipeline), keeps a
//! shadow of that surface's transform, clip and tint, and turns each call
//! into one record on the pipeline's tape.
//!
//! # Example
//!
//! ```ignore
//! use petal_paint::{Color, Renderer};
//!
//! let mut renderer = Renderer::primary(&pipeline)?;
//! renderer.reset();
//! renderer.set_fill(Color(0xffffe763));
//! {
//!     let mut scope = renderer.save();
//!     scope.translate(400.0, 300.0);
//!     scope.begin_path();
//!     scope.arc(0.0, 0.0, 25.0);
//!     scope.fill();
//! }
//! renderer.flush();
//! ```

pub mod color;
pub mod metrics;
pub mod renderer;
pub mod scope;
pub mod state;
pub mod transform;

pub use color::{hsv, mix, Color};
pub use metrics::{char_width, text_width};
pub use renderer::{Renderer, TextStyle};
pub use scope::RenderScope;
pub use state::{ClipRect, RenderState};
pub use transform::Transform;
