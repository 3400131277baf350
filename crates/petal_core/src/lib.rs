//! Petal Core
//!
//! Deferred, batched 2D drawing: drawing calls are packed into fixed-size
//! records on a bounded tape and submitted to a host rasterizer in a single
//! call per flush.
//!
//! - **Instructions**: one 36-byte record per call, opcode + context + six floats
//! - **Tape**: bounded record buffer that flushes itself when full
//! - **Host boundary**: one `submit(Batch)` per flush, replayed in append order
//! - **Context slots**: small integer surface ids with free-list reuse
//!
//! # Example
//!
//! ```ignore
//! use petal_core::{ContextId, Instruction, Op, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), host)?;
//! pipeline.append(Instruction::with_payload(
//!     Op::FillRect,
//!     ContextId::PRIMARY,
//!     &[0.0, 0.0, 10.0, 10.0],
//! ));
//! pipeline.flush();
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod instruction;
pub mod pipeline;
pub mod replay;
pub mod slots;
pub mod tape;
pub mod text;

pub use config::PipelineConfig;
pub use error::{Error, HostError, Result};
pub use host::{Batch, RasterHost, Records};
pub use instruction::{Instruction, Op, PAYLOAD_LEN, STRIDE};
pub use pipeline::Pipeline;
pub use replay::{replay, Canvas2d, ReplayStats, Rgba, SurfaceLookup, TextAlign};
pub use slots::{ContextId, ContextSlots};
pub use tape::Tape;
pub use text::{TextHandle, TextPool};
