//! Petal Host
//!
//! Headless host side of the Petal boundary. [`RecordingHost`] replays
//! every submitted batch into per-surface call logs instead of painting,
//! which makes it the test double for the pipeline and the backend of the
//! `petal` CLI.
//!
//! ```ignore
//! let config = PipelineConfig::default();
//! let host = RecordingHost::new(&config);
//! let log = host.log();
//! let pipeline = Pipeline::new(config, host)?;
//! // ... draw and flush ...
//! for call in log.calls_for(ContextId::PRIMARY) {
//!     println!("{call}");
//! }
//! ```

pub mod call;
pub mod host;
pub mod log;

pub use call::CanvasCall;
pub use host::{RecordedSurface, RecordingHost};
pub use log::{HostStats, LoggedCall, ReplayLog, SurfaceInfo};
