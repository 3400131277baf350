//! Shared replay log

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use petal_core::{ContextId, Op, ReplayStats};
use serde::Serialize;

use crate::call::CanvasCall;

/// A call together with the surface it was made on
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggedCall {
    pub context: u16,
    /// 1-based index of the batch this call was replayed from
    pub batch: u64,
    #[serde(flatten)]
    pub call: CanvasCall,
}

/// Running totals over every batch a host replayed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HostStats {
    pub batches: u64,
    pub records: usize,
    pub applied: usize,
    pub ignored: usize,
    pub missing_surface: usize,
}

impl HostStats {
    fn add(&mut self, records: usize, replay: ReplayStats) {
        self.batches += 1;
        self.records += records;
        self.applied += replay.applied;
        self.ignored += replay.ignored;
        self.missing_surface += replay.missing_surface;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SurfaceInfo {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default)]
struct LogState {
    calls: Vec<LoggedCall>,
    stats: HostStats,
    /// Record count per raw opcode, unknown opcodes included
    opcodes: BTreeMap<u8, usize>,
    surfaces: BTreeMap<u16, SurfaceInfo>,
    created: u64,
    destroyed: u64,
}

/// Cloneable handle to what a [`RecordingHost`](crate::RecordingHost) saw.
///
/// The host itself moves into the pipeline; keep a log handle to inspect
/// the replayed stream afterwards.
#[derive(Clone, Debug, Default)]
pub struct ReplayLog {
    inner: Arc<Mutex<LogState>>,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, context: ContextId, call: CanvasCall) {
        let mut state = self.inner.lock();
        let batch = state.stats.batches + 1;
        state.calls.push(LoggedCall {
            context: context.get(),
            batch,
            call,
        });
    }

    pub(crate) fn count_opcode(&self, raw: u8) {
        *self.inner.lock().opcodes.entry(raw).or_default() += 1;
    }

    pub(crate) fn finish_batch(&self, records: usize, replay: ReplayStats) {
        self.inner.lock().stats.add(records, replay);
    }

    pub(crate) fn surface_created(&self, id: ContextId, width: f32, height: f32) {
        let mut state = self.inner.lock();
        state.created += 1;
        state.surfaces.insert(id.get(), SurfaceInfo { width, height });
    }

    pub(crate) fn surface_resized(&self, id: ContextId, width: f32, height: f32) {
        if let Some(info) = self.inner.lock().surfaces.get_mut(&id.get()) {
            *info = SurfaceInfo { width, height };
        }
    }

    pub(crate) fn surface_destroyed(&self, id: ContextId) {
        let mut state = self.inner.lock();
        state.destroyed += 1;
        state.surfaces.remove(&id.get());
    }

    /// Every call so far, in replay order
    pub fn calls(&self) -> Vec<LoggedCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls made on one surface, in replay order
    pub fn calls_for(&self, id: ContextId) -> Vec<CanvasCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.context == id.get())
            .map(|c| c.call.clone())
            .collect()
    }

    pub fn stats(&self) -> HostStats {
        self.inner.lock().stats
    }

    /// `(opcode, count)` pairs ordered by opcode. Unknown opcodes have no
    /// [`Op`] and are reported by raw value.
    pub fn opcode_counts(&self) -> Vec<(Result<Op, u8>, usize)> {
        self.inner
            .lock()
            .opcodes
            .iter()
            .map(|(&raw, &count)| (Op::try_from(raw), count))
            .collect()
    }

    /// Live surfaces and their sizes, ordered by id
    pub fn surfaces(&self) -> Vec<(u16, SurfaceInfo)> {
        self.inner
            .lock()
            .surfaces
            .iter()
            .map(|(&id, &info)| (id, info))
            .collect()
    }

    pub fn surface(&self, id: ContextId) -> Option<SurfaceInfo> {
        self.inner.lock().surfaces.get(&id.get()).copied()
    }

    /// `(created, destroyed)` surface counts, the primary surface included
    pub fn surface_lifecycle(&self) -> (u64, u64) {
        let state = self.inner.lock();
        (state.created, state.destroyed)
    }

    /// Drop the recorded calls and counters, keep the surface table
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.calls.clear();
        state.opcodes.clear();
        state.stats = HostStats::default();
    }

    /// Pretty JSON export of the calls and totals
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Export<'a> {
            stats: HostStats,
            surfaces: &'a BTreeMap<u16, SurfaceInfo>,
            calls: &'a [LoggedCall],
        }

        let state = self.inner.lock();
        serde_json::to_string_pretty(&Export {
            stats: state.stats,
            surfaces: &state.surfaces,
            calls: &state.calls,
        })
    }
}
