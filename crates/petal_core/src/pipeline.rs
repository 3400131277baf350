//! Pipeline - tape, context slots and host behind one lock
//!
//! The pipeline is the single coordinating object of the system. Renderers
//! borrow it to append records and to lease context ids; a flush hands the
//! tape to the host in one call. Everything sits behind one mutex so that
//! appends, flushes, leases and releases are totally ordered: replay order
//! is append order, whatever thread the records came from.
//!
//! # Architecture
//!
//! ```text
//! Renderer calls
//!        │ encode
//!        ▼
//! ┌─────────────────┐   full?   ┌──────────────┐
//! │      Tape       │ ───────▶  │    flush     │ ── one submit(Batch) ──▶ RasterHost
//! └─────────────────┘           └──────────────┘
//! ```

use parking_lot::Mutex;

use crate::config::PipelineConfig;
use crate::error::{Error, HostError, Result};
use crate::host::{Batch, RasterHost};
use crate::instruction::{Instruction, Op};
use crate::slots::{ContextId, ContextSlots};
use crate::tape::Tape;

pub struct Pipeline {
    config: PipelineConfig,
    inner: Mutex<Inner>,
}

struct Inner {
    tape: Tape,
    slots: ContextSlots,
    host: Box<dyn RasterHost>,
    /// A renderer is currently bound to the primary context
    primary_bound: bool,
}

impl Pipeline {
    /// Create a pipeline submitting to `host`. The host must already have
    /// the primary surface.
    pub fn new(config: PipelineConfig, host: impl RasterHost + 'static) -> Result<Self> {
        config.validate()?;
        tracing::debug!(capacity = config.tape_capacity, "pipeline created");
        Ok(Self {
            inner: Mutex::new(Inner {
                tape: Tape::with_capacity(config.tape_capacity),
                slots: ContextSlots::new(),
                host: Box::new(host),
                primary_bound: false,
            }),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // === Recording ===

    /// Append a record. If the tape is full it is flushed first, so the
    /// record lands at index 0 of the fresh tape. Never drops a record.
    ///
    /// # Panics
    ///
    /// If the implicit flush fails (see [`Pipeline::flush`]).
    pub fn append(&self, record: Instruction) {
        self.inner.lock().append(record);
    }

    /// Append a text record, copying `text` into the tape's text pool.
    ///
    /// If the text cannot be stored (interior NUL, allocation failure) the
    /// record is dropped and nothing is drawn; returns whether it was appended.
    pub fn append_text(&self, op: Op, ctx: ContextId, text: &str) -> bool {
        let mut inner = self.inner.lock();
        // Flush before storing the text so the handle belongs to the same
        // tape generation as its record.
        if inner.tape.is_full() {
            inner.flush_or_panic();
        }
        match inner.tape.insert_text(text) {
            Ok(handle) => {
                inner.append(Instruction::with_text(op, ctx, handle));
                true
            }
            Err(err) => {
                tracing::warn!(%ctx, %op, %err, "dropping text instruction");
                false
            }
        }
    }

    // === Flushing ===

    /// Submit every pending record to the host in one call, then reset the
    /// tape. No-op when nothing is pending.
    ///
    /// # Panics
    ///
    /// If the host fails the batch. The batch is gone at that point and the
    /// caller-side state no longer matches what was painted, so this is
    /// fatal. Use [`Pipeline::try_flush`] to handle the error instead.
    pub fn flush(&self) {
        self.inner.lock().flush_or_panic();
    }

    /// Like [`Pipeline::flush`] but reports host failure. The tape is reset
    /// and its text buffers released either way; nothing is retried.
    pub fn try_flush(&self) -> Result<()> {
        self.inner.lock().flush().map_err(Error::from)
    }

    /// Records waiting for the next flush
    pub fn pending(&self) -> usize {
        self.inner.lock().tape.len()
    }

    /// Copy of the pending records, in append order
    pub fn pending_records(&self) -> Vec<Instruction> {
        self.inner.lock().tape.records().to_vec()
    }

    /// Text buffers waiting for the next flush
    pub fn pending_texts(&self) -> usize {
        self.inner.lock().tape.texts().live()
    }

    /// Number of batches submitted so far
    pub fn rollovers(&self) -> u64 {
        self.inner.lock().tape.rollovers()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().tape.capacity()
    }

    // === Contexts ===

    /// Lease a context id and create its (1x1) host surface
    pub fn lease_context(&self) -> Result<ContextId> {
        let mut inner = self.inner.lock();
        let id = inner.slots.lease()?;
        inner.host.create_surface(id, 1.0, 1.0);
        tracing::debug!(%id, "created surface");
        Ok(id)
    }

    /// Release a leased id.
    ///
    /// Records already on the tape for `id` still replay at the next flush:
    /// its host surface is destroyed, and the id becomes leasable again,
    /// only once that flush has submitted them. With nothing pending both
    /// happen right away.
    pub fn release_context(&self, id: ContextId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.slots.retire(id)?;
        if inner.tape.is_empty() {
            inner.destroy_retired();
        } else {
            tracing::debug!(%id, "surface removal deferred to next flush");
        }
        Ok(())
    }

    /// Resize the host surface for `id`. Immediate, not taped.
    pub fn resize_surface(&self, id: ContextId, width: f32, height: f32) {
        self.inner.lock().host.resize_surface(id, width, height);
    }

    pub fn is_leased(&self, id: ContextId) -> bool {
        self.inner.lock().slots.is_leased(id)
    }

    /// Released ids whose surfaces wait for the next flush
    pub fn pending_releases(&self) -> usize {
        self.inner.lock().slots.retired()
    }

    /// Live context ids, primary first
    pub fn live_contexts(&self) -> Vec<ContextId> {
        self.inner.lock().slots.live().collect()
    }

    /// Mark the primary context as bound to a renderer. Fails if it already is.
    pub fn claim_primary(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.primary_bound {
            return Err(Error::PrimaryInUse);
        }
        inner.primary_bound = true;
        Ok(())
    }

    /// Undo [`Pipeline::claim_primary`]
    pub fn unclaim_primary(&self) {
        self.inner.lock().primary_bound = false;
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Pipeline")
            .field("pending", &inner.tape.len())
            .field("capacity", &inner.tape.capacity())
            .field("rollovers", &inner.tape.rollovers())
            .field("contexts", &inner.slots.live_count())
            .finish()
    }
}

/// Resets the tape when dropped, so a panicking host cannot leave a
/// half-replayed batch behind to be submitted again.
struct ResetOnDrop<'a>(&'a mut Tape);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.reset();
    }
}

impl Inner {
    fn append(&mut self, record: Instruction) {
        if let Err(record) = self.tape.try_push(record) {
            self.flush_or_panic();
            let pushed = self.tape.try_push(record);
            debug_assert!(pushed.is_ok(), "freshly flushed tape must accept a record");
        }
    }

    fn flush(&mut self) -> std::result::Result<(), HostError> {
        if self.tape.is_empty() {
            self.destroy_retired();
            return Ok(());
        }
        self.tape.mark_rollover();
        tracing::trace!(
            count = self.tape.len(),
            rollover = self.tape.rollovers(),
            "flushing tape"
        );

        let mut tape = ResetOnDrop(&mut self.tape);
        let (bytes, texts) = tape.0.parts_mut();
        let result = self.host.submit(Batch::new(bytes, texts));
        drop(tape);
        self.destroy_retired();
        result
    }

    /// Destroy the surfaces of released ids and make the ids leasable again
    fn destroy_retired(&mut self) {
        for id in self.slots.recycle() {
            self.host.destroy_surface(id);
            tracing::debug!(%id, "removed surface");
        }
    }

    fn flush_or_panic(&mut self) {
        if let Err(err) = self.flush() {
            tracing::error!(%err, "flush failed, batch lost");
            panic!("raster host failed to replay batch: {err}");
        }
    }
}
