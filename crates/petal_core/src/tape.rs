//! Instruction tape
//!
//! A bounded, append-only run of [`Instruction`]s plus the text buffers they
//! reference. Storage is allocated once at the configured capacity and only
//! the cursor moves afterwards. The tape never flushes itself: the
//! [`Pipeline`](crate::Pipeline) owns both the tape and the host and flushes
//! when [`Tape::try_push`] reports that the tape is full.

use crate::error::Result;
use crate::instruction::Instruction;
use crate::text::{TextHandle, TextPool};

#[derive(Debug)]
pub struct Tape {
    records: Vec<Instruction>,
    capacity: usize,
    rollovers: u64,
    texts: TextPool,
}

impl Tape {
    /// Create a tape holding at most `capacity` records (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            rollovers: 0,
            texts: TextPool::new(),
        }
    }

    /// Append a record, or hand it back if the tape is full
    pub fn try_push(&mut self, record: Instruction) -> std::result::Result<(), Instruction> {
        if self.is_full() {
            return Err(record);
        }
        self.records.push(record);
        Ok(())
    }

    /// Store a text buffer for a record that is about to be pushed
    pub fn insert_text(&mut self, text: &str) -> Result<TextHandle> {
        self.texts.insert(text)
    }

    /// Drop every record and text buffer. Storage is kept.
    pub fn reset(&mut self) {
        self.records.clear();
        self.texts.clear();
    }

    /// Count one submission of the tape (diagnostics only)
    pub(crate) fn mark_rollover(&mut self) {
        self.rollovers += 1;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of times the tape has been submitted
    pub fn rollovers(&self) -> u64 {
        self.rollovers
    }

    /// Pending records in append order
    pub fn records(&self) -> &[Instruction] {
        &self.records
    }

    /// Pending records as one contiguous byte run, `STRIDE` bytes per record
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    pub fn texts(&self) -> &TextPool {
        &self.texts
    }

    /// Split borrow used by the dispatcher: records as bytes plus the pool
    pub(crate) fn parts_mut(&mut self) -> (&[u8], &mut TextPool) {
        (bytemuck::cast_slice(&self.records), &mut self.texts)
    }
}
