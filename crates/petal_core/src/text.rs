//! Text buffers referenced by text instructions
//!
//! Text instructions cannot carry a string inline, so the string is copied
//! into a null-terminated buffer owned by the tape's [`TextPool`] and the
//! record stores a [`TextHandle`]. During replay the host takes each buffer
//! out of the pool, which moves ownership to it for the rest of that record.
//! The pool is cleared whenever the tape resets, so a buffer the host never
//! took (or a host that panicked half way) still gets released exactly once.

use std::ffi::CString;
use std::num::NonZeroU32;

use crate::error::{Error, Result};

/// Handle to a pooled text buffer. Encoded as `index + 1` so that 0 can mean
/// "no text" on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextHandle(NonZeroU32);

impl TextHandle {
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(TextHandle)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Arena of null-terminated text buffers for one tape generation
#[derive(Debug, Default)]
pub struct TextPool {
    slots: Vec<Option<CString>>,
}

impl TextPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `text` into a new null-terminated buffer.
    ///
    /// Fails when the text contains an interior NUL (it cannot be represented
    /// as a C string) or when the buffer cannot be allocated.
    pub fn insert(&mut self, text: &str) -> Result<TextHandle> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(text.len() + 1)
            .map_err(|e| Error::TextRejected(e.to_string()))?;
        bytes.extend_from_slice(text.as_bytes());
        let buffer = CString::new(bytes).map_err(|e| Error::TextRejected(e.to_string()))?;

        self.slots
            .try_reserve(1)
            .map_err(|e| Error::TextRejected(e.to_string()))?;
        let handle = u32::try_from(self.slots.len() + 1)
            .ok()
            .and_then(TextHandle::from_raw)
            .ok_or_else(|| Error::TextRejected("text pool is full".into()))?;
        self.slots.push(Some(buffer));

        Ok(handle)
    }

    /// Move a buffer out of the pool. Returns `None` if the handle is unknown
    /// or was already taken.
    pub fn take(&mut self, handle: TextHandle) -> Option<CString> {
        self.slots.get_mut(handle.index())?.take()
    }

    /// Borrow a buffer without taking it
    pub fn get(&self, handle: TextHandle) -> Option<&CString> {
        self.slots.get(handle.index())?.as_ref()
    }

    /// Number of buffers still owned by the pool
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Release every remaining buffer. Keeps the slot storage.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
