//! Host rasterizer boundary
//!
//! A flush hands the whole tape to the host in one [`RasterHost::submit`]
//! call. The host receives a [`Batch`]: the raw record bytes, the record
//! count and the fixed stride, plus access to the text buffers referenced by
//! text records. Nothing comes back except a success/failure signal.
//!
//! Surface lifecycle (create/resize/destroy for an id) goes through the same
//! trait but is immediate rather than taped.

use std::ffi::CString;
use std::fmt;

use crate::error::HostError;
use crate::instruction::{Instruction, STRIDE};
use crate::slots::ContextId;
use crate::text::{TextHandle, TextPool};

/// The external rasterizer that replays batches against its surfaces
pub trait RasterHost: Send {
    /// Apply every record of the batch, in order
    fn submit(&mut self, batch: Batch<'_>) -> Result<(), HostError>;

    /// Create the surface backing `id` with the given pixel size
    fn create_surface(&mut self, id: ContextId, width: f32, height: f32);

    /// Resize the surface backing `id`
    fn resize_surface(&mut self, id: ContextId, width: f32, height: f32);

    /// Drop the surface backing `id`. Never called for the primary surface.
    fn destroy_surface(&mut self, id: ContextId);
}

/// One submission: an immutable run of records plus their text buffers
pub struct Batch<'a> {
    bytes: &'a [u8],
    stride: usize,
    texts: &'a mut TextPool,
}

impl<'a> Batch<'a> {
    pub(crate) fn new(bytes: &'a [u8], texts: &'a mut TextPool) -> Self {
        Self {
            bytes,
            stride: STRIDE,
            texts,
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.bytes.len() / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Distance in bytes between consecutive records
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The records as laid out on the tape
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decode the record at `index`
    pub fn get(&self, index: usize) -> Option<Instruction> {
        let start = index.checked_mul(self.stride)?;
        let record = self.bytes.get(start..start.checked_add(STRIDE)?)?;
        Some(bytemuck::pod_read_unaligned(record))
    }

    /// Records in append order. The iterator borrows the record bytes only,
    /// so text buffers can be taken while iterating.
    pub fn records(&self) -> Records<'a> {
        Records {
            chunks: self.bytes.chunks_exact(self.stride),
        }
    }

    /// Take ownership of a text buffer. Each buffer can be taken once;
    /// buffers never taken are released when the tape resets.
    pub fn take_text(&mut self, handle: TextHandle) -> Option<CString> {
        self.texts.take(handle)
    }
}

impl fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("len", &self.len())
            .field("stride", &self.stride)
            .field("texts", &self.texts.live())
            .finish()
    }
}

/// Iterator over the records of a [`Batch`]
#[derive(Clone)]
pub struct Records<'a> {
    chunks: std::slice::ChunksExact<'a, u8>,
}

impl Iterator for Records<'_> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Instruction> {
        self.chunks
            .next()
            .map(|chunk| bytemuck::pod_read_unaligned(&chunk[..STRIDE]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Records<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Op;

    #[test]
    fn test_get_out_of_range() {
        let records = [
            Instruction::with_payload(Op::FillRect, ContextId::PRIMARY, &[1.0, 2.0, 3.0, 4.0]),
            Instruction::new(Op::Fill, ContextId::new(3)),
        ];
        let mut texts = TextPool::new();
        let batch = Batch::new(bytemuck::cast_slice(&records), &mut texts);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get(0), Some(records[0]));
        assert_eq!(batch.get(1), Some(records[1]));
        assert_eq!(batch.get(2), None);
        // Offset fits in usize but the record end does not
        assert_eq!(batch.get(usize::MAX / STRIDE), None);
        assert_eq!(batch.get(usize::MAX), None);
    }
}
