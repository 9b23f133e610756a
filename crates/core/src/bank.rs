//! The GPIO bank: a fixed-length byte view over host memory.
//!
//! PICO-8 exposes 128 GPIO bytes at `0x5F80..0x5FFF`. The emulator owns
//! that memory; the bank only borrows (or owns, when detached) the backing
//! storage and mediates every access the debugger makes:
//!
//! - reads past the end return 0
//! - writes past the end are dropped
//! - written values are clamped to 0..=255
//!
//! Host-side mutation is not tracked. The `changed` mark only records writes
//! made through the bank, so presentation code still re-reads every tick.

use crate::bits;
use crate::error::GpioError;

/// One addressable byte of the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteCell {
    pub index: usize,
    pub value: u8,
}

impl ByteCell {
    /// One-based pin number, as labelled on the panel.
    pub fn pin(&self) -> usize {
        self.index.saturating_add(1)
    }

    /// Host memory address of this cell.
    pub fn address(&self, base: u16) -> u64 {
        (base as u64).saturating_add(self.index as u64)
    }

    pub fn bits(&self) -> [bool; bits::BITS] {
        bits::decode(self.value)
    }
}

/// GPIO bank over storage `M`, defaulting to an owned buffer.
#[derive(Debug, Clone)]
pub struct GpioBank<M = Vec<u8>> {
    mem: M,
    size: usize,
    changed: bool,
}

impl GpioBank<Vec<u8>> {
    /// Detached bank with its own zero-filled storage.
    pub fn new(size: usize) -> Self {
        GpioBank { mem: vec![0u8; size], size, changed: false }
    }
}

impl<M: AsRef<[u8]> + AsMut<[u8]>> GpioBank<M> {
    /// Attach to host-provided storage. The storage must hold at least
    /// `size` bytes; anything beyond `size` is never touched.
    pub fn attach(mem: M, size: usize) -> Result<Self, GpioError> {
        let len = mem.as_ref().len();
        if len < size {
            return Err(GpioError::StorageTooSmall { len, size });
        }
        Ok(GpioBank { mem, size, changed: false })
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn read(&self, index: usize) -> u8 {
        if index < self.size { self.mem.as_ref()[index] } else { 0 }
    }

    /// Store `value` clamped to a byte. Out-of-range indices are ignored.
    #[inline]
    pub fn write(&mut self, index: usize, value: i64) {
        if index >= self.size { return; }
        self.mem.as_mut()[index] = value.clamp(0, 255) as u8;
        self.changed = true;
    }

    /// Copy of the current bank contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.mem.as_ref()[..self.size].to_vec()
    }

    /// Zero every cell. With `preserve_first`, cell 0 (the negotiation
    /// byte) keeps its value.
    pub fn clear(&mut self, preserve_first: bool) {
        let start = if preserve_first { 1 } else { 0 };
        let size = self.size;
        for b in self.mem.as_mut()[..size].iter_mut().skip(start) {
            *b = 0;
        }
        self.changed = true;
    }

    pub fn cell(&self, index: usize) -> Option<ByteCell> {
        if index < self.size {
            Some(ByteCell { index, value: self.mem.as_ref()[index] })
        } else {
            None
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = ByteCell> + '_ {
        self.mem.as_ref()[..self.size]
            .iter()
            .enumerate()
            .map(|(index, &value)| ByteCell { index, value })
    }

    /// Whether the bank was written since the last `take_changed`.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Return and reset the changed mark.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Underlying host storage.
    pub fn storage(&self) -> &M {
        &self.mem
    }

    pub fn into_storage(self) -> M {
        self.mem
    }
}
