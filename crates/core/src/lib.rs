//! # gpio-core
//!
//! State model and frame playback engine for the PICO-8 GPIO debugger.
//!
//! PICO-8 maps 128 bytes of general-purpose I/O at `0x5F80..0x5FFF`. Carts
//! and the page hosting them talk through this window, so being able to
//! watch it, poke single bits, and replay recorded traffic is most of what
//! debugging such a protocol takes.
//!
//! ## Architecture
//!
//! - [`Inspector`] — Top-level object wiring bank, player, and editor together
//! - [`GpioBank`] — Fixed-size byte view over host-owned memory
//! - [`bits`] — Byte ↔ 8-bit array codec (MSB first)
//! - [`FramePlayer`] — Recorded frame sequence with a playback cursor
//! - [`CellEditor`] — Single-cell edit session with value/bit synchronization
//! - [`debugger`] — Hex dump, bit-level diff, cell description, watch rows
//! - [`frames`] — Frame document model (JSON)
//!
//! ## Ticks
//!
//! Nothing here schedules itself. The host calls [`Inspector::tick`] from its
//! own update loop and redraws from the returned snapshot.

pub mod bits;
pub mod bank;
pub mod frames;
pub mod player;
pub mod editor;
pub mod config;
pub mod debugger;
pub mod error;

pub use bank::{ByteCell, GpioBank};
pub use config::{InspectorConfig, WatchPin};
pub use editor::{CellEditor, EditSession};
pub use error::GpioError;
pub use frames::{Frame, FrameSequence};
pub use player::{FramePlayer, PlaybackStatus};

use std::path::Path;

/// Number of GPIO bytes exposed by PICO-8
pub const GPIO_SIZE: usize = 128;
/// PICO-8 address of GPIO pin 1
pub const MEMORY_BASE_ADDRESS: u16 = 0x5F80;
/// PICO-8 base RAM size (the host image the frontends attach to)
pub const HOST_RAM_SIZE: usize = 0x8000;

/// Result of one display tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    /// Current bank contents
    pub cells: Vec<u8>,
    /// True if the inspector itself wrote the bank since the previous tick
    pub changed: bool,
}

/// GPIO inspector: bank, frame player, and cell editor.
pub struct Inspector<M = Vec<u8>> {
    pub bank: GpioBank<M>,
    pub player: FramePlayer,
    pub editor: CellEditor,
    pub config: InspectorConfig,
}

impl Inspector<Vec<u8>> {
    /// Inspector with its own zero-filled bank.
    pub fn new(config: InspectorConfig) -> Self {
        Inspector {
            bank: GpioBank::new(config.size),
            player: FramePlayer::new(),
            editor: CellEditor::new(),
            config,
        }
    }
}

impl Default for Inspector<Vec<u8>> {
    fn default() -> Self {
        Self::new(InspectorConfig::default())
    }
}

impl<M: AsRef<[u8]> + AsMut<[u8]>> Inspector<M> {
    /// Inspector over host-owned GPIO memory.
    pub fn attach(mem: M, config: InspectorConfig) -> Result<Self, GpioError> {
        Ok(Inspector {
            bank: GpioBank::attach(mem, config.size)?,
            player: FramePlayer::new(),
            editor: CellEditor::new(),
            config,
        })
    }

    /// Snapshot the bank for display.
    pub fn tick(&mut self) -> Refresh {
        Refresh {
            cells: self.bank.snapshot(),
            changed: self.bank.take_changed(),
        }
    }

    // --- Bank controls ---

    /// "Clear": zero everything except the negotiation byte.
    pub fn clear_preserve_first(&mut self) {
        self.bank.clear(true);
    }

    /// "Clear ALL".
    pub fn clear_all(&mut self) {
        self.bank.clear(false);
    }

    // --- Frame controls ---

    /// Parse and load a frame document. Bad documents are logged and leave
    /// the current frames and bank untouched.
    pub fn load_frame_document(&mut self, text: &str) -> bool {
        match FrameSequence::from_json(text) {
            Ok(seq) => self.load_frames(seq),
            Err(e) => {
                log::warn!("Failed to load frames: {}", e);
                false
            }
        }
    }

    /// Read and load a frame document from disk.
    pub fn load_frame_file(&mut self, path: &Path) -> bool {
        match FrameSequence::from_path(path) {
            Ok(seq) => self.load_frames(seq),
            Err(e) => {
                log::warn!("Failed to load frames from {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn load_frames(&mut self, seq: FrameSequence) -> bool {
        let n = seq.len();
        let loaded = self.player.load(seq, &mut self.bank);
        if loaded { log::info!("Loaded {} frames", n); }
        loaded
    }

    pub fn next_frame(&mut self) -> bool {
        self.player.next(&mut self.bank)
    }

    pub fn prev_frame(&mut self) -> bool {
        self.player.prev(&mut self.bank)
    }

    /// Jump to a one-based frame number.
    pub fn seek_frame(&mut self, one_based: usize) -> bool {
        self.player.seek(one_based, &mut self.bank)
    }

    pub fn frame_status(&self) -> PlaybackStatus {
        self.player.status()
    }

    // --- Editor controls ---

    pub fn open_cell_editor(&mut self, index: usize) {
        self.editor.open(&self.bank, index);
    }

    pub fn commit_edit(&mut self) {
        self.editor.commit(&mut self.bank);
    }

    /// The editor's "Clear" button: zero the edited cell and close.
    pub fn clear_cell(&mut self) {
        self.editor.clear_and_commit(&mut self.bank);
    }

    pub fn discard_edit(&mut self) {
        self.editor.discard();
    }

    // --- Views ---

    pub fn address_of(&self, index: usize) -> u64 {
        self.config.address_of(index)
    }

    /// Tooltip text for a cell.
    pub fn describe_cell(&self, index: usize) -> String {
        debugger::describe_cell(index, self.bank.read(index), self.config.base_address)
    }

    pub fn dump_bank(&self) -> String {
        debugger::dump_bank(&self.bank.snapshot(), self.config.base_address)
    }

    pub fn dump_watch(&self) -> String {
        debugger::dump_watch(&self.bank.snapshot(), &self.config.watch)
    }
}
