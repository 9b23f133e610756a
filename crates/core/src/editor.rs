//! Single-cell editor.
//!
//! At most one edit session is open at a time. A session stages a value for
//! one cell and keeps it in step with its bit array: setting the value
//! re-decodes the bits, toggling a bit re-encodes the value. Nothing reaches
//! the bank until [`CellEditor::commit`].

use crate::bank::GpioBank;
use crate::bits::{self, BITS};

/// Staged edit for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSession {
    pub target: usize,
    value: u8,
    bits: [bool; BITS],
}

impl EditSession {
    fn new(target: usize, value: u8) -> Self {
        EditSession { target, value, bits: bits::decode(value) }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn bits(&self) -> [bool; BITS] {
        self.bits
    }
}

/// Editor state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellEditor {
    #[default]
    Closed,
    Open(EditSession),
}

impl CellEditor {
    pub fn new() -> Self {
        CellEditor::Closed
    }

    /// Start editing `index`, dropping any uncommitted session.
    pub fn open<M: AsRef<[u8]> + AsMut<[u8]>>(&mut self, bank: &GpioBank<M>, index: usize) {
        if let CellEditor::Open(prev) = self {
            log::debug!("discarding uncommitted edit of cell {}", prev.target);
        }
        *self = CellEditor::Open(EditSession::new(index, bank.read(index)));
    }

    /// Stage a new value, clamped to a byte.
    pub fn set_value(&mut self, value: i64) {
        if let CellEditor::Open(s) = self {
            s.value = value.clamp(0, 255) as u8;
            s.bits = bits::decode(s.value);
        }
    }

    /// Flip display bit `i` (0 = MSB). Indices past 7 are ignored.
    pub fn toggle_bit(&mut self, i: usize) {
        if let CellEditor::Open(s) = self {
            if i >= BITS { return; }
            s.bits[i] = !s.bits[i];
            s.value = bits::encode(&s.bits);
        }
    }

    /// Write the staged value and close.
    pub fn commit<M: AsRef<[u8]> + AsMut<[u8]>>(&mut self, bank: &mut GpioBank<M>) {
        if let CellEditor::Open(s) = std::mem::take(self) {
            bank.write(s.target, s.value as i64);
            log::debug!("cell {} <- {}", s.target, s.value);
        }
    }

    /// Stage zero and commit.
    pub fn clear_and_commit<M: AsRef<[u8]> + AsMut<[u8]>>(&mut self, bank: &mut GpioBank<M>) {
        self.set_value(0);
        self.commit(bank);
    }

    /// Close without writing.
    pub fn discard(&mut self) {
        *self = CellEditor::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, CellEditor::Open(_))
    }

    pub fn session(&self) -> Option<&EditSession> {
        match self {
            CellEditor::Open(s) => Some(s),
            CellEditor::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_commit() {
        let mut bank = GpioBank::new(128);
        bank.write(5, 42);
        let mut ed = CellEditor::new();
        ed.open(&bank, 5);
        ed.toggle_bit(1);
        assert_eq!(ed.session().unwrap().value(), 106);
        ed.commit(&mut bank);
        assert_eq!(bank.read(5), 42 ^ 64);
        assert!(!ed.is_open());
    }

    #[test]
    fn test_set_value_syncs_bits() {
        let bank = GpioBank::new(128);
        let mut ed = CellEditor::new();
        ed.open(&bank, 0);
        ed.set_value(0x81);
        let s = ed.session().unwrap();
        assert_eq!(s.bits(), [true, false, false, false, false, false, false, true]);
        ed.set_value(1000);
        assert_eq!(ed.session().unwrap().value(), 255);
        ed.set_value(-3);
        assert_eq!(ed.session().unwrap().bits(), [false; BITS]);
    }

    #[test]
    fn test_nothing_written_before_commit() {
        let mut bank = GpioBank::new(128);
        let mut ed = CellEditor::new();
        ed.open(&bank, 3);
        ed.set_value(200);
        ed.toggle_bit(7);
        assert_eq!(bank.read(3), 0);
        assert!(!bank.is_changed());
        ed.commit(&mut bank);
        assert_eq!(bank.read(3), 201);
    }

    #[test]
    fn test_discard() {
        let mut bank = GpioBank::new(128);
        let mut ed = CellEditor::new();
        ed.open(&bank, 3);
        ed.set_value(9);
        ed.discard();
        assert_eq!(ed, CellEditor::Closed);
        ed.commit(&mut bank);
        assert_eq!(bank.read(3), 0);
    }

    #[test]
    fn test_reopen_drops_prior_session() {
        let mut bank = GpioBank::new(128);
        bank.write(2, 11);
        let mut ed = CellEditor::new();
        ed.open(&bank, 1);
        ed.set_value(50);
        ed.open(&bank, 2);
        let s = ed.session().unwrap();
        assert_eq!(s.target, 2);
        assert_eq!(s.value(), 11);
        ed.commit(&mut bank);
        assert_eq!(bank.read(1), 0);
        assert_eq!(bank.read(2), 11);
    }

    #[test]
    fn test_clear_and_commit() {
        let mut bank = GpioBank::new(128);
        bank.write(7, 0xFF);
        let mut ed = CellEditor::new();
        ed.open(&bank, 7);
        ed.clear_and_commit(&mut bank);
        assert_eq!(bank.read(7), 0);
        assert!(!ed.is_open());
    }

    #[test]
    fn test_closed_editor_ignores_input() {
        let mut bank = GpioBank::new(128);
        let mut ed = CellEditor::new();
        ed.set_value(5);
        ed.toggle_bit(0);
        ed.clear_and_commit(&mut bank);
        assert!(!ed.is_open());
        assert!(!bank.is_changed());
    }

    #[test]
    fn test_toggle_out_of_range_bit() {
        let bank = GpioBank::new(128);
        let mut ed = CellEditor::new();
        ed.open(&bank, 0);
        ed.toggle_bit(8);
        assert_eq!(ed.session().unwrap().value(), 0);
    }

    #[test]
    fn test_out_of_range_target() {
        let mut bank = GpioBank::new(128);
        let mut ed = CellEditor::new();
        ed.open(&bank, 200);
        assert_eq!(ed.session().unwrap().value(), 0);
        ed.set_value(5);
        ed.commit(&mut bank);
        assert!(bank.snapshot().iter().all(|&v| v == 0));
    }
}
