//! Text views of the GPIO bank.
//!
//! - **Bank dump**: 16 cells per line with host addresses
//! - **Diff**: changed cells between two snapshots, down to the bit pattern
//! - **Cell description**: pin number, value, address, and bits (the panel tooltip)
//! - **Watch rows**: labelled bit fields for selected pins

use crate::bits;
use crate::config::WatchPin;

/// Format a hex dump of the bank.
///
/// Each line shows the host address of its first cell, then 16 hex values.
pub fn dump_bank(data: &[u8], base: u16) -> String {
    let mut s = String::new();
    for (row, chunk) in data.chunks(16).enumerate() {
        let first = row * 16;
        s.push_str(&format!("{:04X} [{:3}]: ", base as usize + first, first + 1));
        for (i, v) in chunk.iter().enumerate() {
            s.push_str(&format!("{:02X} ", v));
            if i == 7 { s.push(' '); }
        }
        s.push('\n');
    }
    s
}

/// Format the cells that differ between two snapshots, with their bits.
pub fn dump_bank_diff(old: &[u8], new: &[u8], base: u16) -> String {
    let mut s = String::new();
    let end = old.len().min(new.len());
    let mut any = false;
    for i in 0..end {
        if old[i] != new[i] {
            s.push_str(&format!("  Pin {:3} (0x{:04X}): {:02X} → {:02X}  {} → {}  ^{:08b}\n",
                i + 1, base as usize + i, old[i], new[i],
                bits::render(old[i]), bits::render(new[i]), old[i] ^ new[i]));
            any = true;
        }
    }
    if !any { s.push_str("  (no changes)\n"); }
    s
}

/// Describe one cell the way the panel tooltip does.
pub fn describe_cell(index: usize, value: u8, base: u16) -> String {
    format!("Pin {}: {} (0x{:02x})\nMemory: 0x{:04X}\n{}",
        index.saturating_add(1), value, value,
        (base as u64).saturating_add(index as u64), bits::render(value))
}

/// Format the labelled bit rows for the watched pins.
pub fn dump_watch(data: &[u8], watch: &[WatchPin]) -> String {
    let width = watch.iter().map(|w| w.label.len()).max().unwrap_or(0);
    let mut s = String::new();
    for w in watch {
        let v = data.get(w.index).copied().unwrap_or(0);
        s.push_str(&format!("  {:<width$}  {}  {:3} (0x{:02X})\n",
            w.label, bits::render(v), v, v, width = width));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_bank() {
        let mut data = vec![0u8; 32];
        data[0] = 0x41;
        data[17] = 0xFF;
        let dump = dump_bank(&data, 0x5F80);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("5F80 [  1]: 41 00"));
        assert!(lines[1].starts_with("5F90 [ 17]: 00 FF"));
    }

    #[test]
    fn test_dump_bank_diff() {
        let old = vec![0u8; 8];
        let mut new = old.clone();
        new[5] = 0x6A;
        let diff = dump_bank_diff(&old, &new, 0x5F80);
        assert!(diff.contains("Pin   6 (0x5F85): 00 → 6A"));
        assert!(diff.contains("^01101010"));
        assert_eq!(diff.lines().count(), 1);
        assert_eq!(dump_bank_diff(&old, &old, 0x5F80), "  (no changes)\n");
    }

    #[test]
    fn test_describe_cell() {
        let d = describe_cell(5, 42, 0x5F80);
        assert_eq!(d, "Pin 6: 42 (0x2a)\nMemory: 0x5F85\n□□■□■□■□");
    }

    #[test]
    fn test_describe_cell_extreme_index() {
        let d = describe_cell(usize::MAX, 0, 0x5F80);
        assert!(d.starts_with(&format!("Pin {}: 0 (0x00)", usize::MAX)));
        assert!(d.contains(&format!("Memory: 0x{:04X}", 0x5F80u64.saturating_add(usize::MAX as u64))));
    }

    #[test]
    fn test_dump_watch() {
        let data = [0x80u8, 0x01];
        let watch = [WatchPin::new(0, "Negotiator (Pin 1)"), WatchPin::new(1, "Player1 (Pin 2)")];
        let out = dump_watch(&data, &watch);
        assert!(out.contains("Negotiator (Pin 1)  ■□□□□□□□  128 (0x80)"));
        assert!(out.contains("Player1 (Pin 2)     □□□□□□□■    1 (0x01)"));
    }

    #[test]
    fn test_dump_watch_out_of_range() {
        let out = dump_watch(&[1u8], &[WatchPin::new(9, "x")]);
        assert!(out.contains("□□□□□□□□    0"));
    }
}
