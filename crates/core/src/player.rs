//! Frame playback.
//!
//! The player holds the loaded [`FrameSequence`] and a cursor. Every cursor
//! move applies the addressed frame to the bank; moves past either end are
//! no-ops (no wraparound). Frames are applied on top of whatever the bank
//! holds, so a sparse frame only overwrites the cells it names.

use std::fmt;

use crate::bank::GpioBank;
use crate::frames::{Frame, FrameSequence};

/// Frame count and one-based position, for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub count: usize,
    /// One-based index of the applied frame, `None` before the first load.
    pub current: Option<usize>,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current {
            Some(cur) if self.count > 0 => write!(f, "Frame {}/{}", cur, self.count),
            _ => write!(f, "No frames loaded"),
        }
    }
}

/// Frame sequence plus playback cursor.
#[derive(Debug, Clone, Default)]
pub struct FramePlayer {
    frames: Vec<Frame>,
    cursor: Option<usize>,
}

impl FramePlayer {
    pub fn new() -> Self {
        FramePlayer { frames: Vec::new(), cursor: None }
    }

    /// Replace the sequence and apply its first frame. An empty sequence is
    /// rejected and leaves the player untouched.
    pub fn load<M: AsRef<[u8]> + AsMut<[u8]>>(
        &mut self,
        seq: FrameSequence,
        bank: &mut GpioBank<M>,
    ) -> bool {
        if seq.frames.is_empty() {
            log::debug!("ignoring empty frame sequence");
            return false;
        }
        self.frames = seq.frames;
        self.move_to(0, bank);
        true
    }

    /// Advance one frame. Returns false at the last frame.
    pub fn next<M: AsRef<[u8]> + AsMut<[u8]>>(&mut self, bank: &mut GpioBank<M>) -> bool {
        match self.cursor {
            Some(cur) if cur + 1 < self.frames.len() => {
                self.move_to(cur + 1, bank);
                true
            }
            _ => false,
        }
    }

    /// Step back one frame. Returns false at frame 1.
    pub fn prev<M: AsRef<[u8]> + AsMut<[u8]>>(&mut self, bank: &mut GpioBank<M>) -> bool {
        match self.cursor {
            Some(cur) if cur > 0 => {
                self.move_to(cur - 1, bank);
                true
            }
            _ => false,
        }
    }

    /// Jump to a one-based frame number. Out-of-range numbers are rejected.
    pub fn seek<M: AsRef<[u8]> + AsMut<[u8]>>(
        &mut self,
        one_based: usize,
        bank: &mut GpioBank<M>,
    ) -> bool {
        if one_based < 1 || one_based > self.frames.len() {
            return false;
        }
        self.move_to(one_based - 1, bank);
        true
    }

    fn move_to<M: AsRef<[u8]> + AsMut<[u8]>>(&mut self, index: usize, bank: &mut GpioBank<M>) {
        self.cursor = Some(index);
        if let Some(frame) = self.frames.get(index) {
            frame.apply(bank);
            log::debug!("frame {}/{} applied ({} values at {})",
                index + 1, self.frames.len(), frame.pin_values.len(), frame.pin_offset);
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            count: self.frames.len(),
            current: self.cursor.map(|c| c + 1),
        }
    }

    /// Zero-based cursor.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.cursor.and_then(|c| self.frames.get(c))
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame `i` writes `i + 1` into cell 0.
    fn counting_seq(n: usize) -> FrameSequence {
        FrameSequence::new((0..n).map(|i| Frame::new(0, vec![i as i64 + 1])).collect())
    }

    #[test]
    fn test_initial_status() {
        let p = FramePlayer::new();
        assert_eq!(p.status(), PlaybackStatus { count: 0, current: None });
        assert_eq!(p.status().to_string(), "No frames loaded");
        assert!(p.current_frame().is_none());
    }

    #[test]
    fn test_load_applies_first_frame() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        assert!(p.load(counting_seq(3), &mut bank));
        assert_eq!(p.cursor(), Some(0));
        assert_eq!(bank.read(0), 1);
        assert_eq!(p.status().to_string(), "Frame 1/3");
    }

    #[test]
    fn test_load_empty_is_rejected() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        p.load(counting_seq(2), &mut bank);
        p.next(&mut bank);
        bank.take_changed();
        assert!(!p.load(FrameSequence::default(), &mut bank));
        assert_eq!(p.len(), 2);
        assert_eq!(p.cursor(), Some(1));
        assert!(!bank.is_changed());
    }

    #[test]
    fn test_load_replaces_and_resets() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        p.load(counting_seq(5), &mut bank);
        p.seek(4, &mut bank);
        p.load(FrameSequence::new(vec![Frame::new(1, vec![7])]), &mut bank);
        assert_eq!(p.status(), PlaybackStatus { count: 1, current: Some(1) });
        assert_eq!(bank.read(1), 7);
        // cell 0 keeps what the old sequence wrote
        assert_eq!(bank.read(0), 4);
    }

    #[test]
    fn test_next_stops_at_last_frame() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        p.load(counting_seq(4), &mut bank);
        for _ in 0..3 { assert!(p.next(&mut bank)); }
        assert_eq!(p.cursor(), Some(3));
        assert_eq!(bank.read(0), 4);
        assert!(!p.next(&mut bank));
        assert!(!p.next(&mut bank));
        assert_eq!(p.cursor(), Some(3));
    }

    #[test]
    fn test_prev_stops_at_first_frame() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        p.load(counting_seq(3), &mut bank);
        bank.write(0, 99);
        assert!(!p.prev(&mut bank));
        // a no-op move does not re-apply the frame
        assert_eq!(bank.read(0), 99);
        p.next(&mut bank);
        assert!(p.prev(&mut bank));
        assert_eq!(bank.read(0), 1);
    }

    #[test]
    fn test_navigation_without_frames() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        assert!(!p.next(&mut bank));
        assert!(!p.prev(&mut bank));
        assert!(!p.seek(1, &mut bank));
        assert!(!bank.is_changed());
    }

    #[test]
    fn test_seek_bounds() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        p.load(counting_seq(5), &mut bank);
        assert!(p.seek(3, &mut bank));
        assert_eq!(p.cursor(), Some(2));
        assert_eq!(bank.read(0), 3);
        assert!(!p.seek(0, &mut bank));
        assert!(!p.seek(6, &mut bank));
        assert_eq!(p.cursor(), Some(2));
        assert!(p.seek(5, &mut bank));
        assert_eq!(p.status().to_string(), "Frame 5/5");
    }

    #[test]
    fn test_sparse_frames_accumulate() {
        let mut bank = GpioBank::new(128);
        let mut p = FramePlayer::new();
        p.load(FrameSequence::new(vec![
            Frame::new(0, vec![1, 2]),
            Frame::new(10, vec![3]),
        ]), &mut bank);
        p.next(&mut bank);
        assert_eq!(&bank.snapshot()[..2], &[1, 2]);
        assert_eq!(bank.read(10), 3);
        assert_eq!(p.current_frame(), Some(&Frame::new(10, vec![3])));
    }
}
