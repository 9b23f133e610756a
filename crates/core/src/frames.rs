//! Recorded GPIO frames.
//!
//! ## Document format
//!
//! ```text
//! {
//!   "frames": [
//!     { "pin_offset": 0, "pin_values": [1, 0, 255] },
//!     { "pin_values": [2] },
//!     ...
//!   ]
//! }
//! ```
//!
//! `pin_offset` defaults to 0 and `pin_values` to an empty list, whether
//! absent or `null`. Values are plain JSON integers; they are clamped to a
//! byte when applied, and any value landing past the end of the bank is
//! dropped.

use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::bank::GpioBank;
use crate::error::GpioError;

/// A write-set starting at `pin_offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Frame {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pin_offset: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pin_values: Vec<i64>,
}

/// A field given as `null` reads the same as a missing one.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl Frame {
    pub fn new(pin_offset: usize, pin_values: Vec<i64>) -> Self {
        Frame { pin_offset, pin_values }
    }

    /// Write this frame's values into the bank. Contributions past the end
    /// of the bank are dropped; nothing here can fail.
    pub fn apply<M: AsRef<[u8]> + AsMut<[u8]>>(&self, bank: &mut GpioBank<M>) {
        for (i, &v) in self.pin_values.iter().enumerate() {
            if let Some(index) = self.pin_offset.checked_add(i) {
                bank.write(index, v);
            }
        }
    }
}

/// An ordered list of frames, replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrameSequence {
    pub frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>) -> Self {
        FrameSequence { frames }
    }

    /// Parse a frame document. Documents without any frames are rejected.
    pub fn from_json(text: &str) -> Result<Self, GpioError> {
        let seq: FrameSequence = serde_json::from_str(text)?;
        if seq.frames.is_empty() {
            return Err(GpioError::NoFrames);
        }
        Ok(seq)
    }

    /// Read and parse a frame document from disk.
    pub fn from_path(path: &Path) -> Result<Self, GpioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
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

    #[test]
    fn test_parse_document() {
        let seq = FrameSequence::from_json(
            r#"{ "frames": [
                { "pin_offset": 2, "pin_values": [1, 2, 3] },
                { "pin_values": [9] },
                { "pin_offset": 5 }
            ] }"#,
        ).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.frames[0], Frame::new(2, vec![1, 2, 3]));
        assert_eq!(seq.frames[1].pin_offset, 0);
        assert!(seq.frames[2].pin_values.is_empty());
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let seq = FrameSequence::from_json(
            r#"{ "frames": [
                { "pin_offset": null, "pin_values": [5] },
                { "pin_offset": 3, "pin_values": null }
            ] }"#,
        ).unwrap();
        assert_eq!(seq.frames[0], Frame::new(0, vec![5]));
        assert_eq!(seq.frames[1], Frame::new(3, vec![]));

        let mut bank = GpioBank::new(8);
        seq.frames[0].apply(&mut bank);
        assert_eq!(bank.read(0), 5);
    }

    #[test]
    fn test_reject_empty_document() {
        assert!(matches!(
            FrameSequence::from_json(r#"{ "frames": [] }"#),
            Err(GpioError::NoFrames)
        ));
    }

    #[test]
    fn test_reject_malformed() {
        assert!(matches!(FrameSequence::from_json("{ not json"), Err(GpioError::Json(_))));
        assert!(matches!(FrameSequence::from_json(r#"{ "pins": [] }"#), Err(GpioError::Json(_))));
        assert!(matches!(
            FrameSequence::from_json(r#"{ "frames": [ { "pin_offset": -1 } ] }"#),
            Err(GpioError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = FrameSequence::from_path(Path::new("/nonexistent/frames.json")).unwrap_err();
        assert!(matches!(err, GpioError::Io(_)));
    }

    #[test]
    fn test_apply_truncates_at_bank_end() {
        let mut bank = GpioBank::new(128);
        Frame::new(126, vec![9, 9, 9]).apply(&mut bank);
        assert_eq!(bank.read(125), 0);
        assert_eq!(bank.read(126), 9);
        assert_eq!(bank.read(127), 9);
        assert_eq!(bank.snapshot().len(), 128);
    }

    #[test]
    fn test_apply_clamps_values() {
        let mut bank = GpioBank::new(8);
        Frame::new(0, vec![-1, 256, 128]).apply(&mut bank);
        assert_eq!(&bank.snapshot()[..3], &[0, 255, 128]);
    }

    #[test]
    fn test_apply_huge_offset() {
        let mut bank = GpioBank::new(8);
        Frame::new(usize::MAX, vec![1, 2]).apply(&mut bank);
        assert!(bank.snapshot().iter().all(|&v| v == 0));
    }
}
