//! Inspector configuration.

use crate::{GPIO_SIZE, MEMORY_BASE_ADDRESS};

/// A cell shown as a labelled bit row above the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchPin {
    pub index: usize,
    pub label: String,
}

impl WatchPin {
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        WatchPin { index, label: label.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Number of GPIO cells.
    pub size: usize,
    /// Host address of cell 0 (display only).
    pub base_address: u16,
    pub watch: Vec<WatchPin>,
}

impl InspectorConfig {
    /// Host address of a cell.
    pub fn address_of(&self, index: usize) -> u64 {
        (self.base_address as u64).saturating_add(index as u64)
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        InspectorConfig {
            size: GPIO_SIZE,
            base_address: MEMORY_BASE_ADDRESS,
            watch: vec![
                WatchPin::new(0, "Negotiator (Pin 1)"),
                WatchPin::new(1, "Player1 (Pin 2)"),
            ],
        }
    }
}
