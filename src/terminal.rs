//! Terminal geometry

use crate::layout::Size;
use anyhow::{Context, Result};

/// Terminal geometry and sizing information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    /// Terminal width in columns (characters)
    pub cols: u16,
    /// Terminal height in rows (lines)
    pub rows: u16,
}

impl TerminalGeometry {
    /// Get current terminal geometry
    pub fn detect() -> Result<Self> {
        let (cols, rows) = crossterm::terminal::size().context("Failed to get terminal size")?;
        Ok(TerminalGeometry { cols, rows })
    }

    pub fn new(cols: u16, rows: u16) -> Self {
        TerminalGeometry { cols, rows }
    }

    /// Overlay viewport, in cell units
    pub fn viewport(&self) -> Size {
        Size::new(self.cols as f32, self.rows as f32)
    }

    /// Pixel grid drawn with half-block cells (two pixels per cell vertically)
    pub fn pixel_grid(&self) -> (usize, usize) {
        (self.cols as usize, self.rows as usize * 2)
    }
}
