//! Pixel regions and cell-grid addressing
//!
//! A [`CellGrid`] numbers its cells row-major starting from the **top-left**
//! cell, while [`PixelBuffer`] counts `y` from the bottom row. Converting a cell
//! index to a region therefore inverts the row:
//!
//! ```text
//! x = region.x + cell_width  * (index % columns)
//! y = region.y + cell_height * (rows - 1 - index / columns)
//! ```
//!
//! Getting this wrong mirrors every generated atlas vertically.

use serde::{Deserialize, Serialize};

use crate::{PixelBuffer, PixelError};

/// A rectangle of pixels inside a buffer. Never owns pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive top edge (y grows upward)
    pub fn top(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Same size, moved right by `dx` pixels
    pub fn shifted_x(&self, dx: u32) -> Self {
        Self {
            x: self.x + dx,
            ..*self
        }
    }

    /// Iterate every `(x, y)` pixel position in the region
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32)> {
        let region = *self;
        (region.y..region.y + region.height)
            .flat_map(move |y| (region.x..region.x + region.width).map(move |x| (x, y)))
    }
}

/// A region split into equally sized cells, indexed from the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGrid {
    pub region: PixelRegion,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl CellGrid {
    pub fn new(region: PixelRegion, cell_width: u32, cell_height: u32) -> Self {
        Self {
            region,
            cell_width,
            cell_height,
        }
    }

    /// Grid of square cells
    pub fn square(region: PixelRegion, cell_size: u32) -> Self {
        Self::new(region, cell_size, cell_size)
    }

    pub fn columns(&self) -> u32 {
        if self.cell_width == 0 {
            0
        } else {
            self.region.width / self.cell_width
        }
    }

    pub fn rows(&self) -> u32 {
        if self.cell_height == 0 {
            0
        } else {
            self.region.height / self.cell_height
        }
    }

    /// Total number of addressable cells
    pub fn len(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Region of the cell at linear `index`, index 0 being the top-left cell
    pub fn cell(&self, index: usize) -> Result<PixelRegion, PixelError> {
        let count = self.len();
        if index >= count {
            return Err(PixelError::CellOutOfRange { index, count });
        }

        let columns = self.columns() as usize;
        let rows = self.rows() as usize;
        let col = (index % columns) as u32;
        let row_from_bottom = (rows - 1 - index / columns) as u32;

        Ok(PixelRegion::new(
            self.region.x + self.cell_width * col,
            self.region.y + self.cell_height * row_from_bottom,
            self.cell_width,
            self.cell_height,
        ))
    }

    /// Split the cell at `index` into its own grid of `sub_width` x `sub_height` cells
    pub fn subgrid(
        &self,
        index: usize,
        sub_width: u32,
        sub_height: u32,
    ) -> Result<CellGrid, PixelError> {
        Ok(CellGrid::new(self.cell(index)?, sub_width, sub_height))
    }

    /// The same region addressed with half-size cells.
    ///
    /// Fails with `SizeMismatch` when a cell dimension is odd, since the halves
    /// would not tile the cell exactly.
    pub fn halved(&self) -> Result<CellGrid, PixelError> {
        if self.cell_width % 2 != 0 || self.cell_height % 2 != 0 {
            return Err(PixelError::SizeMismatch {
                source_size: self.cell_size(),
                dest_size: (self.cell_width / 2 * 2, self.cell_height / 2 * 2),
            });
        }
        Ok(CellGrid::new(
            self.region,
            self.cell_width / 2,
            self.cell_height / 2,
        ))
    }

    /// Same grid moved right by `dx` pixels
    pub fn shifted_x(&self, dx: u32) -> CellGrid {
        CellGrid::new(self.region.shifted_x(dx), self.cell_width, self.cell_height)
    }
}

/// Copy `from` in `source` onto `to` in `dest`, pixel for pixel.
///
/// No blending: alpha is copied as-is. Both regions must have the same size and
/// lie inside their buffers; nothing is written otherwise.
pub fn copy_region(
    source: &PixelBuffer,
    from: &PixelRegion,
    dest: &mut PixelBuffer,
    to: &PixelRegion,
) -> Result<(), PixelError> {
    if from.size() != to.size() {
        return Err(PixelError::SizeMismatch {
            source_size: from.size(),
            dest_size: to.size(),
        });
    }
    if !source.contains(from) {
        return Err(PixelError::RegionOutOfBounds {
            region: *from,
            width: source.width(),
            height: source.height(),
        });
    }
    if !dest.contains(to) {
        return Err(PixelError::RegionOutOfBounds {
            region: *to,
            width: dest.width(),
            height: dest.height(),
        });
    }

    for dy in 0..from.height {
        for dx in 0..from.width {
            if let Some(px) = source.get(from.x + dx, from.y + dy) {
                dest.set(to.x + dx, to.y + dy, px);
            }
        }
    }

    Ok(())
}
