//! Quadrant compositing
//!
//! An atlas cell is assembled from four half-size quadrants taken from
//! anywhere in the source frame. Quadrants are ordered
//! `[top-left, top-right, bottom-left, bottom-right]`, which is also the
//! top-left-first index order of a 2 x 2 [`CellGrid`].

use rpgm_autotile_core::{copy_region, CellGrid, PixelBuffer, PixelError, PixelRegion};

use crate::AutotileError;

/// Which horizontal animation frame a copy works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub index: u32,
    pub count: u32,
}

impl Frame {
    /// The only frame of a still image
    pub const SINGLE: Self = Self { index: 0, count: 1 };

    pub const fn new(index: u32, count: u32) -> Self {
        Self { index, count }
    }

    /// Horizontal pixel offset of this frame inside a buffer `buffer_width` wide
    pub fn offset(&self, buffer_width: u32) -> u32 {
        if self.count == 0 {
            0
        } else {
            self.index.saturating_mul(buffer_width / self.count)
        }
    }
}

/// Stitch one destination cell out of four source quadrants.
///
/// `source_cells` addresses full cells of one source frame; quadrant indices
/// are looked up in the same region split into half-size cells.
/// `dest_cells` addresses full cells of one destination frame and `dest_index`
/// picks the cell to write. Both grids are moved right by `frame`'s offset in
/// their own buffer before use.
///
/// Every region is resolved and bounds-checked before the first pixel is
/// written, so a failed call leaves `dest` untouched.
pub fn composite_cell(
    source: &PixelBuffer,
    source_cells: &CellGrid,
    quadrants: [u8; 4],
    dest: &mut PixelBuffer,
    dest_cells: &CellGrid,
    dest_index: usize,
    frame: Frame,
) -> Result<(), AutotileError> {
    let source_halves = source_cells
        .shifted_x(frame.offset(source.width()))
        .halved()?;

    let dest_cell = dest_cells
        .shifted_x(frame.offset(dest.width()))
        .cell(dest_index)?;
    let dest_halves = CellGrid::new(dest_cell, dest_cell.width, dest_cell.height).halved()?;

    if source_halves.cell_size() != dest_halves.cell_size() {
        return Err(PixelError::SizeMismatch {
            source_size: source_halves.cell_size(),
            dest_size: dest_halves.cell_size(),
        }
        .into());
    }

    let mut copies: [(PixelRegion, PixelRegion); 4] = Default::default();
    for (slot, &quadrant) in quadrants.iter().enumerate() {
        let from = source_halves.cell(quadrant as usize)?;
        let to = dest_halves.cell(slot)?;
        check_bounds(source, &from)?;
        check_bounds(dest, &to)?;
        copies[slot] = (from, to);
    }

    for (from, to) in &copies {
        copy_region(source, from, dest, to)?;
    }

    Ok(())
}

fn check_bounds(buffer: &PixelBuffer, region: &PixelRegion) -> Result<(), PixelError> {
    if buffer.contains(region) {
        Ok(())
    } else {
        Err(PixelError::RegionOutOfBounds {
            region: *region,
            width: buffer.width(),
            height: buffer.height(),
        })
    }
}
