//! Normalized autotile atlas layout
//!
//! A generated atlas holds, per autotile block and per animation frame, a grid
//! of 8 x 6 square cells numbered row-major from the top-left. Frames are laid
//! out left to right inside a block; blocks (only used by multi-autotile sheets)
//! are laid out row-major from the top-left as well.

use serde::{Deserialize, Serialize};

use crate::{CellGrid, PixelError, PixelRegion};

/// Cells per atlas row
pub const ATLAS_COLUMNS: u32 = 8;
/// Cell rows per atlas frame
pub const ATLAS_ROWS: u32 = 6;

/// Reference to one sprite inside a generated atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpriteRef {
    /// Autotile block within a multi-autotile sheet (0 for single atlases)
    #[serde(default)]
    pub block: u32,
    /// Animation frame
    pub frame: u32,
    /// Cell index within the frame, row-major from the top-left
    pub cell: u32,
}

impl SpriteRef {
    pub const fn new(frame: u32, cell: u32) -> Self {
        Self {
            block: 0,
            frame,
            cell,
        }
    }

    pub const fn in_block(block: u32, frame: u32, cell: u32) -> Self {
        Self { block, frame, cell }
    }

    /// Name of this sprite in a single-autotile atlas, e.g. `tile_0_12`
    pub fn name(&self) -> String {
        format!("tile_{}_{}", self.frame, self.cell)
    }

    /// Name of this sprite inside a sheet block called `block_name`, e.g. `water_12`.
    ///
    /// Sheets hold still images only, so the frame is not part of the name.
    pub fn name_in_block(&self, block_name: &str) -> String {
        format!("{}_{}", block_name, self.cell)
    }
}

/// Pixel layout of a generated atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasLayout {
    /// Edge length of a square cell in pixels
    pub cell_size: u32,
    /// Animation frames per block, laid out horizontally
    pub frame_count: u32,
    /// Blocks per atlas row
    #[serde(default = "default_blocks")]
    pub block_columns: u32,
    /// Block rows
    #[serde(default = "default_blocks")]
    pub block_rows: u32,
}

fn default_blocks() -> u32 {
    1
}

impl AtlasLayout {
    /// Layout of a single autotile with `frame_count` frames
    pub fn single(cell_size: u32, frame_count: u32) -> Self {
        Self {
            cell_size,
            frame_count,
            block_columns: 1,
            block_rows: 1,
        }
    }

    /// Layout of a single-frame sheet of `columns` x `rows` autotiles
    pub fn sheet(cell_size: u32, block_columns: u32, block_rows: u32) -> Self {
        Self {
            cell_size,
            frame_count: 1,
            block_columns,
            block_rows,
        }
    }

    // Size getters saturate; `pixel_size` reports layouts too large for a buffer
    pub fn frame_width(&self) -> u32 {
        ATLAS_COLUMNS.saturating_mul(self.cell_size)
    }

    pub fn block_width(&self) -> u32 {
        self.frame_width().saturating_mul(self.frame_count)
    }

    pub fn block_height(&self) -> u32 {
        ATLAS_ROWS.saturating_mul(self.cell_size)
    }

    /// Total atlas width in pixels
    pub fn width(&self) -> u32 {
        self.block_width().saturating_mul(self.block_columns)
    }

    /// Total atlas height in pixels
    pub fn height(&self) -> u32 {
        self.block_height().saturating_mul(self.block_rows)
    }

    /// Total atlas size as `(width, height)`, failing when either side does
    /// not fit in a `u32`
    pub fn pixel_size(&self) -> Result<(u32, u32), PixelError> {
        let width = ATLAS_COLUMNS
            .checked_mul(self.cell_size)
            .and_then(|w| w.checked_mul(self.frame_count))
            .and_then(|w| w.checked_mul(self.block_columns));
        let height = ATLAS_ROWS
            .checked_mul(self.cell_size)
            .and_then(|h| h.checked_mul(self.block_rows));

        match (width, height) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => Err(PixelError::LayoutTooLarge {
                cell_size: self.cell_size,
                frame_count: self.frame_count,
                blocks: (self.block_columns, self.block_rows),
            }),
        }
    }

    pub fn block_count(&self) -> usize {
        self.block_columns as usize * self.block_rows as usize
    }

    pub fn cells_per_frame(&self) -> usize {
        (ATLAS_COLUMNS * ATLAS_ROWS) as usize
    }

    /// Grid of whole blocks over the atlas
    pub fn block_grid(&self) -> CellGrid {
        CellGrid::new(
            PixelRegion::new(0, 0, self.width(), self.height()),
            self.block_width(),
            self.block_height(),
        )
    }

    /// Grid of cells of `frame` inside `block`
    pub fn cell_grid(&self, block: u32, frame: u32) -> Result<CellGrid, PixelError> {
        let frames = self
            .block_grid()
            .subgrid(block as usize, self.frame_width(), self.block_height())?;
        frames.subgrid(frame as usize, self.cell_size, self.cell_size)
    }

    /// Pixel rectangle of a sprite, the equivalent of sprite-sheet metadata
    pub fn sprite_region(&self, sprite: &SpriteRef) -> Result<PixelRegion, PixelError> {
        self.cell_grid(sprite.block, sprite.frame)?
            .cell(sprite.cell as usize)
    }
}
