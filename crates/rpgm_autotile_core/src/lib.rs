//! Core data structures for rpgm_autotile
//!
//! This crate provides the plain-data building blocks shared by the decomposer
//! and the rule engine:
//! - `PixelBuffer` - RGBA8 pixels with a bottom-left origin
//! - `PixelRegion` - A rectangle addressing pixels inside a buffer
//! - `CellGrid` - Linear cell index to region conversion (top-left first)
//! - `SpriteRef` / `AtlasLayout` - Addressing of sprites inside a generated atlas
//!
//! No Bevy dependency; everything here is synchronous and allocation-light.

mod atlas;
mod pixel;
mod region;

pub use atlas::{AtlasLayout, SpriteRef, ATLAS_COLUMNS, ATLAS_ROWS};
pub use pixel::{PixelBuffer, Rgba, TRANSPARENT};
pub use region::{copy_region, CellGrid, PixelRegion};

use thiserror::Error;

/// Errors produced while addressing or copying pixels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelError {
    #[error("cell index {index} is outside a grid of {count} cells")]
    CellOutOfRange { index: usize, count: usize },
    #[error("region {region:?} does not fit inside a {width}x{height} buffer")]
    RegionOutOfBounds {
        region: PixelRegion,
        width: u32,
        height: u32,
    },
    #[error("size mismatch: source is {source_size:?}, destination is {dest_size:?}")]
    SizeMismatch {
        source_size: (u32, u32),
        dest_size: (u32, u32),
    },
    #[error("atlas of {frame_count} frame(s) with {cell_size}px cells is too large")]
    LayoutTooLarge {
        cell_size: u32,
        frame_count: u32,
        blocks: (u32, u32),
    },
    #[error("buffer of {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidBufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
