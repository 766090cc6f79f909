//! RPG Maker autotile decomposition
//!
//! This crate turns an RPG Maker XP or MV autotile into a normalized atlas of
//! 47 pattern cells plus a matching rule set, ready for first-match rule-tile
//! selection.
//!
//! # Features
//! - XP (3 x 4 cells) and MV (2 x 3 cells) source layouts
//! - Horizontally laid out animation frames
//! - A2-style sheets packing many MV autotiles
//! - Rule sets that select the right cell from 8 neighbors
//!
//! # Example
//!
//! ```rust,ignore
//! use rpgm_autotile::{
//!     AutoTile, Convention, DecomposeConfig, PixelBuffer, TileSelect, TilesetDecomposer,
//! };
//!
//! // Decoded by the caller, bottom-left origin
//! let source: PixelBuffer = load_source();
//!
//! let config = DecomposeConfig::new(Convention::Mv).with_frames(3, 2.0);
//! let decomposed = TilesetDecomposer::new(config).decompose(&source)?;
//!
//! // Hand the atlas to the renderer and the rules to the tilemap
//! let water = AutoTile::new(decomposed.rules, TerrainKind::Water);
//! let selection = water.select_at(4, 7, |x, y| tilemap.get(x, y));
//! let rect = decomposed.layout.sprite_region(&selection.sprite)?;
//! ```

pub mod compositor;
pub mod config;
pub mod decompose;
pub mod pattern;

pub use compositor::{composite_cell, Frame};
pub use config::DecomposeConfig;
pub use decompose::{
    is_source_valid, validate_source, Decomposed, DecomposedSheet, TilesetDecomposer,
    DEFAULT_SPRITE_CELL,
};
pub use pattern::{
    Convention, PatternEntry, PatternTable, MV_QUADRANT_REMAP, PATTERN_COUNT, PATTERN_NEIGHBORS,
    QUADRANT_COUNT, QUADRANT_SOURCES,
};

// Re-export the data crates
pub use rpgm_autotile_core;
pub use rpgm_autotile_core::{
    AtlasLayout, CellGrid, PixelBuffer, PixelError, PixelRegion, SpriteRef,
};
pub use rpgm_autotile_rules;
pub use rpgm_autotile_rules::{
    select, AutoTile, ColliderHint, NeighborPattern, NeighborSlot, OutputKind, Rule, RuleError,
    RuleSet, Selection, TileSelect, TileTransform,
};

use thiserror::Error;

/// Errors that can occur while decomposing an autotile
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutotileError {
    #[error("pattern id {0} is outside 0..47")]
    PatternOutOfRange(usize),
    #[error("quadrant index {0} is outside 0..48")]
    QuadrantOutOfRange(usize),
    #[error(
        "{width}x{height} source with {frame_count} frame(s) is not {} cells of {cell_size}px",
        .convention.display_name()
    )]
    InvalidSourceDimensions {
        width: u32,
        height: u32,
        frame_count: u32,
        cell_size: u32,
        convention: Convention,
    },
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Pixel(#[from] PixelError),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl From<toml::de::Error> for AutotileError {
    fn from(err: toml::de::Error) -> Self {
        AutotileError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AutotileError {
    fn from(err: toml::ser::Error) -> Self {
        AutotileError::Config(err.to_string())
    }
}
