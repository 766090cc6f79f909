//! The 47-pattern autotile table
//!
//! Every generated atlas cell is stitched from four quadrants (half-size cells)
//! of the source autotile. [`QUADRANT_SOURCES`] says which source quadrants make
//! up each pattern and [`PATTERN_NEIGHBORS`] says which neighbor configuration
//! the pattern stands for. Both tables are indexed by pattern id and must stay
//! in this exact order: atlases and rule sets authored against them refer to
//! patterns by position.
//!
//! Quadrant indices address the XP source layout, a grid of 6 x 8 quadrants
//! numbered row-major from the top-left:
//!
//! ```text
//!  0  1 |  2  3 |  4  5      row 0-1: preview cell and inner corners
//!  6  7 |  8  9 | 10 11
//! ------+-------+------
//! 12 13 | 14 15 | 16 17      row 2-7: 3 x 3 block of outer corners,
//! 18 19 | 20 21 | 22 23               edges and fill
//! ...
//! ```
//!
//! MV sources pack the same pieces into 4 x 6 quadrants; [`MV_QUADRANT_REMAP`]
//! translates an XP quadrant index into its MV position.

use rpgm_autotile_core::SpriteRef;
use rpgm_autotile_rules::{ColliderHint, NeighborPattern, NeighborSlot, OutputKind, Rule};
use serde::{Deserialize, Serialize};

use crate::AutotileError;

/// Number of patterns in the table
pub const PATTERN_COUNT: usize = 47;

/// Number of quadrants in an XP source frame (6 x 8)
pub const QUADRANT_COUNT: usize = 48;

// ─── Convention ──────────────────────────────────────────────────────────────

/// Source layout convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// RPG Maker XP: 3 x 4 cells per frame
    #[default]
    Xp,
    /// RPG Maker MV (also VX/VX Ace A1/A2 autotiles): 2 x 3 cells per frame
    Mv,
}

impl Convention {
    /// Cells per source frame as `(columns, rows)`
    pub fn frame_grid(&self) -> (u32, u32) {
        match self {
            Convention::Xp => (3, 4),
            Convention::Mv => (2, 3),
        }
    }

    /// Cell size the engine ships its tilesets with
    pub fn default_cell_size(&self) -> u32 {
        match self {
            Convention::Xp => 32,
            Convention::Mv => 48,
        }
    }

    /// Get the display name for this convention
    pub fn display_name(&self) -> &'static str {
        match self {
            Convention::Xp => "RPG Maker XP",
            Convention::Mv => "RPG Maker MV",
        }
    }

    /// Get all available conventions
    pub fn all() -> &'static [Convention] {
        &[Convention::Xp, Convention::Mv]
    }

    /// Source pixel size of one frame at `cell_size`
    pub fn frame_size(&self, cell_size: u32) -> (u32, u32) {
        let (columns, rows) = self.frame_grid();
        (
            columns.saturating_mul(cell_size),
            rows.saturating_mul(cell_size),
        )
    }

    /// Infer the cell size of a `width` x `height` source holding
    /// `frame_count` horizontal frames.
    ///
    /// Returns `None` unless the image is an exact multiple of the frame grid
    /// with square, even-sized cells.
    pub fn infer_cell_size(&self, width: u32, height: u32, frame_count: u32) -> Option<u32> {
        if frame_count == 0 || width % frame_count != 0 {
            return None;
        }
        let (columns, rows) = self.frame_grid();
        let frame_width = width / frame_count;
        if frame_width % columns != 0 {
            return None;
        }

        let cell_size = frame_width / columns;
        if cell_size == 0
            || cell_size % 2 != 0
            || height as u64 != rows as u64 * cell_size as u64
        {
            return None;
        }
        Some(cell_size)
    }
}

// ─── Tables ──────────────────────────────────────────────────────────────────

/// Source quadrants `[top-left, top-right, bottom-left, bottom-right]` of each
/// pattern, in XP quadrant indices.
pub const QUADRANT_SOURCES: [[u8; 4]; PATTERN_COUNT] = [
    [26, 27, 32, 33], // 0
    [4, 27, 32, 33], // 1
    [26, 5, 32, 33], // 2
    [4, 5, 32, 33], // 3
    [26, 27, 32, 11], // 4
    [4, 27, 32, 11], // 5
    [26, 5, 32, 11], // 6
    [4, 5, 32, 11], // 7
    [26, 27, 10, 33], // 8
    [4, 27, 10, 33], // 9
    [26, 5, 10, 33], // 10
    [4, 5, 10, 33], // 11
    [26, 27, 10, 11], // 12
    [4, 27, 10, 11], // 13
    [26, 5, 10, 11], // 14
    [4, 5, 10, 11], // 15
    [24, 25, 30, 31], // 16
    [24, 5, 30, 31], // 17
    [24, 25, 30, 11], // 18
    [24, 5, 30, 11], // 19
    [14, 15, 20, 21], // 20
    [14, 15, 20, 11], // 21
    [14, 15, 10, 21], // 22
    [14, 15, 10, 11], // 23
    [28, 29, 34, 35], // 24
    [28, 29, 10, 35], // 25
    [4, 29, 34, 35], // 26
    [4, 29, 10, 35], // 27
    [26, 27, 44, 45], // 28
    [4, 39, 44, 45], // 29
    [38, 5, 44, 45], // 30
    [4, 5, 44, 45], // 31
    [24, 29, 30, 35], // 32
    [14, 15, 44, 45], // 33
    [12, 13, 18, 19], // 34
    [12, 13, 18, 11], // 35
    [16, 17, 22, 23], // 36
    [16, 17, 10, 23], // 37
    [40, 41, 46, 47], // 38
    [4, 41, 46, 47], // 39
    [36, 37, 42, 43], // 40
    [36, 5, 42, 43], // 41
    [12, 17, 18, 23], // 42
    [12, 13, 42, 43], // 43
    [36, 41, 42, 47], // 44
    [16, 17, 46, 47], // 45
    [12, 17, 42, 47], // 46
];

/// XP quadrant index -> MV quadrant index
#[rustfmt::skip]
pub const MV_QUADRANT_REMAP: [u8; QUADRANT_COUNT] = [
     0,  1,  0,  1,  2,  3,
     4,  5,  4,  5,  6,  7,
     8,  9,  9, 10, 10, 11,
    12, 13, 13, 14, 14, 15,
    12, 13, 13, 14, 14, 15,
    16, 17, 17, 18, 18, 19,
    16, 17, 17, 18, 18, 19,
    20, 21, 21, 22, 22, 23,
];

const A: NeighborSlot = NeighborSlot::DontCare;
const S: NeighborSlot = NeighborSlot::MustBeSelf;
const X: NeighborSlot = NeighborSlot::MustNotBeSelf;

/// Neighbor configuration of each pattern, laid out as the 3 x 3 block around
/// the tile with the center left out.
#[rustfmt::skip]
pub const PATTERN_NEIGHBORS: [NeighborPattern; PATTERN_COUNT] = [
    // 0
    [
        S, S, S,
        S,    S,
        S, S, S,
    ],
    // 1
    [
        X, S, S,
        S,    S,
        S, S, S,
    ],
    // 2
    [
        S, S, X,
        S,    S,
        S, S, S,
    ],
    // 3
    [
        X, S, X,
        S,    S,
        S, S, S,
    ],
    // 4
    [
        S, S, S,
        S,    S,
        S, S, X,
    ],
    // 5
    [
        X, S, S,
        S,    S,
        S, S, X,
    ],
    // 6
    [
        S, S, X,
        S,    S,
        S, S, X,
    ],
    // 7
    [
        X, S, X,
        S,    S,
        S, S, X,
    ],
    // 8
    [
        S, S, S,
        S,    S,
        X, S, S,
    ],
    // 9
    [
        X, S, S,
        S,    S,
        X, S, S,
    ],
    // 10
    [
        S, S, X,
        S,    S,
        X, S, S,
    ],
    // 11
    [
        X, S, X,
        S,    S,
        X, S, S,
    ],
    // 12
    [
        S, S, S,
        S,    S,
        X, S, X,
    ],
    // 13
    [
        X, S, S,
        S,    S,
        X, S, X,
    ],
    // 14
    [
        S, S, X,
        S,    S,
        X, S, X,
    ],
    // 15
    [
        X, S, X,
        S,    S,
        X, S, X,
    ],
    // 16
    [
        A, S, S,
        X,    S,
        A, S, S,
    ],
    // 17
    [
        A, S, X,
        X,    S,
        A, S, S,
    ],
    // 18
    [
        A, S, S,
        X,    S,
        A, S, X,
    ],
    // 19
    [
        A, S, X,
        X,    S,
        A, S, X,
    ],
    // 20
    [
        A, X, A,
        S,    S,
        S, S, S,
    ],
    // 21
    [
        A, X, A,
        S,    S,
        S, S, X,
    ],
    // 22
    [
        A, X, A,
        S,    S,
        X, S, S,
    ],
    // 23
    [
        A, X, A,
        S,    S,
        X, S, X,
    ],
    // 24
    [
        S, S, A,
        S,    X,
        S, S, A,
    ],
    // 25
    [
        S, S, A,
        S,    X,
        X, S, A,
    ],
    // 26
    [
        X, S, A,
        S,    X,
        S, S, A,
    ],
    // 27
    [
        X, S, A,
        S,    X,
        X, S, A,
    ],
    // 28
    [
        S, S, S,
        S,    S,
        A, X, A,
    ],
    // 29
    [
        X, S, S,
        S,    S,
        A, X, A,
    ],
    // 30
    [
        S, S, X,
        S,    S,
        A, X, A,
    ],
    // 31
    [
        X, S, X,
        S,    S,
        A, X, A,
    ],
    // 32
    [
        A, S, A,
        X,    X,
        A, S, A,
    ],
    // 33
    [
        A, X, A,
        S,    S,
        A, X, A,
    ],
    // 34
    [
        A, X, A,
        X,    S,
        A, S, S,
    ],
    // 35
    [
        A, X, A,
        X,    S,
        A, S, X,
    ],
    // 36
    [
        A, X, A,
        S,    X,
        S, S, A,
    ],
    // 37
    [
        A, X, A,
        S,    X,
        X, S, A,
    ],
    // 38
    [
        S, S, A,
        S,    X,
        A, X, A,
    ],
    // 39
    [
        X, S, A,
        S,    X,
        A, X, A,
    ],
    // 40
    [
        A, S, S,
        X,    S,
        A, X, A,
    ],
    // 41
    [
        A, S, X,
        X,    S,
        A, X, A,
    ],
    // 42
    [
        A, X, A,
        X,    X,
        A, S, A,
    ],
    // 43
    [
        A, X, A,
        X,    S,
        A, X, A,
    ],
    // 44
    [
        A, S, A,
        X,    X,
        A, X, A,
    ],
    // 45
    [
        A, X, A,
        S,    X,
        A, X, A,
    ],
    // 46
    [
        A, X, A,
        X,    X,
        A, X, A,
    ],
];

// ─── Entries ─────────────────────────────────────────────────────────────────

/// One row of the pattern table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternEntry {
    pub pattern_id: u8,
    /// XP quadrant indices `[top-left, top-right, bottom-left, bottom-right]`
    pub quadrant_sources: [u8; 4],
    pub neighbors: NeighborPattern,
}

impl PatternEntry {
    /// Quadrant indices for a source in `convention`
    pub fn quadrants_for(&self, convention: Convention) -> [u8; 4] {
        self.quadrant_sources
            .map(|q| PatternTable::remap_unchecked(convention, q))
    }

    /// Turn this pattern into a rule drawing `frames`
    pub fn to_rule(
        &self,
        output: OutputKind,
        frames: Vec<SpriteRef>,
        animation_speed: f32,
        collider: ColliderHint,
    ) -> Result<Rule, AutotileError> {
        Ok(Rule::new(
            self.neighbors,
            output,
            frames,
            animation_speed,
            collider,
        )?)
    }
}

/// Read-only access to the pattern tables
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternTable;

impl PatternTable {
    pub const fn pattern_count() -> usize {
        PATTERN_COUNT
    }

    /// Get the entry for `pattern_id`
    pub fn entry_for(pattern_id: usize) -> Result<PatternEntry, AutotileError> {
        if pattern_id >= PATTERN_COUNT {
            return Err(AutotileError::PatternOutOfRange(pattern_id));
        }
        Ok(PatternEntry {
            pattern_id: pattern_id as u8,
            quadrant_sources: QUADRANT_SOURCES[pattern_id],
            neighbors: PATTERN_NEIGHBORS[pattern_id],
        })
    }

    /// All entries in pattern id order
    pub fn entries() -> impl Iterator<Item = PatternEntry> {
        (0..PATTERN_COUNT).map(|id| PatternEntry {
            pattern_id: id as u8,
            quadrant_sources: QUADRANT_SOURCES[id],
            neighbors: PATTERN_NEIGHBORS[id],
        })
    }

    /// Translate an XP quadrant index into `convention`'s layout
    pub fn remap(convention: Convention, quadrant: usize) -> Result<u8, AutotileError> {
        if quadrant >= QUADRANT_COUNT {
            return Err(AutotileError::QuadrantOutOfRange(quadrant));
        }
        Ok(Self::remap_unchecked(convention, quadrant as u8))
    }

    /// Source quadrants of `pattern_id` for a source in `convention`
    pub fn source_quadrants(
        pattern_id: usize,
        convention: Convention,
    ) -> Result<[u8; 4], AutotileError> {
        Ok(Self::entry_for(pattern_id)?.quadrants_for(convention))
    }

    // Table values are all below QUADRANT_COUNT
    fn remap_unchecked(convention: Convention, quadrant: u8) -> u8 {
        match convention {
            Convention::Xp => quadrant,
            Convention::Mv => MV_QUADRANT_REMAP[quadrant as usize],
        }
    }
}
