//! Rule-tile matching for rpgm_autotile.
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s, each constraining the 8 cells
//! around a tile. [`select`] walks the list in order and returns the first rule
//! whose constraints hold for a neighbor snapshot, falling back to the rule
//! set's default sprite.
//!
//! Tilemaps plug in through [`TileSelect`]: they hand over a lookup closure and
//! get a [`Selection`] back. No neighbor state is cached between calls, so
//! selections for different cells may run on different threads.
//!
//! This crate has no Bevy dependency. It operates on plain data from
//! `rpgm_autotile_core`.

mod matcher;
mod selector;
mod types;

pub use matcher::{rule_matches, satisfying_neighborhood, slot_matches, Neighborhood};
pub use selector::{
    gather_neighbors, refresh_positions, select, AutoTile, Selection, TileSelect,
};
pub use types::{
    neighbors, ColliderHint, NeighborPattern, NeighborSlot, OutputKind, Rule, RuleSet,
    TileTransform,
};

pub use rpgm_autotile_core::SpriteRef;

use thiserror::Error;

/// Number of neighbors every rule constrains
pub const NEIGHBOR_COUNT: usize = 8;

/// Errors raised while building or loading rules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("a rule needs at least one sprite frame")]
    EmptyFrameList,
    #[error("animation speed must be a positive number, got {0}")]
    InvalidAnimationSpeed(f32),
    #[error("Serialization error: {0}")]
    Serialization(String),
}
