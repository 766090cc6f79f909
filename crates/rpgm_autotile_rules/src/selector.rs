//! First-match tile selection.
//!
//! The entry point is [`select`]. Tilemaps usually go through [`TileSelect`]
//! instead, which gathers the neighbor snapshot from a lookup closure first.

use rand::Rng;
use rpgm_autotile_core::SpriteRef;
use tracing::trace;

use crate::{
    neighbors::OFFSETS, rule_matches, ColliderHint, Neighborhood, OutputKind, Rule, RuleSet,
    TileTransform,
};

// ─── Selection ───────────────────────────────────────────────────────────────

/// What a tilemap should draw for one cell
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The sprite to draw when no animation or random pick is applied
    pub sprite: SpriteRef,
    /// All frames of the matched rule (just `sprite` for the default)
    pub frames: Vec<SpriteRef>,
    pub output: OutputKind,
    /// Always [`TileTransform::IDENTITY`]; rules carry no rotated variants
    pub transform: TileTransform,
    pub collider: ColliderHint,
    /// Frames per second, only set for animation output
    pub animation_speed: Option<f32>,
    /// Position of the matched rule in its rule set, `None` for the default
    pub rule_index: Option<usize>,
}

impl Selection {
    fn from_rule(index: usize, rule: &Rule) -> Self {
        let animation_speed = match rule.output() {
            OutputKind::Animation => Some(rule.animation_speed()),
            OutputKind::Single | OutputKind::Random => None,
        };

        Self {
            sprite: rule.first_frame(),
            frames: rule.frames().to_vec(),
            output: rule.output(),
            transform: TileTransform::IDENTITY,
            collider: rule.collider(),
            animation_speed,
            rule_index: Some(index),
        }
    }

    fn fallback(rule_set: &RuleSet, collider: ColliderHint) -> Self {
        Self {
            sprite: rule_set.default_sprite,
            frames: vec![rule_set.default_sprite],
            output: OutputKind::Single,
            transform: TileTransform::IDENTITY,
            collider,
            animation_speed: None,
            rule_index: None,
        }
    }

    /// Whether no rule matched and the default sprite was used
    pub fn is_default(&self) -> bool {
        self.rule_index.is_none()
    }

    /// Frames and speed when the matched rule is animated
    pub fn animation(&self) -> Option<(&[SpriteRef], f32)> {
        self.animation_speed
            .map(|speed| (self.frames.as_slice(), speed))
    }

    /// Pick a frame for `Random` output; every other kind returns `sprite`.
    pub fn pick_random(&self, rng: &mut impl Rng) -> SpriteRef {
        match self.output {
            OutputKind::Random if !self.frames.is_empty() => {
                self.frames[rng.gen_range(0..self.frames.len())]
            }
            _ => self.sprite,
        }
    }

    /// Frame shown `seconds` after the animation started, looping.
    ///
    /// Non-animated selections always return `sprite`.
    pub fn frame_at(&self, seconds: f32) -> SpriteRef {
        let Some((frames, speed)) = self.animation() else {
            return self.sprite;
        };
        if frames.len() < 2 || !seconds.is_finite() {
            return self.sprite;
        }

        let step = (seconds * speed).floor() as i64;
        frames[step.rem_euclid(frames.len() as i64) as usize]
    }
}

// ─── Selection entry points ──────────────────────────────────────────────────

/// Return the selection of the first rule in `rule_set` that matches
/// `neighbors`, or the default sprite with `fallback_collider` when none does.
///
/// Rules are tried strictly in list order. A later rule is never considered
/// once an earlier one matches, even if it is more specific.
pub fn select<T: PartialEq>(
    rule_set: &RuleSet,
    owner: &T,
    neighbors: &Neighborhood<T>,
    fallback_collider: ColliderHint,
) -> Selection {
    for (index, rule) in rule_set.rules.iter().enumerate() {
        if rule_matches(rule, owner, neighbors) {
            return Selection::from_rule(index, rule);
        }
    }

    trace!(
        "rule set '{}': no rule matched, using default sprite {}",
        rule_set.name,
        rule_set.default_sprite.name()
    );
    Selection::fallback(rule_set, fallback_collider)
}

/// Snapshot the 8 neighbors of `(x, y)` through `lookup`.
///
/// A fresh array is returned on every call.
pub fn gather_neighbors<T, F>(x: i32, y: i32, lookup: F) -> Neighborhood<T>
where
    F: Fn(i32, i32) -> Option<T>,
{
    std::array::from_fn(|slot| {
        let (dx, dy) = OFFSETS[slot];
        lookup(x + dx, y + dy)
    })
}

/// Positions whose selection may change when the cell at `(x, y)` changes:
/// the cell itself and its 8 neighbors.
pub fn refresh_positions(x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> {
    (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| (x + dx, y + dy)))
}

// ─── Capability interface ────────────────────────────────────────────────────

/// Anything that can pick a sprite for a grid cell from its neighbors.
///
/// Tilemaps hold tiles through this trait and pass a lookup closure that
/// returns the occupant at any grid position (`None` for empty or outside).
pub trait TileSelect {
    type Occupant: PartialEq;

    fn select_at<F>(&self, x: i32, y: i32, lookup: F) -> Selection
    where
        F: Fn(i32, i32) -> Option<Self::Occupant>;
}

/// A rule set bound to the tile kind it selects for
#[derive(Debug, Clone, PartialEq)]
pub struct AutoTile<T> {
    pub rule_set: RuleSet,
    /// The occupant value that counts as "self" for this tile
    pub kind: T,
    /// Collider used when no rule matches
    pub default_collider: ColliderHint,
}

impl<T> AutoTile<T> {
    pub fn new(rule_set: RuleSet, kind: T) -> Self {
        Self {
            rule_set,
            kind,
            default_collider: ColliderHint::Grid,
        }
    }

    pub fn with_default_collider(mut self, collider: ColliderHint) -> Self {
        self.default_collider = collider;
        self
    }
}

impl<T: PartialEq> TileSelect for AutoTile<T> {
    type Occupant = T;

    fn select_at<F>(&self, x: i32, y: i32, lookup: F) -> Selection
    where
        F: Fn(i32, i32) -> Option<T>,
    {
        let neighbors = gather_neighbors(x, y, lookup);
        select(&self.rule_set, &self.kind, &neighbors, self.default_collider)
    }
}

impl<T: PartialEq + Clone> AutoTile<T> {
    /// Select a sprite for every cell of a row-major grid that holds this tile.
    ///
    /// Cells holding anything else yield `None`. Positions outside the grid
    /// count as empty.
    pub fn select_grid(
        &self,
        tiles: &[Option<T>],
        width: u32,
        height: u32,
    ) -> Vec<Option<Selection>> {
        let lookup = |x: i32, y: i32| -> Option<T> {
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                return None;
            }
            tiles
                .get((y as u32 * width + x as u32) as usize)
                .cloned()
                .flatten()
        };

        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let idx = (y * width + x) as usize;
                match tiles.get(idx) {
                    Some(Some(occupant)) if *occupant == self.kind => {
                        Some(self.select_at(x as i32, y as i32, lookup))
                    }
                    _ => None,
                }
            })
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
