//! Data types for rule tiles.
//!
//! The primary entry point is [`RuleSet`], an ordered list of [`Rule`]s plus the
//! sprite shown when none of them match.

use rpgm_autotile_core::SpriteRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{RuleError, NEIGHBOR_COUNT};

/// Slot indices and grid offsets of the 8 neighbors.
///
/// Slots are numbered in row-major scan order, skipping the center:
/// ```text
///   0 | 1 | 2
///   3 | X | 4
///   5 | 6 | 7
/// ```
/// Offsets are screen-space: `dy = -1` is the row above.
pub mod neighbors {
    pub const TOP_LEFT: usize = 0;
    pub const TOP: usize = 1;
    pub const TOP_RIGHT: usize = 2;
    pub const LEFT: usize = 3;
    pub const RIGHT: usize = 4;
    pub const BOTTOM_LEFT: usize = 5;
    pub const BOTTOM: usize = 6;
    pub const BOTTOM_RIGHT: usize = 7;

    /// `(dx, dy)` of each slot
    pub const OFFSETS: [(i32, i32); super::NEIGHBOR_COUNT] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    /// Slots that share an edge with the center
    pub const EDGES: [usize; 4] = [TOP, LEFT, RIGHT, BOTTOM];

    /// Slots that only touch the center diagonally
    pub const CORNERS: [usize; 4] = [TOP_LEFT, TOP_RIGHT, BOTTOM_LEFT, BOTTOM_RIGHT];
}

// ─── Neighbor slots ──────────────────────────────────────────────────────────

/// Condition on one neighboring cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSlot {
    /// Any content passes
    #[default]
    DontCare,
    /// The cell must hold this rule's own tile kind
    MustBeSelf,
    /// The cell must be empty or hold a different tile kind
    MustNotBeSelf,
}

impl NeighborSlot {
    /// Whether a neighbor that is (or is not) of the owner's kind passes this slot
    pub fn accepts(self, is_self: bool) -> bool {
        match self {
            NeighborSlot::DontCare => true,
            NeighborSlot::MustBeSelf => is_self,
            NeighborSlot::MustNotBeSelf => !is_self,
        }
    }

    /// Single-character glyph used when printing patterns
    pub fn glyph(self) -> char {
        match self {
            NeighborSlot::DontCare => '.',
            NeighborSlot::MustBeSelf => '#',
            NeighborSlot::MustNotBeSelf => 'x',
        }
    }
}

/// The 8 slot conditions of a rule, in [`neighbors`] order
pub type NeighborPattern = [NeighborSlot; NEIGHBOR_COUNT];

// ─── Output ──────────────────────────────────────────────────────────────────

/// How a matched rule turns its frames into a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Always the first frame
    #[default]
    Single,
    /// One frame picked at random
    Random,
    /// All frames played in order
    Animation,
}

impl OutputKind {
    /// Get the display name for this output kind
    pub fn display_name(&self) -> &'static str {
        match self {
            OutputKind::Single => "Single",
            OutputKind::Random => "Random",
            OutputKind::Animation => "Animation",
        }
    }

    /// Get all available output kinds
    pub fn all() -> &'static [OutputKind] {
        &[OutputKind::Single, OutputKind::Random, OutputKind::Animation]
    }
}

/// Collider the host tilemap should give a selected tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColliderHint {
    None,
    /// Collider follows the sprite outline
    #[default]
    Sprite,
    /// Collider fills the grid cell
    Grid,
}

/// Orientation applied to a selected sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileTransform {
    pub flip_x: bool,
    pub flip_y: bool,
    /// Clockwise quarter turns
    pub quarter_turns: u8,
}

impl TileTransform {
    pub const IDENTITY: Self = Self {
        flip_x: false,
        flip_y: false,
        quarter_turns: 0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

// ─── Rule ─────────────────────────────────────────────────────────────────────

/// A single tiling rule.
///
/// A rule matches a cell when **all** 8 neighbor slots accept the cell's
/// neighbors (AND logic). `frames` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord")]
pub struct Rule {
    neighbors: NeighborPattern,
    output: OutputKind,
    frames: Vec<SpriteRef>,
    animation_speed: f32,
    collider: ColliderHint,
}

impl Rule {
    pub fn new(
        neighbors: NeighborPattern,
        output: OutputKind,
        frames: Vec<SpriteRef>,
        animation_speed: f32,
        collider: ColliderHint,
    ) -> Result<Self, RuleError> {
        if frames.is_empty() {
            return Err(RuleError::EmptyFrameList);
        }
        if !animation_speed.is_finite() || animation_speed <= 0.0 {
            return Err(RuleError::InvalidAnimationSpeed(animation_speed));
        }

        Ok(Self {
            neighbors,
            output,
            frames,
            animation_speed,
            collider,
        })
    }

    /// A single-sprite rule with default speed and collider
    pub fn single(neighbors: NeighborPattern, sprite: SpriteRef) -> Self {
        Self {
            neighbors,
            output: OutputKind::Single,
            frames: vec![sprite],
            animation_speed: 1.0,
            collider: ColliderHint::default(),
        }
    }

    pub fn neighbors(&self) -> &NeighborPattern {
        &self.neighbors
    }

    pub fn output(&self) -> OutputKind {
        self.output
    }

    pub fn frames(&self) -> &[SpriteRef] {
        &self.frames
    }

    /// The sprite shown before any animation or random pick is applied
    pub fn first_frame(&self) -> SpriteRef {
        self.frames[0]
    }

    pub fn animation_speed(&self) -> f32 {
        self.animation_speed
    }

    pub fn collider(&self) -> ColliderHint {
        self.collider
    }

    pub fn with_collider(mut self, collider: ColliderHint) -> Self {
        self.collider = collider;
        self
    }

    /// Render the neighbor pattern as a 3x3 glyph block, center shown as `*`
    pub fn pattern_string(&self) -> String {
        let g = |i: usize| self.neighbors[i].glyph();
        format!(
            "{}{}{}\n{}*{}\n{}{}{}",
            g(0),
            g(1),
            g(2),
            g(3),
            g(4),
            g(5),
            g(6),
            g(7)
        )
    }
}

/// Unvalidated wire form of a [`Rule`]
#[derive(Deserialize)]
struct RuleRecord {
    neighbors: NeighborPattern,
    #[serde(default)]
    output: OutputKind,
    frames: Vec<SpriteRef>,
    #[serde(default = "default_animation_speed")]
    animation_speed: f32,
    #[serde(default)]
    collider: ColliderHint,
}

fn default_animation_speed() -> f32 {
    1.0
}

impl TryFrom<RuleRecord> for Rule {
    type Error = RuleError;

    fn try_from(record: RuleRecord) -> Result<Self, Self::Error> {
        Rule::new(
            record.neighbors,
            record.output,
            record.frames,
            record.animation_speed,
            record.collider,
        )
    }
}

// ─── RuleSet ─────────────────────────────────────────────────────────────────

/// An ordered list of rules sharing one default sprite.
///
/// Evaluation order is list order: authors put the most specific rules first.
/// Every editing method keeps the relative order of the rules it does not touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Stable identifier for this rule set.
    pub id: Uuid,
    pub name: String,
    pub rules: Vec<Rule>,
    /// Shown when no rule matches
    pub default_sprite: SpriteRef,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, default_sprite: SpriteRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rules: Vec::new(),
            default_sprite,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Append a rule with the lowest priority
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Insert a rule at `index`, clamped to the end of the list
    pub fn insert(&mut self, index: usize, rule: Rule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        if index < self.rules.len() {
            Some(self.rules.remove(index))
        } else {
            None
        }
    }

    /// Move the rule at `from` so it ends up at `to`. Returns false if either
    /// index is out of range.
    pub fn move_rule(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rules.len() || to >= self.rules.len() {
            return false;
        }
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);
        true
    }

    /// Serialize to the JSON exchange form
    pub fn to_json(&self) -> Result<String, RuleError> {
        serde_json::to_string_pretty(self).map_err(|e| RuleError::Serialization(e.to_string()))
    }

    /// Parse the JSON exchange form. Every rule is re-validated.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        serde_json::from_str(json).map_err(|e| RuleError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use NeighborSlot::*;

    fn sprite(cell: u32) -> SpriteRef {
        SpriteRef::new(0, cell)
    }

    #[test]
    fn test_slot_accepts() {
        assert!(DontCare.accepts(true));
        assert!(DontCare.accepts(false));
        assert!(MustBeSelf.accepts(true));
        assert!(!MustBeSelf.accepts(false));
        assert!(!MustNotBeSelf.accepts(true));
        assert!(MustNotBeSelf.accepts(false));
    }

    #[test]
    fn test_rule_rejects_empty_frames() {
        let err = Rule::new(
            [DontCare; 8],
            OutputKind::Animation,
            Vec::new(),
            1.0,
            ColliderHint::Sprite,
        )
        .unwrap_err();
        assert_eq!(err, RuleError::EmptyFrameList);
    }

    #[test]
    fn test_rule_rejects_bad_speed() {
        for speed in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = Rule::new(
                [DontCare; 8],
                OutputKind::Single,
                vec![sprite(0)],
                speed,
                ColliderHint::Sprite,
            );
            assert!(matches!(result, Err(RuleError::InvalidAnimationSpeed(_))));
        }
    }

    #[test]
    fn test_pattern_string() {
        let rule = Rule::single(
            [
                MustNotBeSelf,
                MustBeSelf,
                DontCare,
                MustBeSelf,
                MustBeSelf,
                DontCare,
                MustNotBeSelf,
                MustBeSelf,
            ],
            sprite(0),
        );
        assert_eq!(rule.pattern_string(), "x#.\n#*#\n.x#");
    }

    #[test]
    fn test_move_rule_keeps_other_order() {
        let mut set = RuleSet::new("Test", sprite(99));
        for i in 0..4 {
            set.push(Rule::single([DontCare; 8], sprite(i)));
        }

        assert!(set.move_rule(3, 0));
        let cells: Vec<u32> = set.rules.iter().map(|r| r.first_frame().cell).collect();
        assert_eq!(cells, vec![3, 0, 1, 2]);

        assert!(!set.move_rule(0, 4));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut set = RuleSet::new("Test", sprite(99));
        set.push(Rule::single([DontCare; 8], sprite(0)));
        set.push(Rule::single([DontCare; 8], sprite(2)));
        set.insert(1, Rule::single([DontCare; 8], sprite(1)));
        set.insert(100, Rule::single([DontCare; 8], sprite(3)));

        let cells: Vec<u32> = set.rules.iter().map(|r| r.first_frame().cell).collect();
        assert_eq!(cells, vec![0, 1, 2, 3]);

        assert_eq!(set.remove(0).map(|r| r.first_frame().cell), Some(0));
        assert!(set.remove(10).is_none());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_json_round_trip_preserves_order_and_slots() {
        let mut set = RuleSet::new("Water", SpriteRef::new(0, 46));
        set.push(
            Rule::new(
                [
                    MustBeSelf,
                    MustNotBeSelf,
                    DontCare,
                    MustBeSelf,
                    MustBeSelf,
                    DontCare,
                    MustBeSelf,
                    MustNotBeSelf,
                ],
                OutputKind::Animation,
                vec![SpriteRef::new(0, 5), SpriteRef::new(1, 5), SpriteRef::new(2, 5)],
                2.5,
                ColliderHint::Grid,
            )
            .unwrap(),
        );
        set.push(Rule::single([MustNotBeSelf; 8], sprite(46)));

        let json = set.to_json().unwrap();
        let loaded = RuleSet::from_json(&json).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn test_from_json_rejects_empty_frames() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "name": "Broken",
            "rules": [{
                "neighbors": ["dont_care", "dont_care", "dont_care", "dont_care",
                              "dont_care", "dont_care", "dont_care", "dont_care"],
                "output": "single",
                "frames": []
            }],
            "default_sprite": { "frame": 0, "cell": 0 }
        }"#;
        let err = RuleSet::from_json(json).unwrap_err();
        assert!(matches!(err, RuleError::Serialization(msg) if msg.contains("sprite frame")));
    }

    #[test]
    fn test_from_json_rejects_wrong_slot_count() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "name": "Short",
            "rules": [{
                "neighbors": ["dont_care", "dont_care"],
                "frames": [{ "frame": 0, "cell": 0 }]
            }],
            "default_sprite": { "frame": 0, "cell": 0 }
        }"#;
        assert!(RuleSet::from_json(json).is_err());
    }
}
