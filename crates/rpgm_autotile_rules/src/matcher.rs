//! Matching one rule against one neighbor snapshot.

use crate::{NeighborPattern, NeighborSlot, Rule, NEIGHBOR_COUNT};

/// The occupants of the 8 cells around a tile, in slot order. `None` is empty.
pub type Neighborhood<T> = [Option<T>; NEIGHBOR_COUNT];

/// Test one slot against one neighbor.
///
/// `owner` is the tile kind the rule belongs to; a neighbor counts as "self"
/// only when it holds an occupant equal to `owner`. Empty cells are never self.
pub fn slot_matches<T: PartialEq>(slot: NeighborSlot, owner: &T, occupant: Option<&T>) -> bool {
    slot.accepts(occupant == Some(owner))
}

/// Return `true` if every slot of `rule` accepts the matching neighbor.
pub fn rule_matches<T: PartialEq>(rule: &Rule, owner: &T, neighbors: &Neighborhood<T>) -> bool {
    rule.neighbors()
        .iter()
        .zip(neighbors.iter())
        .all(|(slot, occupant)| slot_matches(*slot, owner, occupant.as_ref()))
}

/// Build a neighborhood that satisfies `pattern`: `MustBeSelf` slots hold
/// `owner`, every other slot holds `other`.
///
/// Useful for previews and for checking that a pattern is reachable at all.
pub fn satisfying_neighborhood<T: Clone>(
    pattern: &NeighborPattern,
    owner: &T,
    other: Option<T>,
) -> Neighborhood<T> {
    std::array::from_fn(|i| match pattern[i] {
        NeighborSlot::MustBeSelf => Some(owner.clone()),
        NeighborSlot::MustNotBeSelf | NeighborSlot::DontCare => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpriteRef;
    use NeighborSlot::*;

    const GRASS: u32 = 1;
    const WATER: u32 = 2;

    fn rule(pattern: NeighborPattern) -> Rule {
        Rule::single(pattern, SpriteRef::new(0, 0))
    }

    #[test]
    fn slot_dont_care_always_matches() {
        assert!(slot_matches(DontCare, &GRASS, None));
        assert!(slot_matches(DontCare, &GRASS, Some(&GRASS)));
        assert!(slot_matches(DontCare, &GRASS, Some(&WATER)));
    }

    #[test]
    fn slot_must_be_self_needs_same_kind() {
        assert!(slot_matches(MustBeSelf, &GRASS, Some(&GRASS)));
        assert!(!slot_matches(MustBeSelf, &GRASS, Some(&WATER)));
        assert!(!slot_matches(MustBeSelf, &GRASS, None));
    }

    #[test]
    fn slot_must_not_be_self_matches_empty_and_other() {
        assert!(slot_matches(MustNotBeSelf, &GRASS, None));
        assert!(slot_matches(MustNotBeSelf, &GRASS, Some(&WATER)));
        assert!(!slot_matches(MustNotBeSelf, &GRASS, Some(&GRASS)));
    }

    #[test]
    fn rule_needs_every_slot() {
        let r = rule([MustBeSelf; 8]);
        let mut neighbors: Neighborhood<u32> = [Some(GRASS); 8];
        assert!(rule_matches(&r, &GRASS, &neighbors));

        for i in 0..NEIGHBOR_COUNT {
            neighbors[i] = Some(WATER);
            assert!(!rule_matches(&r, &GRASS, &neighbors), "slot {i} ignored");
            neighbors[i] = Some(GRASS);
        }
    }

    #[test]
    fn rule_all_dont_care_matches_anything() {
        let r = rule([DontCare; 8]);
        assert!(rule_matches(&r, &GRASS, &[None; 8]));
        assert!(rule_matches(&r, &GRASS, &[Some(WATER); 8]));
    }

    #[test]
    fn satisfying_neighborhood_matches_its_pattern() {
        let pattern = [
            MustNotBeSelf,
            MustBeSelf,
            DontCare,
            MustBeSelf,
            MustNotBeSelf,
            DontCare,
            MustBeSelf,
            MustBeSelf,
        ];
        let r = rule(pattern);

        let with_empty = satisfying_neighborhood(&pattern, &GRASS, None);
        assert!(rule_matches(&r, &GRASS, &with_empty));

        let with_water = satisfying_neighborhood(&pattern, &GRASS, Some(WATER));
        assert_eq!(with_water[1], Some(GRASS));
        assert_eq!(with_water[0], Some(WATER));
        assert!(rule_matches(&r, &GRASS, &with_water));
    }
}
