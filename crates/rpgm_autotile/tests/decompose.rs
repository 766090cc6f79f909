use rpgm_autotile::rpgm_autotile_rules::satisfying_neighborhood;
use rpgm_autotile::{
    is_source_valid, select, AutoTile, ColliderHint, Convention, DecomposeConfig, NeighborSlot,
    PixelBuffer, Rule, RuleSet, SpriteRef, TileSelect, TileTransform, TilesetDecomposer,
    MV_QUADRANT_REMAP, PATTERN_COUNT, QUADRANT_SOURCES,
};

const CELL: u32 = 4;
const HALF: u32 = CELL / 2;

/// Every pixel carries its own frame-local position and frame index
fn marked_source(convention: Convention, frame_count: u32) -> PixelBuffer {
    let (frame_width, frame_height) = convention.frame_size(CELL);
    PixelBuffer::from_fn(frame_width * frame_count, frame_height, |x, y| {
        [(x % frame_width) as u8, y as u8, (x / frame_width) as u8, 255]
    })
}

/// Bottom-left pixel of quadrant `q` in a source frame with `columns` x `rows`
/// quadrants, counting rows from the top
fn quadrant_origin(q: u32, columns: u32, rows: u32) -> (u32, u32) {
    ((q % columns) * HALF, (rows - 1 - q / columns) * HALF)
}

/// Check every copied pixel of every pattern cell against the source markers
fn assert_round_trip(convention: Convention, frame_count: u32) {
    let config = DecomposeConfig::new(convention).with_frames(frame_count, 1.0);
    let result = TilesetDecomposer::new(config)
        .decompose(&marked_source(convention, frame_count))
        .unwrap();
    let atlas = &result.atlas;
    let (quad_columns, quad_rows) = match convention {
        Convention::Xp => (6, 8),
        Convention::Mv => (4, 6),
    };

    for frame in 0..frame_count {
        for pattern in 0..PATTERN_COUNT as u32 {
            let cell_x = frame * 8 * CELL + (pattern % 8) * CELL;
            let cell_y = (5 - pattern / 8) * CELL;

            for slot in 0..4u32 {
                let xp_quadrant = QUADRANT_SOURCES[pattern as usize][slot as usize];
                let quadrant = match convention {
                    Convention::Xp => xp_quadrant,
                    Convention::Mv => MV_QUADRANT_REMAP[xp_quadrant as usize],
                } as u32;
                let (qx, qy) = quadrant_origin(quadrant, quad_columns, quad_rows);
                let slot_x = cell_x + (slot % 2) * HALF;
                let slot_y = cell_y + (1 - slot / 2) * HALF;

                for dy in 0..HALF {
                    for dx in 0..HALF {
                        assert_eq!(
                            atlas.get(slot_x + dx, slot_y + dy),
                            Some([(qx + dx) as u8, (qy + dy) as u8, frame as u8, 255]),
                            "pattern {pattern} slot {slot} frame {frame}"
                        );
                    }
                }
            }
        }

        // Cell 47 is never written
        let blank = result.layout.sprite_region(&SpriteRef::new(frame, 47)).unwrap();
        assert!(atlas.is_region_clear(&blank));
    }
}

#[test]
fn xp_decomposition_copies_exact_quadrants() {
    assert_round_trip(Convention::Xp, 1);
}

#[test]
fn xp_animated_decomposition_copies_each_frame() {
    assert_round_trip(Convention::Xp, 3);
}

#[test]
fn mv_decomposition_follows_remap() {
    assert_round_trip(Convention::Mv, 1);
    assert_round_trip(Convention::Mv, 2);
}

#[test]
fn animated_atlas_is_wider_per_frame() {
    let single = TilesetDecomposer::new(DecomposeConfig::default())
        .decompose(&marked_source(Convention::Xp, 1))
        .unwrap();
    let animated = TilesetDecomposer::new(DecomposeConfig::default().with_frames(3, 2.0))
        .decompose(&marked_source(Convention::Xp, 3))
        .unwrap();

    assert_eq!(animated.atlas.width(), 3 * single.atlas.width());
    assert_eq!(animated.atlas.height(), single.atlas.height());
}

#[test]
fn source_validity_rejects_off_by_one() {
    for &convention in Convention::all() {
        let cell = convention.default_cell_size();
        let (width, height) = convention.frame_size(cell);

        assert!(is_source_valid(width, height, 1, convention));
        assert!(is_source_valid(width * 4, height, 4, convention));
        assert!(!is_source_valid(width + 1, height, 1, convention));
        assert!(!is_source_valid(width - 1, height, 1, convention));
        assert!(!is_source_valid(width, height + 1, 1, convention));
        assert!(!is_source_valid(width, height - 1, 1, convention));
        assert!(!is_source_valid(width * 4 + 1, height, 4, convention));
        assert!(!is_source_valid(width, height, 0, convention));
    }
}

#[test]
fn invalid_source_fails_before_any_work() {
    let decomposer = TilesetDecomposer::new(DecomposeConfig::new(Convention::Mv));
    let err = decomposer.decompose(&PixelBuffer::new(97, 144)).unwrap_err();
    assert!(err.to_string().contains("97x144"));
}

#[test]
fn every_pattern_selects_its_own_rule() {
    let result = TilesetDecomposer::new(DecomposeConfig::default())
        .decompose(&marked_source(Convention::Xp, 1))
        .unwrap();
    let tile = AutoTile::new(result.rules.clone(), 1u8);

    for (index, rule) in result.rules.rules.iter().enumerate() {
        for other in [None, Some(2u8)] {
            let neighbors = satisfying_neighborhood(rule.neighbors(), &1u8, other);
            let selection = select(&result.rules, &1u8, &neighbors, ColliderHint::Grid);
            assert_eq!(selection.rule_index, Some(index));
            assert_eq!(selection.sprite, SpriteRef::new(0, index as u32));
        }
    }

    // Every one of the 256 neighborhoods is covered by some pattern
    for mask in 0u32..256 {
        let selection = tile.select_at(0, 0, |x, y| {
            let slot = match (x, y) {
                (-1, -1) => 0,
                (0, -1) => 1,
                (1, -1) => 2,
                (-1, 0) => 3,
                (1, 0) => 4,
                (-1, 1) => 5,
                (0, 1) => 6,
                (1, 1) => 7,
                _ => return Some(1u8),
            };
            (mask & (1 << slot) != 0).then_some(1u8)
        });
        assert!(!selection.is_default(), "mask {mask:08b} fell back");
    }
}

#[test]
fn earlier_rule_shadows_surrounded_pattern() {
    let result = TilesetDecomposer::new(DecomposeConfig::default())
        .decompose(&marked_source(Convention::Xp, 1))
        .unwrap();
    let surrounded = [Some(1u8); 8];

    let mut rules = result.rules.clone();
    assert_eq!(select(&rules, &1u8, &surrounded, ColliderHint::Grid).rule_index, Some(0));

    rules.insert(0, Rule::single([NeighborSlot::DontCare; 8], SpriteRef::new(0, 47)));
    let shadowed = select(&rules, &1u8, &surrounded, ColliderHint::Grid);
    assert_eq!(shadowed.rule_index, Some(0));
    assert_eq!(shadowed.sprite, SpriteRef::new(0, 47));

    assert!(rules.move_rule(0, rules.len() - 1));
    let restored = select(&rules, &1u8, &surrounded, ColliderHint::Grid);
    assert_eq!(restored.sprite, SpriteRef::new(0, 0));
}

#[test]
fn empty_rule_set_returns_default_sprite() {
    let rules = RuleSet::new("empty", SpriteRef::new(0, 46));
    let selection = select(&rules, &1u8, &[Some(1u8); 8], ColliderHint::Grid);

    assert!(selection.is_default());
    assert_eq!(selection.sprite, SpriteRef::new(0, 46));
    assert_eq!(selection.transform, TileTransform::IDENTITY);
    assert_eq!(selection.collider, ColliderHint::Grid);
}
