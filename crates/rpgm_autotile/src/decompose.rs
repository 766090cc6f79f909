//! Turning source autotiles into an atlas plus rule set
//!
//! One table-driven path handles both conventions: the pattern table names XP
//! quadrants, the convention remaps them, and [`composite_cell`] stitches each
//! atlas cell from the source frame.

use rpgm_autotile_core::{AtlasLayout, CellGrid, PixelBuffer, PixelRegion, SpriteRef};
use rpgm_autotile_rules::{OutputKind, RuleSet};
use tracing::{debug, trace, warn};

use crate::compositor::{composite_cell, Frame};
use crate::{AutotileError, Convention, DecomposeConfig, PatternTable};

/// Atlas cell used when no rule matches: the isolated tile
pub const DEFAULT_SPRITE_CELL: u32 = 46;

/// Check that a source divides exactly into `frame_count` frames of
/// `convention` cells of `cell_size` pixels.
pub fn validate_source(
    width: u32,
    height: u32,
    cell_size: u32,
    frame_count: u32,
    convention: Convention,
) -> Result<(), AutotileError> {
    let (columns, rows) = convention.frame_grid();
    let fits = frame_count >= 1
        && cell_size > 0
        && cell_size % 2 == 0
        && span(frame_count, columns, cell_size) == Some(width as u64)
        && span(1, rows, cell_size) == Some(height as u64);

    if fits {
        Ok(())
    } else {
        Err(AutotileError::InvalidSourceDimensions {
            width,
            height,
            frame_count,
            cell_size,
            convention,
        })
    }
}

/// Whether a `width` x `height` image can be decomposed as `frame_count`
/// frames of `convention`, with the cell size inferred from the width.
pub fn is_source_valid(width: u32, height: u32, frame_count: u32, convention: Convention) -> bool {
    convention
        .infer_cell_size(width, height, frame_count)
        .is_some()
}

/// Result of decomposing one autotile
#[derive(Debug, Clone)]
pub struct Decomposed {
    /// 8 x 6 cells per frame, frames left to right
    pub atlas: PixelBuffer,
    pub rules: RuleSet,
    pub layout: AtlasLayout,
}

/// Result of decomposing a sheet of autotiles
#[derive(Debug, Clone)]
pub struct DecomposedSheet {
    pub atlas: PixelBuffer,
    /// One rule set per block, row-major from the top-left
    pub rule_sets: Vec<RuleSet>,
    pub layout: AtlasLayout,
}

impl DecomposedSheet {
    /// Sprite name taken from the rule set of the sprite's block, e.g. `water_5`
    pub fn sprite_name(&self, sprite: &SpriteRef) -> Option<String> {
        let rules = self.rule_sets.get(sprite.block as usize)?;
        Some(sprite.name_in_block(&rules.name))
    }
}

/// Decomposes autotile sources according to a [`DecomposeConfig`]
#[derive(Debug, Clone, Default)]
pub struct TilesetDecomposer {
    config: DecomposeConfig,
}

impl TilesetDecomposer {
    pub fn new(config: DecomposeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecomposeConfig {
        &self.config
    }

    /// Decompose a single autotile, all frames laid out horizontally.
    ///
    /// Dimensions are checked before anything is allocated; any failure
    /// aborts the whole decomposition.
    pub fn decompose(&self, source: &PixelBuffer) -> Result<Decomposed, AutotileError> {
        let config = &self.config;
        config.validate()?;
        let cell_size = config.resolved_cell_size(source.width(), source.height())?;

        let layout = AtlasLayout::single(cell_size, config.frame_count);
        let (atlas_width, atlas_height) = layout.pixel_size()?;
        debug!(
            "Decomposing {} autotile '{}': {}x{} source, {}px cells, {} frame(s)",
            config.convention.display_name(),
            config.name,
            source.width(),
            source.height(),
            cell_size,
            config.frame_count
        );

        let (frame_width, frame_height) = config.convention.frame_size(cell_size);
        let source_cells =
            CellGrid::square(PixelRegion::new(0, 0, frame_width, frame_height), cell_size);
        let dest_cells = layout.cell_grid(0, 0)?;

        let mut atlas = PixelBuffer::new(atlas_width, atlas_height);
        for index in 0..config.frame_count {
            trace!("Compositing frame {}/{}", index + 1, config.frame_count);
            let frame = Frame::new(index, config.frame_count);
            for entry in PatternTable::entries() {
                composite_cell(
                    source,
                    &source_cells,
                    entry.quadrants_for(config.convention),
                    &mut atlas,
                    &dest_cells,
                    entry.pattern_id as usize,
                    frame,
                )?;
            }
        }

        let rules = self.build_rules(config.name.clone(), 0, config.frame_count)?;
        Ok(Decomposed {
            atlas,
            rules,
            layout,
        })
    }

    /// Decompose a sheet packing `columns` x `rows` single-frame autotiles,
    /// such as an MV A2 tileset.
    ///
    /// Each block gets its own 8 x 6 atlas block and rule set, named from
    /// `names` in block order or `autotile_{index}` past the end of it.
    pub fn decompose_sheet(
        &self,
        source: &PixelBuffer,
        columns: u32,
        rows: u32,
        names: &[String],
    ) -> Result<DecomposedSheet, AutotileError> {
        let config = &self.config;
        config.validate()?;
        if config.frame_count != 1 {
            return Err(AutotileError::Config(format!(
                "sheets are single-frame, got frame_count = {}",
                config.frame_count
            )));
        }
        if columns == 0 || rows == 0 {
            return Err(AutotileError::Config(format!(
                "sheet needs at least one block, got {columns}x{rows}"
            )));
        }

        let (block_columns, _) = config.convention.frame_grid();
        let cell_size = config
            .cell_size
            .unwrap_or(source.width() / columns.saturating_mul(block_columns));
        validate_sheet(source, columns, rows, cell_size, config.convention)?;

        let layout = AtlasLayout::sheet(cell_size, columns, rows);
        let (atlas_width, atlas_height) = layout.pixel_size()?;
        let block_count = layout.block_count();
        if names.len() < block_count {
            warn!(
                "Sheet has {} blocks but only {} names, using generated names for the rest",
                block_count,
                names.len()
            );
        }
        debug!(
            "Decomposing {}x{} {} sheet: {}x{} source, {}px cells",
            columns,
            rows,
            config.convention.display_name(),
            source.width(),
            source.height(),
            cell_size
        );

        let (frame_width, frame_height) = config.convention.frame_size(cell_size);
        let source_blocks = CellGrid::new(source.bounds(), frame_width, frame_height);

        let mut atlas = PixelBuffer::new(atlas_width, atlas_height);
        let mut rule_sets = Vec::with_capacity(block_count);
        for block in 0..block_count {
            trace!("Compositing block {}/{}", block + 1, block_count);
            let source_cells = source_blocks.subgrid(block, cell_size, cell_size)?;
            let dest_cells = layout.cell_grid(block as u32, 0)?;
            for entry in PatternTable::entries() {
                composite_cell(
                    source,
                    &source_cells,
                    entry.quadrants_for(config.convention),
                    &mut atlas,
                    &dest_cells,
                    entry.pattern_id as usize,
                    Frame::SINGLE,
                )?;
            }

            let name = names
                .get(block)
                .cloned()
                .unwrap_or_else(|| format!("autotile_{block}"));
            rule_sets.push(self.build_rules(name, block as u32, 1)?);
        }

        Ok(DecomposedSheet {
            atlas,
            rule_sets,
            layout,
        })
    }

    /// One rule per pattern, in pattern order, drawing from `block`
    fn build_rules(
        &self,
        name: String,
        block: u32,
        frame_count: u32,
    ) -> Result<RuleSet, AutotileError> {
        let output = if frame_count == 1 {
            OutputKind::Single
        } else {
            OutputKind::Animation
        };

        let mut rules = RuleSet::new(name, SpriteRef::in_block(block, 0, DEFAULT_SPRITE_CELL));
        for entry in PatternTable::entries() {
            let frames = (0..frame_count)
                .map(|frame| SpriteRef::in_block(block, frame, entry.pattern_id as u32))
                .collect();
            rules.push(entry.to_rule(
                output,
                frames,
                self.config.animation_speed,
                self.config.collider,
            )?);
        }
        Ok(rules)
    }
}

/// Like [`validate_source`] for `columns` x `rows` blocks of one frame each
fn validate_sheet(
    source: &PixelBuffer,
    columns: u32,
    rows: u32,
    cell_size: u32,
    convention: Convention,
) -> Result<(), AutotileError> {
    let (block_width, block_height) = convention.frame_grid();
    let fits = cell_size > 0
        && cell_size % 2 == 0
        && span(columns, block_width, cell_size) == Some(source.width() as u64)
        && span(rows, block_height, cell_size) == Some(source.height() as u64);

    if fits {
        Ok(())
    } else {
        Err(AutotileError::InvalidSourceDimensions {
            width: source.width(),
            height: source.height(),
            frame_count: 1,
            cell_size,
            convention,
        })
    }
}

/// Pixels spanned by `count` blocks of `cells` cells, `None` past `u64`
fn span(count: u32, cells: u32, cell_size: u32) -> Option<u64> {
    (count as u64)
        .checked_mul(cells as u64)?
        .checked_mul(cell_size as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpgm_autotile_rules::ColliderHint;

    fn opaque(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| [x as u8, y as u8, 0, 255])
    }

    #[test]
    fn test_validate_source() {
        assert!(validate_source(96, 128, 32, 1, Convention::Xp).is_ok());
        assert!(validate_source(288, 128, 32, 3, Convention::Xp).is_ok());
        assert!(validate_source(96, 144, 48, 1, Convention::Mv).is_ok());
        assert!(validate_source(96, 128, 32, 0, Convention::Xp).is_err());
        assert!(validate_source(6, 8, 2, 1, Convention::Xp).is_ok());
        assert!(validate_source(3, 4, 1, 1, Convention::Xp).is_err());
    }

    #[test]
    fn test_is_source_valid() {
        assert!(is_source_valid(96, 128, 1, Convention::Xp));
        assert!(is_source_valid(96, 144, 1, Convention::Mv));
        assert!(!is_source_valid(96, 128, 1, Convention::Mv));
        assert!(!is_source_valid(96, 128, 2, Convention::Xp));
    }

    #[test]
    fn test_decompose_single_frame() {
        let decomposer = TilesetDecomposer::new(DecomposeConfig::default().with_name("grass"));
        let result = decomposer.decompose(&opaque(24, 32)).unwrap();

        assert_eq!(result.layout, AtlasLayout::single(8, 1));
        assert_eq!(result.atlas.width(), 64);
        assert_eq!(result.atlas.height(), 48);

        assert_eq!(result.rules.name, "grass");
        assert_eq!(result.rules.len(), 47);
        assert_eq!(result.rules.default_sprite, SpriteRef::new(0, DEFAULT_SPRITE_CELL));
        for (i, rule) in result.rules.rules.iter().enumerate() {
            assert_eq!(rule.output(), OutputKind::Single);
            assert_eq!(rule.frames(), &[SpriteRef::new(0, i as u32)]);
            assert_eq!(rule.collider(), ColliderHint::Sprite);
        }
    }

    #[test]
    fn test_decompose_animated_rules() {
        let config = DecomposeConfig::new(Convention::Mv)
            .with_frames(3, 6.0)
            .with_collider(ColliderHint::None);
        let result = TilesetDecomposer::new(config)
            .decompose(&opaque(3 * 16, 24))
            .unwrap();

        assert_eq!(result.atlas.width(), 3 * 8 * 8);
        let rule = result.rules.get(5).unwrap();
        assert_eq!(rule.output(), OutputKind::Animation);
        assert_eq!(rule.animation_speed(), 6.0);
        assert_eq!(rule.collider(), ColliderHint::None);
        assert_eq!(
            rule.frames(),
            &[SpriteRef::new(0, 5), SpriteRef::new(1, 5), SpriteRef::new(2, 5)]
        );
    }

    #[test]
    fn test_decompose_rejects_bad_dimensions() {
        let decomposer = TilesetDecomposer::default();
        assert!(matches!(
            decomposer.decompose(&opaque(24, 31)),
            Err(AutotileError::InvalidSourceDimensions { .. })
        ));
        // 3 x 4 cells of 3px cannot be split into quadrants
        assert!(decomposer.decompose(&opaque(9, 12)).is_err());
    }

    #[test]
    fn test_extreme_dimensions_are_rejected_not_overflowed() {
        assert!(!is_source_valid(u32::MAX - 3, 128, 1, Convention::Xp));
        assert!(!is_source_valid(u32::MAX, u32::MAX, u32::MAX, Convention::Mv));
        assert!(
            validate_source(u32::MAX, u32::MAX, u32::MAX - 1, u32::MAX, Convention::Xp).is_err()
        );

        let decomposer =
            TilesetDecomposer::new(DecomposeConfig::default().with_frames(u32::MAX, 1.0));
        assert!(matches!(
            decomposer.decompose(&PixelBuffer::new(6, 8)),
            Err(AutotileError::InvalidSourceDimensions { frame_count: u32::MAX, .. })
        ));

        let sheet = TilesetDecomposer::new(
            DecomposeConfig::new(Convention::Mv).with_cell_size(u32::MAX - 1),
        );
        assert!(sheet
            .decompose_sheet(&PixelBuffer::new(8, 12), u32::MAX, u32::MAX, &[])
            .is_err());
    }

    #[test]
    fn test_decompose_sheet() {
        let config = DecomposeConfig::new(Convention::Mv);
        let names = vec!["water".to_string(), "lava".to_string()];
        let sheet = TilesetDecomposer::new(config)
            .decompose_sheet(&opaque(2 * 8, 2 * 12), 2, 2, &names)
            .unwrap();

        assert_eq!(sheet.layout, AtlasLayout::sheet(4, 2, 2));
        assert_eq!(sheet.atlas.width(), 2 * 8 * 4);
        assert_eq!(sheet.atlas.height(), 2 * 6 * 4);

        let names: Vec<&str> = sheet.rule_sets.iter().map(|set| set.name.as_str()).collect();
        assert_eq!(names, vec!["water", "lava", "autotile_2", "autotile_3"]);

        let last = &sheet.rule_sets[3];
        assert_eq!(last.default_sprite, SpriteRef::in_block(3, 0, 46));
        assert_eq!(last.get(0).unwrap().first_frame(), SpriteRef::in_block(3, 0, 0));

        assert_eq!(sheet.sprite_name(&SpriteRef::new(0, 5)).as_deref(), Some("water_5"));
        assert_eq!(
            sheet.sprite_name(&last.default_sprite).as_deref(),
            Some("autotile_3_46")
        );
        assert_eq!(sheet.sprite_name(&SpriteRef::in_block(4, 0, 0)), None);
    }

    #[test]
    fn test_decompose_sheet_rejects_animation_and_bad_size() {
        let animated =
            TilesetDecomposer::new(DecomposeConfig::new(Convention::Mv).with_frames(2, 1.0));
        assert!(matches!(
            animated.decompose_sheet(&opaque(16, 12), 1, 1, &[]),
            Err(AutotileError::Config(_))
        ));

        let decomposer = TilesetDecomposer::new(DecomposeConfig::new(Convention::Mv));
        assert!(decomposer.decompose_sheet(&opaque(16, 12), 0, 1, &[]).is_err());
        assert!(matches!(
            decomposer.decompose_sheet(&opaque(16, 13), 2, 1, &[]),
            Err(AutotileError::InvalidSourceDimensions { .. })
        ));
    }
}
