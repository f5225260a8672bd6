//! Level data contract
//!
//! `LevelData` is the immutable input a run starts from. It is deep-copied
//! into the live grid and registry, so in-run mutation never touches the
//! source and the same level can be replayed or retried.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{SKY_COLOR, TILE_SIZE};
use crate::error::LoadError;
use crate::sim::entity::{Behavior, EnemyVariant, Entity, EntityKind, Facing};
use crate::sim::grid::{Tile, TileGrid};
use crate::tuning::Tuning;

/// Preferred player start x in pixels
pub const START_X: f32 = 50.0;
/// How many columns left of the start column the ground search may look
const START_SEARCH_COLUMNS: i32 = 10;
/// Row whose top the player is placed on when no ground is found
const FALLBACK_GROUND_ROW: i32 = 12;

/// Plain `{x, y}` pair as it appears in level JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Entity type names used by level authors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Player,
    Goomba,
    Koopa,
    Mushroom,
    Flower,
    Fireball,
    Particle,
    Flag,
}

/// One authored entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub pos: Point,
    #[serde(default)]
    pub vel: Point,
    pub width: f32,
    pub height: f32,
    /// -1 left, 1 right
    #[serde(default = "default_direction")]
    pub direction: i32,
    /// Free-form state tag ("rex", "koopa", "spawning", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

fn default_direction() -> i32 {
    1
}

impl EntitySpec {
    pub fn goomba(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            kind: EntityType::Goomba,
            pos: Point { x: pos.x, y: pos.y },
            vel: Point { x: -0.5, y: 0.0 },
            width: 16.0,
            height: 16.0,
            direction: -1,
            state: None,
        }
    }

    /// Live entity for this spec. Player, particle and flag specs have no
    /// registry counterpart and yield `None`.
    pub fn to_entity(&self, tuning: &Tuning) -> Option<Entity> {
        let kind = match self.kind {
            EntityType::Goomba => EntityKind::GroundEnemy(self.variant()),
            EntityType::Koopa => EntityKind::GroundEnemy(EnemyVariant::Koopa),
            EntityType::Mushroom => EntityKind::Mushroom,
            EntityType::Flower => EntityKind::FireFlower,
            EntityType::Fireball => EntityKind::Fireball,
            EntityType::Player | EntityType::Particle | EntityType::Flag => return None,
        };

        let mut entity = Entity::new(kind, self.pos.into(), Vec2::new(self.width, self.height));
        entity.id = self.id;
        entity.body.vel = self.vel.into();
        entity.facing = Facing::from_sign(self.direction as f32);
        if self.state.as_deref() == Some("spawning") && kind.is_pickup() {
            entity.behavior = Behavior::Spawning {
                frames_left: tuning.powerup_spawn_frames,
            };
        }
        Some(entity)
    }

    fn variant(&self) -> EnemyVariant {
        match self.state.as_deref() {
            Some("rex") => EnemyVariant::Rex,
            Some("koopa") => EnemyVariant::Koopa,
            _ => EnemyVariant::Goomba,
        }
    }

    fn has_valid_box(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// External level input: tile map, initial entities, background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    /// Row-major tile codes
    pub map: Vec<Vec<i32>>,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default = "default_background")]
    pub background_color: String,
    /// `[col, row]` of question blocks that hold a power-up
    #[serde(default)]
    pub power_up_slots: Vec<[i32; 2]>,
}

fn default_background() -> String {
    SKY_COLOR.to_string()
}

impl LevelData {
    /// Level with the given map and nothing else
    pub fn from_map(map: Vec<Vec<i32>>) -> Self {
        Self {
            map,
            entities: Vec::new(),
            background_color: default_background(),
            power_up_slots: Vec::new(),
        }
    }

    /// Parse and validate level JSON
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Load and validate a level JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level {} ({}x{}, {} entities)",
            path.display(),
            level.width(),
            level.map.len(),
            level.entities.len()
        );
        Ok(level)
    }

    /// Reject maps with no tiles and entities with non-positive boxes.
    /// Ragged rows are allowed (the grid pads them).
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.width() == 0 {
            return Err(LoadError::EmptyMap);
        }
        if let Some(bad) = self.entities.iter().find(|e| !e.has_valid_box()) {
            return Err(LoadError::InvalidEntity {
                id: bad.id,
                width: bad.width,
                height: bad.height,
            });
        }
        Ok(())
    }

    /// Widest row
    pub fn width(&self) -> usize {
        self.map.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Fresh, independent tile grid for a run
    pub fn build_grid(&self) -> TileGrid {
        TileGrid::from_rows(&self.map, self.power_up_slots.iter().map(|&[c, r]| (c, r)))
    }

    /// Fresh live entities for a run; invalid specs are skipped
    pub fn build_entities(&self, tuning: &Tuning) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|spec| {
                let ok = spec.has_valid_box();
                if !ok {
                    log::warn!("Skipping entity {} with invalid box", spec.id);
                }
                ok
            })
            .filter_map(|spec| spec.to_entity(tuning))
            .collect()
    }
}

/// Where to place a player of `height` at level start.
///
/// Scans the start column and up to nine columns to its left for the topmost
/// standable tile. Returns the position and whether ground was found; the
/// fallback sits on row 12 at the preferred x.
pub fn find_safe_start(grid: &TileGrid, height: f32) -> (Vec2, bool) {
    let start_col = crate::to_tile(START_X);
    for offset in 0..START_SEARCH_COLUMNS {
        let col = (start_col - offset).max(0);
        if let Some(row) = grid.topmost_in_column(col, Tile::is_standable) {
            let pos = Vec2::new(col as f32 * TILE_SIZE + 2.0, row as f32 * TILE_SIZE - height);
            return (pos, true);
        }
    }
    log::warn!("No ground near the start column; using fallback spawn");
    (
        Vec2::new(START_X, FALLBACK_GROUND_ROW as f32 * TILE_SIZE - height),
        false,
    )
}

/// Reference level dimensions
pub const DEFAULT_LEVEL_WIDTH: usize = 220;
pub const DEFAULT_LEVEL_HEIGHT: usize = 15;

/// Small authoring helper for the built-in level
struct LevelBuilder {
    map: Vec<Vec<i32>>,
}

impl LevelBuilder {
    fn new(width: usize, height: usize) -> Self {
        Self {
            map: vec![vec![Tile::Air.code(); width]; height],
        }
    }

    fn set(&mut self, col: i32, row: i32, tile: Tile) {
        if col < 0 || row < 0 {
            return;
        }
        if let Some(cell) = self
            .map
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        {
            *cell = tile.code();
        }
    }

    fn fill(&mut self, col: i32, row: i32, w: i32, h: i32, tile: Tile) {
        for y in row..row + h {
            for x in col..col + w {
                self.set(x, y, tile);
            }
        }
    }

    /// Ground strip two rows deep at rows 13-14
    fn ground(&mut self, col: i32, width: i32) {
        self.fill(col, 13, width, 2, Tile::Ground);
    }

    /// Two-wide pipe of `h` rows standing on the ground
    fn pipe(&mut self, col: i32, h: i32) {
        let top = 13 - h;
        self.set(col, top, Tile::PipeTopLeft);
        self.set(col + 1, top, Tile::PipeTopRight);
        for row in top + 1..=13 {
            self.set(col, row, Tile::PipeLeft);
            self.set(col + 1, row, Tile::PipeRight);
        }
    }

    /// Hard-block staircase rising away from `col` in `dir`
    fn stair(&mut self, col: i32, h: i32, dir: i32) {
        for i in 0..h {
            for j in 0..=i {
                self.set(col + i * dir, 12 - j, Tile::HardBlock);
            }
        }
    }
}

/// The built-in reference level (a 1-1 style course) with its goombas
pub fn default_level() -> LevelData {
    let mut b = LevelBuilder::new(DEFAULT_LEVEL_WIDTH, DEFAULT_LEVEL_HEIGHT);

    // Ground runs with three pits
    b.ground(0, 69);
    b.ground(71, 15);
    b.ground(89, 64);
    b.ground(155, 65);

    // Scenery
    for col in [8, 19, 56, 67, 103, 114, 152, 163] {
        b.set(col, 3, Tile::Cloud);
    }
    for col in [27, 36, 75, 84, 123, 132, 171, 180] {
        b.set(col, 4, Tile::Cloud);
    }
    for col in [0, 48, 96, 144, 192] {
        b.set(col, 10, Tile::Hill);
    }
    for col in [16, 64, 112, 160] {
        b.set(col, 11, Tile::Hill);
    }
    for col in [11, 59, 107, 155, 23, 71, 119, 167] {
        b.set(col, 12, Tile::Bush);
    }

    // Opening block row
    b.set(16, 9, Tile::QuestionBlock);
    b.set(20, 9, Tile::Brick);
    b.set(21, 9, Tile::QuestionBlock);
    b.set(22, 9, Tile::Brick);
    b.set(23, 9, Tile::QuestionBlock);
    b.set(24, 9, Tile::Brick);
    b.set(22, 5, Tile::QuestionBlock);

    b.pipe(28, 2);
    b.pipe(38, 3);
    b.pipe(46, 4);
    b.pipe(57, 4);

    b.set(64, 8, Tile::InvisibleBlock);
    b.set(77, 9, Tile::Brick);
    b.set(78, 9, Tile::QuestionBlock);
    b.set(79, 9, Tile::Brick);

    b.fill(80, 5, 8, 1, Tile::Brick);
    b.fill(91, 5, 3, 1, Tile::Brick);
    b.set(94, 5, Tile::QuestionBlock);
    b.set(94, 9, Tile::Brick);

    b.set(100, 9, Tile::Brick);
    b.set(101, 9, Tile::Brick);
    b.set(105, 9, Tile::QuestionBlock);
    b.set(106, 9, Tile::QuestionBlock);
    b.set(109, 9, Tile::QuestionBlock);
    b.set(109, 5, Tile::QuestionBlock);

    b.set(118, 9, Tile::Brick);
    b.fill(119, 5, 3, 1, Tile::Brick);
    b.set(129, 5, Tile::Brick);
    b.set(130, 5, Tile::Brick);
    b.set(129, 9, Tile::PipeLeft);
    b.set(130, 9, Tile::Brick);

    b.stair(134, 4, 1);
    b.stair(143, 4, -1);
    b.stair(148, 4, 1);
    b.stair(155, 4, -1);
    b.stair(181, 8, 1);

    // Flagpole on its base block, then the castle
    b.set(198, 12, Tile::HardBlock);
    b.fill(198, 2, 1, 10, Tile::Pole);
    b.set(198, 2, Tile::Flag);
    b.set(202, 12, Tile::Castle);

    let goomba_cols = [
        22.0, 40.0, 51.0, 52.5, 80.0, 82.0, 97.0, 98.5, 114.0, 115.5, 124.0, 125.5, 174.0, 175.5,
    ];
    let entities = goomba_cols
        .iter()
        .enumerate()
        .map(|(i, &col)| EntitySpec::goomba(100 + i as u32, Vec2::new(col * TILE_SIZE, 10.0 * TILE_SIZE)))
        .collect();

    LevelData {
        map: b.map,
        entities,
        background_color: default_background(),
        power_up_slots: vec![[21, 9], [78, 9], [109, 9], [109, 5]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_shape() {
        let level = default_level();
        assert_eq!(level.map.len(), DEFAULT_LEVEL_HEIGHT);
        assert_eq!(level.width(), DEFAULT_LEVEL_WIDTH);
        assert_eq!(level.entities.len(), 14);
        assert!(level.validate().is_ok());

        let grid = level.build_grid();
        assert_eq!(grid.tile(198, 2), Some(Tile::Flag));
        assert_eq!(grid.tile(28, 11), Some(Tile::PipeTopLeft));
        assert_eq!(grid.tile(29, 13), Some(Tile::PipeRight));
        assert_eq!(grid.tile(69, 13), Some(Tile::Air));
        assert!(grid.is_power_up_slot(21, 9));
        assert!(!grid.is_power_up_slot(16, 9));
    }

    #[test]
    fn test_stairs_rise_in_direction() {
        let grid = default_level().build_grid();
        // Rising right from 134: the fourth step is four blocks tall
        assert_eq!(grid.topmost_in_column(137, Tile::is_solid), Some(9));
        // Descending-left stair from 143 mirrors it
        assert_eq!(grid.topmost_in_column(140, Tile::is_solid), Some(9));
    }

    #[test]
    fn test_json_round_trip_field_names() {
        let json = r##"{
            "map": [[0, 0], [1, 1]],
            "entities": [
                { "id": 7, "type": "GOOMBA", "pos": {"x": 4, "y": 0}, "width": 16, "height": 16, "direction": -1, "state": "rex" }
            ],
            "backgroundColor": "#000000",
            "powerUpSlots": [[1, 0]]
        }"##;
        let level = LevelData::from_json(json).unwrap();
        assert_eq!(level.background_color, "#000000");
        assert_eq!(level.power_up_slots, vec![[1, 0]]);

        let entity = level.entities[0].to_entity(&Tuning::default()).unwrap();
        assert_eq!(entity.id, 7);
        assert_eq!(entity.kind, EntityKind::GroundEnemy(EnemyVariant::Rex));
        assert_eq!(entity.facing, Facing::Left);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let level = LevelData::from_json(r#"{ "map": [[1]] }"#).unwrap();
        assert!(level.entities.is_empty());
        assert_eq!(level.background_color, SKY_COLOR);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            LevelData::from_json(r#"{ "map": [] }"#),
            Err(LoadError::EmptyMap)
        ));
        assert!(matches!(
            LevelData::from_json(r#"{ "map": [[], []] }"#),
            Err(LoadError::EmptyMap)
        ));
        let bad_box = r#"{ "map": [[1]], "entities": [
            { "id": 3, "type": "GOOMBA", "pos": {"x": 0, "y": 0}, "width": 0, "height": 16 }
        ] }"#;
        assert!(matches!(
            LevelData::from_json(bad_box),
            Err(LoadError::InvalidEntity { id: 3, .. })
        ));
    }

    #[test]
    fn test_spawning_tag_only_for_pickups() {
        let tuning = Tuning::default();
        let mut spec = EntitySpec::goomba(1, Vec2::ZERO);
        spec.kind = EntityType::Mushroom;
        spec.state = Some("spawning".into());
        assert!(spec.to_entity(&tuning).unwrap().is_spawning());

        let mut enemy = EntitySpec::goomba(2, Vec2::ZERO);
        enemy.state = Some("spawning".into());
        assert!(!enemy.to_entity(&tuning).unwrap().is_spawning());
    }

    #[test]
    fn test_player_spec_has_no_entity() {
        let mut spec = EntitySpec::goomba(1, Vec2::ZERO);
        spec.kind = EntityType::Player;
        assert!(spec.to_entity(&Tuning::default()).is_none());
    }

    #[test]
    fn test_safe_start_on_ground() {
        let grid = default_level().build_grid();
        let (pos, found) = find_safe_start(&grid, 16.0);
        assert!(found);
        assert_eq!(pos, Vec2::new(50.0, 13.0 * TILE_SIZE - 16.0));
    }

    #[test]
    fn test_safe_start_searches_left() {
        // Ground only in column 0
        let mut map = vec![vec![0; 8]; 15];
        map[14][0] = 1;
        let grid = LevelData::from_map(map).build_grid();
        let (pos, found) = find_safe_start(&grid, 16.0);
        assert!(found);
        assert_eq!(pos, Vec2::new(2.0, 14.0 * TILE_SIZE - 16.0));
    }

    #[test]
    fn test_safe_start_fallback() {
        let grid = LevelData::from_map(vec![vec![0; 40]; 15]).build_grid();
        let (pos, found) = find_safe_start(&grid, 16.0);
        assert!(!found);
        assert_eq!(pos, Vec2::new(START_X, 12.0 * TILE_SIZE - 16.0));

        // Even a completely empty grid gets the fallback
        let empty = LevelData::from_map(Vec::new()).build_grid();
        assert!(!find_safe_start(&empty, 16.0).1);
    }
}
