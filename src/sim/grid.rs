//! Tile grid: the mutable level map the simulation collides against
//!
//! Cells hold raw integer tile codes exactly as authored. Codes outside the
//! known set are kept (so the map round-trips) but classify as non-solid and
//! render as nothing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Known tile kinds with their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Air = 0,
    Ground = 1,
    Brick = 2,
    QuestionBlock = 3,
    /// A question block that has already been struck
    UsedBlock = 4,
    HardBlock = 5,
    PipeLeft = 6,
    PipeRight = 7,
    PipeTopLeft = 8,
    PipeTopRight = 9,
    Pole = 10,
    Flag = 11,
    Coin = 12,
    InvisibleBlock = 13,
    Cloud = 14,
    Bush = 15,
    Hill = 16,
    Castle = 17,
}

impl Tile {
    pub fn from_code(code: i32) -> Option<Self> {
        use Tile::*;
        Some(match code {
            0 => Air,
            1 => Ground,
            2 => Brick,
            3 => QuestionBlock,
            4 => UsedBlock,
            5 => HardBlock,
            6 => PipeLeft,
            7 => PipeRight,
            8 => PipeTopLeft,
            9 => PipeTopRight,
            10 => Pole,
            11 => Flag,
            12 => Coin,
            13 => InvisibleBlock,
            14 => Cloud,
            15 => Bush,
            16 => Hill,
            17 => Castle,
            _ => return None,
        })
    }

    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether bodies collide with this tile
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            Tile::Ground
                | Tile::Brick
                | Tile::QuestionBlock
                | Tile::UsedBlock
                | Tile::HardBlock
                | Tile::PipeLeft
                | Tile::PipeRight
                | Tile::PipeTopLeft
                | Tile::PipeTopRight
                | Tile::InvisibleBlock
        )
    }

    /// Tiles the player may be placed on top of at level start
    pub fn is_standable(self) -> bool {
        self.is_solid() && !matches!(self, Tile::UsedBlock | Tile::InvisibleBlock)
    }
}

/// Solidity of a raw code; unknown codes are never solid
#[inline]
pub fn is_solid(code: i32) -> bool {
    Tile::from_code(code).is_some_and(Tile::is_solid)
}

/// Outcome of the player striking a tile from below
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockHit {
    /// Not a reactive block (hard block, used block, ground, pipe...)
    Inert,
    /// Brick struck by a small player
    Bumped,
    /// Brick shattered (now air)
    Broken,
    /// Question block released a coin
    CoinReleased,
    /// Question block in a power-up slot released a power-up
    PowerUpReleased,
}

/// Row-major grid of tile codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<i32>,
    /// Question blocks that release a power-up instead of a coin
    power_up_slots: BTreeSet<(i32, i32)>,
}

impl TileGrid {
    /// Build a grid from authored rows. Ragged rows are padded with air to
    /// the widest row.
    pub fn from_rows(rows: &[Vec<i32>], power_up_slots: impl IntoIterator<Item = (i32, i32)>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();
        let ragged = rows.iter().filter(|r| r.len() != width).count();
        if ragged > 0 {
            log::warn!("Level map has {ragged} short rows; padding to width {width}");
        }

        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            cells.extend_from_slice(row);
            cells.extend(std::iter::repeat_n(Tile::Air.code(), width - row.len()));
        }

        Self {
            width,
            height,
            cells,
            power_up_slots: power_up_slots.into_iter().collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width_px(&self) -> f32 {
        self.width as f32 * crate::consts::TILE_SIZE
    }

    pub fn height_px(&self) -> f32 {
        self.height as f32 * crate::consts::TILE_SIZE
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        (col < self.width && row < self.height).then(|| row * self.width + col)
    }

    /// Raw code at a cell; air for anything out of range
    pub fn tile_at(&self, col: i32, row: i32) -> i32 {
        self.index(col, row)
            .map_or(Tile::Air.code(), |i| self.cells[i])
    }

    /// Known tile at a cell (`None` for unknown codes)
    pub fn tile(&self, col: i32, row: i32) -> Option<Tile> {
        Tile::from_code(self.tile_at(col, row))
    }

    #[inline]
    pub fn is_solid_at(&self, col: i32, row: i32) -> bool {
        is_solid(self.tile_at(col, row))
    }

    /// Overwrite a cell; out-of-range writes are ignored
    pub fn set_tile(&mut self, col: i32, row: i32, tile: Tile) {
        if let Some(i) = self.index(col, row) {
            self.cells[i] = tile.code();
        }
    }

    pub fn is_power_up_slot(&self, col: i32, row: i32) -> bool {
        self.power_up_slots.contains(&(col, row))
    }

    /// One authored row (for renderers); `None` past the bottom
    pub fn row(&self, row: usize) -> Option<&[i32]> {
        self.cells.chunks_exact(self.width.max(1)).nth(row)
    }

    /// All cells holding `tile`, in row-major order
    pub fn positions_of(&self, tile: Tile) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(move |&(_, &code)| code == tile.code())
            .map(move |(i, _)| ((i % width) as i32, (i / width) as i32))
    }

    /// Topmost row in `col` whose tile satisfies `pred`
    pub fn topmost_in_column(&self, col: i32, pred: impl Fn(Tile) -> bool) -> Option<i32> {
        (0..self.height as i32).find(|&row| self.tile(col, row).is_some_and(&pred))
    }

    /// Apply the hit-from-below side effect to one cell.
    ///
    /// Struck question blocks become [`Tile::UsedBlock`], which is inert, so a
    /// block can release its contents only once.
    pub fn hit_from_below(&mut self, col: i32, row: i32, can_break: bool) -> BlockHit {
        match self.tile(col, row) {
            Some(Tile::Brick) if can_break => {
                self.set_tile(col, row, Tile::Air);
                BlockHit::Broken
            }
            Some(Tile::Brick) => BlockHit::Bumped,
            Some(Tile::QuestionBlock) => {
                self.set_tile(col, row, Tile::UsedBlock);
                if self.is_power_up_slot(col, row) {
                    BlockHit::PowerUpReleased
                } else {
                    BlockHit::CoinReleased
                }
            }
            _ => BlockHit::Inert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[i32]]) -> TileGrid {
        let rows: Vec<Vec<i32>> = rows.iter().map(|r| r.to_vec()).collect();
        TileGrid::from_rows(&rows, [])
    }

    #[test]
    fn test_solidity_classification() {
        for code in [1, 2, 3, 4, 5, 6, 7, 8, 9, 13] {
            assert!(is_solid(code), "code {code} should be solid");
        }
        for code in [0, 10, 11, 12, 14, 15, 16, 17, 18, -1, 999] {
            assert!(!is_solid(code), "code {code} should not be solid");
        }
    }

    #[test]
    fn test_out_of_range_is_air() {
        let g = grid(&[&[1, 1], &[1, 1]]);
        assert_eq!(g.tile_at(-1, 0), 0);
        assert_eq!(g.tile_at(0, -1), 0);
        assert_eq!(g.tile_at(2, 0), 0);
        assert_eq!(g.tile_at(0, 2), 0);
        assert!(!g.is_solid_at(5, 5));
    }

    #[test]
    fn test_set_tile_out_of_range_is_noop() {
        let mut g = grid(&[&[1]]);
        let before = g.clone();
        g.set_tile(3, 0, Tile::Brick);
        g.set_tile(-1, -1, Tile::Brick);
        assert_eq!(g, before);
    }

    #[test]
    fn test_ragged_rows_padded_with_air() {
        let g = grid(&[&[1, 2, 3], &[1]]);
        assert_eq!(g.width(), 3);
        assert_eq!(g.row(1), Some(&[1, 0, 0][..]));
        assert_eq!(g.row(2), None);
    }

    #[test]
    fn test_unknown_code_kept_but_not_solid() {
        let g = grid(&[&[42]]);
        assert_eq!(g.tile_at(0, 0), 42);
        assert_eq!(g.tile(0, 0), None);
        assert!(!g.is_solid_at(0, 0));
    }

    #[test]
    fn test_brick_breaks_only_when_allowed() {
        let mut g = grid(&[&[2]]);
        assert_eq!(g.hit_from_below(0, 0, false), BlockHit::Bumped);
        assert_eq!(g.tile(0, 0), Some(Tile::Brick));
        assert_eq!(g.hit_from_below(0, 0, true), BlockHit::Broken);
        assert_eq!(g.tile(0, 0), Some(Tile::Air));
    }

    #[test]
    fn test_question_block_releases_once() {
        let rows = vec![vec![3, 3]];
        let mut g = TileGrid::from_rows(&rows, [(1, 0)]);
        assert_eq!(g.hit_from_below(0, 0, false), BlockHit::CoinReleased);
        assert_eq!(g.hit_from_below(1, 0, false), BlockHit::PowerUpReleased);
        assert_eq!(g.tile(1, 0), Some(Tile::UsedBlock));
        // Struck blocks never re-trigger
        assert_eq!(g.hit_from_below(0, 0, true), BlockHit::Inert);
        assert_eq!(g.hit_from_below(1, 0, true), BlockHit::Inert);
        assert!(g.is_solid_at(1, 0));
    }

    #[test]
    fn test_positions_and_topmost() {
        let g = grid(&[&[0, 11], &[0, 5], &[1, 1]]);
        assert_eq!(g.positions_of(Tile::Flag).collect::<Vec<_>>(), vec![(1, 0)]);
        assert_eq!(g.topmost_in_column(0, Tile::is_standable), Some(2));
        assert_eq!(g.topmost_in_column(1, Tile::is_standable), Some(1));
        assert_eq!(g.topmost_in_column(7, Tile::is_standable), None);
    }
}
