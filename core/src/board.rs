use core::ops::Index;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Grid geometry plus the fixed set of mined cells for one game.
///
/// Deserialization goes through [`Board::from_mine_mask`], the stored `mine_count` is recomputed from the mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardData")]
pub struct Board {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

#[derive(Deserialize)]
struct BoardData {
    mine_mask: Array2<bool>,
}

impl TryFrom<BoardData> for Board {
    type Error = GameError;

    fn try_from(data: BoardData) -> Result<Self> {
        Self::from_mine_mask(data.mine_mask)
    }
}

impl Board {
    /// Places `config.mines` distinct mines by rejection sampling: draw a random row, then a random column, and
    /// discard the draw if that cell already holds a mine.
    pub fn generate<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self> {
        use rand::prelude::*;

        config.validate()?;

        let (rows, cols) = config.size;
        let mut mine_mask: Array2<bool> = Array2::default(grid_index(config.size));
        let mut placed: CellCount = 0;
        let mut draws: u64 = 0;

        while placed < config.mines {
            let coords: Coord2 = (rng.random_range(0..rows), rng.random_range(0..cols));
            draws += 1;

            let cell = &mut mine_mask[grid_index(coords)];
            if !*cell {
                *cell = true;
                placed += 1;
            }
        }

        log::debug!(
            "Generated {}x{} board with {} mines after {} draws",
            rows,
            cols,
            placed,
            draws
        );

        Ok(Self {
            mine_mask,
            mine_count: placed,
        })
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (rows, cols) = mine_mask.dim();
        let size: Coord2 = (
            rows.try_into().map_err(|_| GameError::InvalidCoords)?,
            cols.try_into().map_err(|_| GameError::InvalidCoords)?,
        );
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);

        GameConfig::new(size, mine_count)?;

        Ok(Self {
            mine_mask,
            mine_count,
        })
    }

    /// Builds a board with mines at exactly the given coordinates; duplicates collapse into one mine.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidConfiguration {
                rows: size.0,
                cols: size.1,
                mines: mine_coords.len().try_into().unwrap_or(CellCount::MAX),
            });
        }

        let mut mine_mask: Array2<bool> = Array2::default(grid_index(size));

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[grid_index(coords)] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.mine_mask.dim();
        // dimensions were validated to fit in `Coord` at construction
        (rows as Coord, cols as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        in_bounds(coords, self.size())
    }

    pub fn total_cells(&self) -> CellCount {
        cell_count(self.size())
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mine_count)
    }

    /// O(1) membership test, coordinates outside the board are never mines.
    pub fn is_mine(&self, coords: Coord2) -> bool {
        self.contains(coords) && self[coords]
    }

    /// Row-major iterator over every mined cell.
    pub fn mine_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        neighbors(coords, self.size())
    }
}

impl Index<Coord2> for Board {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[grid_index(coords)]
    }
}
