use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Hidden,
    /// Safe cell, with the adjacent mine count cached at reveal time.
    Revealed(u8),
    Flagged,
    /// Mined cell forcibly shown after a loss.
    Mine,
}

impl Visibility {
    pub const fn display(self) -> CellDisplay {
        match self {
            Self::Hidden => CellDisplay::Hidden,
            Self::Revealed(0) => CellDisplay::Blank,
            Self::Revealed(count) => CellDisplay::Count(count),
            Self::Flagged => CellDisplay::Flag,
            Self::Mine => CellDisplay::Mine,
        }
    }
}

/// What the presentation shell should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellDisplay {
    Hidden,
    Blank,
    Count(u8),
    Flag,
    Mine,
}

/// Whether a flag shields its cell from left clicks and the cascade.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagPolicy {
    /// Flags are cosmetic: a left click or a passing cascade reveals the cell anyway.
    #[default]
    RevealThrough,
    Protect,
}

impl FlagPolicy {
    pub const fn can_reveal(self, cell: Visibility) -> bool {
        match (self, cell) {
            (_, Visibility::Hidden) => true,
            (Self::RevealThrough, Visibility::Flagged) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisibilityGrid {
    cells: Array2<Visibility>,
    revealed_safe_count: CellCount,
    flagged_count: CellCount,
}

impl VisibilityGrid {
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(grid_index(size)),
            revealed_safe_count: 0,
            flagged_count: 0,
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    /// `None` for coordinates outside the grid.
    pub fn get(&self, coords: Coord2) -> Option<Visibility> {
        in_bounds(coords, self.size()).then(|| self.cells[grid_index(coords)])
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Visibility)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }

    /// Marks a safe cell revealed, keeping the counters in step. Returns `false` if it was already revealed.
    pub(crate) fn mark_revealed(&mut self, coords: Coord2, adjacent_mines: u8) -> bool {
        let cell = &mut self.cells[grid_index(coords)];
        match *cell {
            Visibility::Hidden => {}
            Visibility::Flagged => self.flagged_count -= 1,
            Visibility::Revealed(_) | Visibility::Mine => return false,
        }
        *cell = Visibility::Revealed(adjacent_mines);
        self.revealed_safe_count += 1;
        true
    }

    /// Toggles Hidden and Flagged, anything else is left alone.
    pub(crate) fn toggle_flag(&mut self, coords: Coord2) -> Option<Visibility> {
        let cell = &mut self.cells[grid_index(coords)];
        match *cell {
            Visibility::Hidden => {
                *cell = Visibility::Flagged;
                self.flagged_count += 1;
            }
            Visibility::Flagged => {
                *cell = Visibility::Hidden;
                self.flagged_count -= 1;
            }
            Visibility::Revealed(_) | Visibility::Mine => return None,
        }
        Some(*cell)
    }

    pub(crate) fn mark_mine(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[grid_index(coords)];
        match *cell {
            Visibility::Mine => false,
            Visibility::Flagged => {
                self.flagged_count -= 1;
                *cell = Visibility::Mine;
                true
            }
            _ => {
                *cell = Visibility::Mine;
                true
            }
        }
    }
}
