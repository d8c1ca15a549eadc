/// Single coordinate axis used for row/column counts and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Number of cells on a `(rows, cols)` grid. A `Coord` squared always fits a `CellCount`.
pub const fn cell_count((rows, cols): Coord2) -> CellCount {
    rows as CellCount * cols as CellCount
}

/// Whether `coords` lies inside a grid of `size`.
pub const fn in_bounds(coords: Coord2, size: Coord2) -> bool {
    coords.0 < size.0 && coords.1 < size.1
}

/// `ndarray` index of a cell, for grids shaped by the same `size`.
pub(crate) const fn grid_index((row, col): Coord2) -> (usize, usize) {
    (row as usize, col as usize)
}

/// Converts signed coordinates (as a shell might produce them) into board coordinates.
///
/// Negative or oversized values yield `None`, callers treat that as an out-of-bounds target.
pub fn coords_from_signed(row: i64, col: i64) -> Option<Coord2> {
    Some((Coord::try_from(row).ok()?, Coord::try_from(col).ok()?))
}

/// The 3×3 block around `center` clipped to `size`, without `center` itself. Row-major.
pub fn neighbors(center: Coord2, size: Coord2) -> impl Iterator<Item = Coord2> {
    let (row, col) = center;
    (row.saturating_sub(1)..=row.saturating_add(1))
        .flat_map(move |r| (col.saturating_sub(1)..=col.saturating_add(1)).map(move |c| (r, c)))
        .filter(move |&pos| pos != center && in_bounds(pos, size))
}
