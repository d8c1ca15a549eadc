use std::collections::VecDeque;

use crate::*;

/// Number of mines among the up to 8 neighbors of `coords`.
pub fn adjacent_mine_count(board: &Board, coords: Coord2) -> u8 {
    board
        .iter_neighbors(coords)
        .filter(|&pos| board[pos])
        .count()
        .try_into()
        .unwrap_or(u8::MAX)
}

/// Reveals `coords` and, when it has no adjacent mines, the whole connected zero region plus its numbered border.
///
/// Returns every cell that changed, in reveal order. Targets outside the board, already revealed, or refused by
/// `policy` are a no-op. Mined cells are never revealed here, the caller decides what a mine click means.
pub fn reveal(
    board: &Board,
    grid: &mut VisibilityGrid,
    coords: Coord2,
    policy: FlagPolicy,
) -> Vec<Coord2> {
    let mut changed = Vec::new();

    match grid.get(coords) {
        Some(cell) if policy.can_reveal(cell) => {}
        _ => return changed,
    }
    if board.is_mine(coords) {
        log::warn!("Refusing to cascade-reveal mined cell {:?}", coords);
        return changed;
    }

    let mut to_visit = VecDeque::from([coords]);

    while let Some(visit_coords) = to_visit.pop_front() {
        // every cell leaves the unrevealed state at most once, so this check bounds the walk
        let Some(cell) = grid.get(visit_coords) else {
            continue;
        };
        if !policy.can_reveal(cell) {
            continue;
        }

        let adjacent_mines = adjacent_mine_count(board, visit_coords);
        if !grid.mark_revealed(visit_coords, adjacent_mines) {
            continue;
        }
        changed.push(visit_coords);

        if adjacent_mines == 0 {
            to_visit.extend(board.iter_neighbors(visit_coords).filter(|&pos| {
                grid.get(pos)
                    .is_some_and(|neighbor| policy.can_reveal(neighbor))
            }));
        }
    }

    log::trace!(
        "Reveal at {:?} opened {} cells, {} safe cells revealed in total",
        coords,
        changed.len(),
        grid.revealed_safe_count()
    );

    changed
}
