use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A click forwarded by the presentation shell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    LeftClick(Coord2),
    RightClick(Coord2),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub coords: Coord2,
    pub display: CellDisplay,
}

/// Terminal event, emitted exactly once per game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOver {
    Won { elapsed_millis: u64 },
    Lost { elapsed_millis: u64 },
}

impl GameOver {
    pub const fn elapsed_millis(self) -> u64 {
        match self {
            Self::Won { elapsed_millis } | Self::Lost { elapsed_millis } => elapsed_millis,
        }
    }

    pub const fn status(self) -> GameStatus {
        match self {
            Self::Won { .. } => GameStatus::Won,
            Self::Lost { .. } => GameStatus::Lost,
        }
    }
}

/// Everything the shell needs to redraw after one intent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub changes: Vec<CellUpdate>,
    pub game_over: Option<GameOver>,
}

impl Update {
    /// Whether this update could have caused a change on screen
    pub fn has_update(&self) -> bool {
        !self.changes.is_empty() || self.game_over.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    cells: VisibilityGrid,
    status: GameStatus,
    flag_policy: FlagPolicy,
    started_at: Instant,
    ended_at: Option<Instant>,
    triggered_mine: Option<Coord2>,
}

impl GameState {
    pub fn new(board: Board) -> Self {
        Self::new_at(board, Instant::now())
    }

    pub fn new_at(board: Board, started_at: Instant) -> Self {
        let cells = VisibilityGrid::new(board.size());
        Self {
            board,
            cells,
            status: GameStatus::InProgress,
            flag_policy: FlagPolicy::default(),
            started_at,
            ended_at: None,
            triggered_mine: None,
        }
    }

    pub fn with_flag_policy(mut self, flag_policy: FlagPolicy) -> Self {
        self.flag_policy = flag_policy;
        self
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<Visibility> {
        self.cells.get(coords)
    }

    pub fn display_at(&self, coords: Coord2) -> Option<CellDisplay> {
        self.cell_at(coords).map(Visibility::display)
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.cells.revealed_safe_count()
    }

    /// Mines minus placed flags, can go negative when the player over-flags.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.board.mine_count()) - i32::from(self.cells.flagged_count())
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Time played so far, frozen once the game has ended.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.ended_at
            .unwrap_or(now)
            .saturating_duration_since(self.started_at)
    }

    pub fn elapsed_millis(&self, now: Instant) -> u64 {
        self.elapsed(now).as_millis().try_into().unwrap_or(u64::MAX)
    }

    /// Every cell of the board, row-major, for the shell's first paint.
    pub fn snapshot(&self) -> Vec<CellUpdate> {
        self.cells
            .iter()
            .map(|(coords, cell)| CellUpdate {
                coords,
                display: cell.display(),
            })
            .collect()
    }

    pub fn handle(&mut self, intent: Intent) -> Update {
        self.handle_at(intent, Instant::now())
    }

    pub fn handle_at(&mut self, intent: Intent, now: Instant) -> Update {
        log::debug!("Intent: {:?}", intent);
        match intent {
            Intent::LeftClick(coords) => self.left_click_at(coords, now),
            Intent::RightClick(coords) => self.right_click(coords),
        }
    }

    pub fn left_click(&mut self, coords: Coord2) -> Update {
        self.left_click_at(coords, Instant::now())
    }

    pub fn left_click_at(&mut self, coords: Coord2, now: Instant) -> Update {
        if self.status.is_finished() {
            return Update::default();
        }

        match self.cells.get(coords) {
            Some(cell) if self.flag_policy.can_reveal(cell) => {}
            _ => return Update::default(),
        }

        if self.board.is_mine(coords) {
            return self.explode(coords, now);
        }

        let changed = reveal(&self.board, &mut self.cells, coords, self.flag_policy);
        let mut update = Update {
            changes: self.cell_updates(changed),
            game_over: None,
        };

        if self.cells.revealed_safe_count() == self.board.safe_cell_count() {
            update.game_over = Some(self.end_game(true, now));
        }

        update
    }

    pub fn right_click(&mut self, coords: Coord2) -> Update {
        if self.status.is_finished() || !self.board.contains(coords) {
            return Update::default();
        }

        match self.cells.toggle_flag(coords) {
            Some(cell) => Update {
                changes: vec![CellUpdate {
                    coords,
                    display: cell.display(),
                }],
                game_over: None,
            },
            None => Update::default(),
        }
    }

    fn explode(&mut self, coords: Coord2, now: Instant) -> Update {
        self.triggered_mine = Some(coords);

        let mines: Vec<Coord2> = self.board.mine_coords().collect();
        let changed = mines
            .into_iter()
            .filter(|&mine| self.cells.mark_mine(mine))
            .collect();

        Update {
            changes: self.cell_updates(changed),
            game_over: Some(self.end_game(false, now)),
        }
    }

    fn end_game(&mut self, won: bool, now: Instant) -> GameOver {
        debug_assert!(!self.status.is_finished());

        self.status = if won {
            GameStatus::Won
        } else {
            GameStatus::Lost
        };
        self.ended_at = Some(now);

        let elapsed_millis = self.elapsed_millis(now);
        log::info!("Game {:?} after {}ms", self.status, elapsed_millis);

        if won {
            GameOver::Won { elapsed_millis }
        } else {
            GameOver::Lost { elapsed_millis }
        }
    }

    fn cell_updates(&self, changed: Vec<Coord2>) -> Vec<CellUpdate> {
        changed
            .into_iter()
            .filter_map(|coords| {
                self.display_at(coords)
                    .map(|display| CellUpdate { coords, display })
            })
            .collect()
    }
}
