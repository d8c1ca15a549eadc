use web_time::Instant;

use crate::*;

/// Result of recording a finished game on the leaderboard.
#[derive(Debug)]
pub struct Ranking {
    pub leaderboard: Leaderboard,
    /// 1-based position of the new entry, may be past the display limit.
    pub rank: usize,
    /// Set when the saved leaderboard could not be read or written. The in-memory ranking is still valid, and
    /// a file that failed to load is left as it was.
    pub persist_error: Option<LeaderboardError>,
}

#[derive(Debug, Default)]
pub struct SessionUpdate {
    pub update: Update,
    pub ranking: Option<Ranking>,
}

/// One player's game, wired to the leaderboard it reports to when it ends.
#[derive(Debug)]
pub struct GameSession {
    game: GameState,
    player_name: String,
    store: LeaderboardStore,
}

impl GameSession {
    pub fn new(game: GameState, player_name: Option<&str>, store: LeaderboardStore) -> Self {
        let player_name = crate::leaderboard::player_name(player_name);
        log::debug!("Session started for {}", player_name);
        Self {
            game,
            player_name,
            store,
        }
    }

    /// Generates a fresh board and starts the clock.
    pub fn start<G: BoardGenerator>(
        config: GameConfig,
        generator: G,
        flag_policy: FlagPolicy,
        player_name: Option<&str>,
        store: LeaderboardStore,
    ) -> Result<Self> {
        let board = generator.generate(config)?;
        let game = GameState::new(board).with_flag_policy(flag_policy);
        Ok(Self::new(game, player_name, store))
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn handle(&mut self, intent: Intent) -> SessionUpdate {
        self.handle_at(intent, Instant::now())
    }

    pub fn handle_at(&mut self, intent: Intent, now: Instant) -> SessionUpdate {
        let update = self.game.handle_at(intent, now);
        let ranking = update
            .game_over
            .map(|game_over| self.record(game_over.elapsed_millis()));
        SessionUpdate { update, ranking }
    }

    fn record(&self, elapsed_millis: u64) -> Ranking {
        let (mut leaderboard, load_error) = match self.store.load() {
            Ok(leaderboard) => (leaderboard, None),
            Err(err) => {
                log::error!(
                    "Could not load leaderboard from {}, not saving this result: {}",
                    self.store.path().display(),
                    err
                );
                (Leaderboard::new(self.store.order()), Some(err))
            }
        };

        let rank = leaderboard.record(self.player_name.clone(), elapsed_millis);

        let persist_error = match load_error {
            Some(err) => Some(err),
            None => self
                .store
                .persist(&leaderboard)
                .inspect_err(|err| {
                    log::error!(
                        "Could not save leaderboard to {}: {}",
                        self.store.path().display(),
                        err
                    );
                })
                .err(),
        };

        Ranking {
            leaderboard,
            rank,
            persist_error,
        }
    }
}
