use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Uniform placement with no first-click guarantees, every mine draw is independent of where the player starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator<R> {
    rng: R,
}

impl<R: Rng> RandomBoardGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomBoardGenerator<SmallRng> {
    pub fn from_seed(seed: u64) -> Self {
        log::debug!("Board seed: {}", seed);
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BoardGenerator for RandomBoardGenerator<R> {
    fn generate(mut self, config: GameConfig) -> Result<Board> {
        Board::generate(config, &mut self.rng)
    }
}
