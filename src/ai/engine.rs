//! External-engine adapters.
//!
//! The `EngineAdapter` trait is the contract the session consumes: it is told
//! the position and every committed move, and asked for a best move in
//! square-pair form. Two implementations are provided:
//!   - `RandomEngine` plays a uniformly random legal move.
//!   - `ScriptedEngine` replays a fixed queue of moves (test double).

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::engine::game::Game;
use crate::engine::transport::SquarePair;
use crate::engine::types::{ChessError, MoveKind, PieceKind};

// =========================================================================
// EngineAdapter trait
// =========================================================================

/// The external move-suggestion engine interface.
///
/// `request_best_move` does not advance the adapter's own position; the
/// session reports every committed move, the adapter's suggestions included,
/// through `notify_move`.
pub trait EngineAdapter: Send {
    /// Replace the adapter's position.
    fn set_position(&mut self, fen: &str) -> Result<(), ChessError>;

    /// Suggest a move for the side to move in the adapter's position.
    fn request_best_move(&mut self) -> Result<SquarePair, ChessError>;

    /// Advance the adapter's position by a committed move.
    fn notify_move(&mut self, pair: SquarePair) -> Result<(), ChessError>;

    /// Human-readable name for this engine.
    fn name(&self) -> &str;
}

fn no_move(reason: &str) -> ChessError {
    ChessError::EngineUnavailable(reason.into())
}

// =========================================================================
// RandomEngine
// =========================================================================

/// Picks a random legal move from its own mirror of the game.
pub struct RandomEngine {
    game: Game,
    rng: StdRng,
}

impl RandomEngine {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        RandomEngine {
            game: Game::new(),
            rng,
        }
    }

    /// FEN of the adapter's mirror position.
    pub fn position(&self) -> String {
        self.game.export_position()
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineAdapter for RandomEngine {
    fn set_position(&mut self, fen: &str) -> Result<(), ChessError> {
        self.game.load_position(fen)
    }

    fn request_best_move(&mut self) -> Result<SquarePair, ChessError> {
        let moves: Vec<_> = self.game.legal_moves().moves().collect();
        let mv = *moves
            .choose(&mut self.rng)
            .ok_or_else(|| no_move("no legal moves"))?;
        let promotion = if mv.kind == MoveKind::PromotionPending {
            PieceKind::PROMOTION_CHOICES.choose(&mut self.rng).copied()
        } else {
            None
        };
        let pair = SquarePair::new(mv.from, mv.to, promotion);
        debug!(engine = self.name(), %pair, "best move");
        Ok(pair)
    }

    fn notify_move(&mut self, pair: SquarePair) -> Result<(), ChessError> {
        self.game.apply_move(&pair.to_string()).map(|_| ())
    }

    fn name(&self) -> &str {
        "RandomEngine"
    }
}

// =========================================================================
// ScriptedEngine
// =========================================================================

/// Replays a fixed list of moves and records what it was told.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    script: VecDeque<SquarePair>,
    /// Every position passed to `set_position`.
    pub positions: Vec<String>,
    /// Every move passed to `notify_move`.
    pub notified: Vec<SquarePair>,
}

impl ScriptedEngine {
    pub fn new(script: impl IntoIterator<Item = SquarePair>) -> Self {
        ScriptedEngine {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Build from square-pair text such as `["e7e5", "g8f6"]`.
    pub fn from_pairs(pairs: &[&str]) -> Result<Self, ChessError> {
        let script = pairs
            .iter()
            .map(|p| SquarePair::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(script))
    }

    /// Moves not yet played.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl EngineAdapter for ScriptedEngine {
    fn set_position(&mut self, fen: &str) -> Result<(), ChessError> {
        self.positions.push(fen.to_string());
        Ok(())
    }

    fn request_best_move(&mut self) -> Result<SquarePair, ChessError> {
        self.script
            .pop_front()
            .ok_or_else(|| no_move("script exhausted"))
    }

    fn notify_move(&mut self, pair: SquarePair) -> Result<(), ChessError> {
        self.notified.push(pair);
        Ok(())
    }

    fn name(&self) -> &str {
        "ScriptedEngine"
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::GameState;

    #[test]
    fn random_engine_returns_legal_move() {
        let mut engine = RandomEngine::seeded(7);
        let pair = engine.request_best_move().unwrap();
        let mut game = Game::new();
        assert!(game.apply_move(&pair.to_string()).is_ok());
    }

    #[test]
    fn random_engine_is_deterministic_when_seeded() {
        let mut a = RandomEngine::seeded(42);
        let mut b = RandomEngine::seeded(42);
        for _ in 0..5 {
            let pa = a.request_best_move().unwrap();
            let pb = b.request_best_move().unwrap();
            assert_eq!(pa, pb);
            a.notify_move(pa).unwrap();
            b.notify_move(pb).unwrap();
        }
        assert_eq!(a.position(), b.position());
    }

    #[test]
    fn random_engine_plays_a_whole_game_legally() {
        let mut engine = RandomEngine::seeded(1);
        let mut game = Game::new();
        for _ in 0..60 {
            if game.is_game_over() {
                break;
            }
            let pair = engine.request_best_move().unwrap();
            let played = game.apply_move(&pair.to_string()).unwrap();
            engine.notify_move(played).unwrap();
            assert_eq!(engine.position(), game.export_position());
        }
    }

    #[test]
    fn random_engine_promotes_with_a_kind() {
        let mut engine = RandomEngine::seeded(3);
        engine
            .set_position("7k/4P3/8/8/8/8/8/K7 w - - 0 1")
            .unwrap();
        for _ in 0..20 {
            let pair = engine.request_best_move().unwrap();
            if pair.from.to_algebraic() == "e7" {
                assert!(pair.promotion.is_some());
            }
        }
    }

    #[test]
    fn random_engine_reports_no_move_when_mated() {
        let mut engine = RandomEngine::seeded(0);
        engine
            .set_position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert_eq!(engine.game.state(), GameState::Checkmate);
        assert!(matches!(
            engine.request_best_move(),
            Err(ChessError::EngineUnavailable(_))
        ));
    }

    #[test]
    fn scripted_engine_replays_in_order() {
        let mut engine = ScriptedEngine::from_pairs(&["e7e5", "g8f6"]).unwrap();
        assert_eq!(engine.request_best_move().unwrap().to_string(), "e7e5");
        assert_eq!(engine.remaining(), 1);
        assert_eq!(engine.request_best_move().unwrap().to_string(), "g8f6");
        assert!(matches!(
            engine.request_best_move(),
            Err(ChessError::EngineUnavailable(_))
        ));
        assert_eq!(engine.name(), "ScriptedEngine");
    }

    #[test]
    fn scripted_engine_rejects_bad_script() {
        assert!(ScriptedEngine::from_pairs(&["e7e5", "nonsense"]).is_err());
    }
}
