//! Stateful game controller wrapping [`Board`].
//!
//! `Game` owns the board, the filtered legal-move set, the classification of
//! the current position, move and position history and the undo stack. Every
//! input path (square selection, square-pair transport text, SAN) ends in
//! [`Game::commit_move`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::engine::board::{Board, STARTING_FEN, UndoToken};
use crate::engine::legality::{self, LegalMoves};
use crate::engine::san;
use crate::engine::transport::SquarePair;
use crate::engine::types::{
    Candidate, ChessError, Color, GameState, Move, MoveKind, PieceKind, Square,
};

// =========================================================================
// MoveRecord
// =========================================================================

/// A committed ply in the game history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// The move that was played (promotion kind included).
    pub mv: Move,
    /// SAN with its `+`/`#` suffix.
    pub san: String,
    /// Transport form of the move.
    pub pair: SquarePair,
    /// FEN of the position after the move.
    pub fen_after: String,
    /// Classification of the position after the move.
    pub state_after: GameState,
}

/// Result of [`Game::commit_move`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Commit {
    /// The move was played.
    Played(MoveRecord),
    /// A pawn reached the last rank without a kind; nothing was played yet.
    PromotionPending { from: Square, to: Square },
}

// =========================================================================
// Rendering query surface
// =========================================================================

/// One piece as seen by a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceView {
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
}

/// Legal destinations for the piece on one square.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalTargets {
    pub destinations: Vec<Square>,
    /// True when any destination is a promotion.
    pub promotion_pending: bool,
    /// The four promotion kinds when `promotion_pending`, otherwise empty.
    pub promotion_choices: Vec<PieceKind>,
}

// =========================================================================
// Game
// =========================================================================

/// A chess game: board, legal moves, classification and history.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    legal: LegalMoves,
    state: GameState,
    pending: Option<(Square, Square)>,

    history: Vec<MoveRecord>,
    undo_stack: Vec<UndoToken>,
    /// FEN after every ply, starting with the loaded position.
    positions: Vec<String>,

    starting_fen: String,
    start_side: Color,
    start_fullmove: u32,

    // Metadata
    pub id: String,
    pub white_player: String,
    pub black_player: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting position is always valid")
    }

    /// A new game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let mut game = Game {
            board: Board::empty(),
            legal: LegalMoves::default(),
            state: GameState::Normal,
            pending: None,
            history: Vec::new(),
            undo_stack: Vec::new(),
            positions: Vec::new(),
            starting_fen: String::new(),
            start_side: Color::White,
            start_fullmove: 1,
            id: Uuid::new_v4().to_string(),
            white_player: "Player".into(),
            black_player: "Player".into(),
            created_at: Utc::now(),
        };
        game.load_position(fen)?;
        Ok(game)
    }

    /// Replace the position with `fen`, clearing all history.
    ///
    /// Besides the FEN grammar, the side that just moved must not be in
    /// check. On error the game is left unchanged.
    pub fn load_position(&mut self, fen: &str) -> Result<(), ChessError> {
        let mut board = Board::from_fen(fen)?;
        let mover = board.side_to_move();
        if legality::is_in_check(&board, !mover)? {
            return Err(ChessError::InvalidPositionFormat(format!(
                "{} is in check but it is {mover} to move",
                !mover
            )));
        }
        let legal = legality::legal_moves(&mut board)?;
        let in_check = legality::is_in_check(&board, mover)?;

        self.state = GameState::classify(in_check, !legal.is_empty());
        self.legal = legal;
        self.pending = None;
        self.history.clear();
        self.undo_stack.clear();
        self.starting_fen = board.to_fen();
        self.positions = vec![self.starting_fen.clone()];
        self.start_side = mover;
        self.start_fullmove = board.fullmove_number();
        self.board = board;

        debug!(fen = %self.starting_fen, state = %self.state, "position loaded");
        Ok(())
    }

    /// Load the last of `positions` and keep the whole list as the position
    /// history, as received in a relay sync. Every entry must be a valid FEN.
    /// No move records or undo tokens exist for the earlier entries, so undo
    /// cannot step behind the loaded position.
    pub fn load_position_with_history(&mut self, positions: &[String]) -> Result<(), ChessError> {
        let (last, earlier) = positions.split_last().ok_or_else(|| {
            ChessError::InvalidPositionFormat("empty position list".into())
        })?;
        for fen in earlier {
            Board::from_fen(fen)?;
        }
        self.load_position(last)?;
        self.positions = earlier.to_vec();
        self.positions.push(self.starting_fen.clone());
        Ok(())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Classification of the current position.
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// The current legal set (only the pending pawn while a promotion waits).
    pub fn legal_moves(&self) -> &LegalMoves {
        &self.legal
    }

    /// The pawn move waiting for a promotion choice.
    pub fn pending_promotion(&self) -> Option<(Square, Square)> {
        self.pending
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// FEN after every ply, starting with the loaded position.
    pub fn position_history(&self) -> &[String] {
        &self.positions
    }

    /// FEN the game was loaded from.
    pub fn starting_fen(&self) -> &str {
        &self.starting_fen
    }

    /// Whether the game began somewhere other than the standard start.
    pub fn started_from_custom_position(&self) -> bool {
        self.starting_fen != STARTING_FEN
    }

    /// The last committed move in transport form.
    pub fn last_move(&self) -> Option<SquarePair> {
        self.history.last().map(|r| r.pair)
    }

    // -----------------------------------------------------------------
    // Legal move computation
    // -----------------------------------------------------------------

    /// Recompute the legal set and the classification from the board.
    pub fn compute_legal_moves(&mut self) -> Result<(), ChessError> {
        let mover = self.board.side_to_move();
        let mut legal = legality::legal_moves(&mut self.board)?;
        let in_check = legality::is_in_check(&self.board, mover)?;
        self.state = GameState::classify(in_check, !legal.is_empty());

        if let Some((from, to)) = self.pending {
            let cand = legal.find(from, to).ok_or_else(|| {
                ChessError::inconsistent(format!("pending promotion {from}{to} is no longer legal"))
            })?;
            legal = LegalMoves::default();
            legal.set(from, vec![cand]);
        }
        self.legal = legal;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------

    /// Play `from` → `to` if it is in the current legal set.
    ///
    /// A pawn reaching the last rank without `promotion` is held pending: the
    /// legal set shrinks to that pawn's move and the next commit must repeat
    /// it with a kind.
    pub fn commit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Commit, ChessError> {
        if self.state.is_game_over() {
            return Err(ChessError::illegal(
                from,
                to,
                format!("the game is over ({})", self.state),
            ));
        }
        if let Some(pending) = self.pending
            && pending != (from, to)
        {
            return Err(ChessError::illegal(
                from,
                to,
                format!(
                    "a promotion choice is pending for {}{}",
                    pending.0, pending.1
                ),
            ));
        }

        let cand = self
            .legal
            .find(from, to)
            .ok_or_else(|| ChessError::illegal(from, to, "not in the legal move set"))?;

        let mv = match (cand.kind, promotion) {
            (MoveKind::PromotionPending, None) => {
                self.pending = Some((from, to));
                self.compute_legal_moves()?;
                debug!(%from, %to, "promotion pending");
                return Ok(Commit::PromotionPending { from, to });
            }
            (MoveKind::PromotionPending, Some(kind)) => {
                if !PieceKind::PROMOTION_CHOICES.contains(&kind) {
                    return Err(ChessError::illegal(
                        from,
                        to,
                        format!("cannot promote to {kind}"),
                    ));
                }
                Move::with_promotion(from, to, kind)
            }
            (_, Some(kind)) => {
                return Err(ChessError::illegal(
                    from,
                    to,
                    format!("{kind} promotion given for a non-promoting move"),
                ));
            }
            (_, None) => Move::new(from, cand),
        };

        let record = self.play(mv)?;
        Ok(Commit::Played(record))
    }

    /// Apply a validated move on a scratch board and swap it in once every
    /// fallible step has succeeded.
    fn play(&mut self, mv: Move) -> Result<MoveRecord, ChessError> {
        let san = san::move_to_san(&self.board, mv, &self.legal)?;

        let mut next = self.board.clone();
        let token = next.apply(mv)?;
        next.pass_turn();
        let mover = next.side_to_move();
        let legal = legality::legal_moves(&mut next)?;
        let in_check = legality::is_in_check(&next, mover)?;
        let state = GameState::classify(in_check, !legal.is_empty());

        let record = MoveRecord {
            mv,
            san: san::with_suffix(san, state),
            pair: SquarePair::from(mv),
            fen_after: next.to_fen(),
            state_after: state,
        };

        self.board = next;
        self.legal = legal;
        self.state = state;
        self.pending = None;
        self.undo_stack.push(token);
        self.positions.push(record.fen_after.clone());
        self.history.push(record.clone());

        debug!(pair = %record.pair, san = %record.san, fen = %record.fen_after, "move committed");
        Ok(record)
    }

    /// Apply a move given in square-pair form and return the committed move
    /// in the same form.
    ///
    /// A promoting move must carry its kind; this entry point never leaves a
    /// promotion pending.
    pub fn apply_move(&mut self, text: &str) -> Result<SquarePair, ChessError> {
        let pair = SquarePair::parse(text)?;
        if pair.promotion.is_none()
            && self
                .legal
                .find(pair.from, pair.to)
                .is_some_and(|c| c.kind == MoveKind::PromotionPending)
        {
            return Err(ChessError::illegal(
                pair.from,
                pair.to,
                "promotion requires a piece kind",
            ));
        }
        match self.commit_move(pair.from, pair.to, pair.promotion)? {
            Commit::Played(record) => Ok(record.pair),
            Commit::PromotionPending { from, to } => Err(ChessError::inconsistent(format!(
                "square pair {from}{to} left a promotion pending"
            ))),
        }
    }

    /// Apply a move given in algebraic notation.
    pub fn apply_san(&mut self, text: &str) -> Result<Commit, ChessError> {
        let mv = san::parse_san(&self.board, &self.legal, text)?;
        self.commit_move(mv.from, mv.to, mv.promotion)
    }

    // -----------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------

    /// Take back the last ply, or cancel a pending promotion. Returns the
    /// move that was taken back.
    pub fn undo_last_move(&mut self) -> Result<Move, ChessError> {
        if let Some((from, to)) = self.pending.take() {
            self.compute_legal_moves()?;
            debug!(%from, %to, "pending promotion cancelled");
            return Ok(Move::new(
                from,
                Candidate::new(to, MoveKind::PromotionPending),
            ));
        }

        let token = self.undo_stack.pop().ok_or(ChessError::NothingToUndo)?;
        let record = self
            .history
            .pop()
            .ok_or_else(|| ChessError::inconsistent("undo stack and history out of step"))?;
        self.positions.pop();
        self.board.unapply(token);
        self.compute_legal_moves()?;

        debug!(pair = %record.pair, fen = %self.board.to_fen(), "move taken back");
        Ok(record.mv)
    }

    // -----------------------------------------------------------------
    // Notation export
    // -----------------------------------------------------------------

    /// Current position as FEN.
    pub fn export_position(&self) -> String {
        self.board.to_fen()
    }

    /// Numbered movetext, e.g. `1. f3 e5 2. g4 Qh4#`. A game that began with
    /// Black to move starts with `N... `.
    pub fn export_move_history(&self) -> String {
        self.movetext_tokens().join(" ")
    }

    /// Movetext split into tokens that must not be broken across lines.
    pub(crate) fn movetext_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.history.len());
        let mut number = self.start_fullmove;
        let mut side = self.start_side;
        for (i, record) in self.history.iter().enumerate() {
            let token = match side {
                Color::White => format!("{number}. {}", record.san),
                Color::Black if i == 0 => format!("{number}... {}", record.san),
                Color::Black => record.san.clone(),
            };
            if side == Color::Black {
                number = number.saturating_add(1);
            }
            tokens.push(token);
            side = !side;
        }
        tokens
    }

    // -----------------------------------------------------------------
    // Query surface
    // -----------------------------------------------------------------

    /// Every piece on the board, a1 → h8.
    pub fn pieces(&self) -> Vec<PieceView> {
        self.board
            .pieces()
            .map(|p| PieceView {
                kind: p.kind(),
                color: p.color,
                square: p.square,
            })
            .collect()
    }

    /// Legal destinations of the piece on `square` (empty for empty squares
    /// and for the side not to move).
    pub fn legal_targets(&self, square: Square) -> LegalTargets {
        let cands = self.legal.from_square(square);
        let promotion_pending = cands
            .iter()
            .any(|c| c.kind == MoveKind::PromotionPending);
        LegalTargets {
            destinations: cands.iter().map(|c| c.to).collect(),
            promotion_pending,
            promotion_choices: if promotion_pending {
                PieceKind::PROMOTION_CHOICES.to_vec()
            } else {
                Vec::new()
            },
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn play(g: &mut Game, pairs: &[&str]) {
        for p in pairs {
            g.apply_move(p).unwrap();
        }
    }

    #[test]
    fn new_game_is_normal() {
        let g = Game::new();
        assert_eq!(g.state(), GameState::Normal);
        assert_eq!(g.legal_moves().len(), 20);
        assert_eq!(g.export_position(), STARTING_FEN);
        assert_eq!(g.position_history(), &[STARTING_FEN.to_string()]);
        assert!(!g.started_from_custom_position());
        assert!(!g.id.is_empty());
    }

    #[test]
    fn game_from_invalid_fen() {
        assert!(matches!(
            Game::from_fen("invalid"),
            Err(ChessError::InvalidPositionFormat(_))
        ));
    }

    #[test]
    fn side_not_to_move_in_check_is_rejected() {
        // Black king attacked by the rook but it is White to move.
        let err = Game::from_fen("4k3/8/8/8/8/8/8/4RK2 w - - 0 1").unwrap_err();
        assert!(matches!(err, ChessError::InvalidPositionFormat(_)));
    }

    #[test]
    fn commit_records_history() {
        let mut g = Game::new();
        let commit = g.commit_move(sq("e2"), sq("e4"), None).unwrap();
        let Commit::Played(record) = commit else {
            panic!("expected a played move");
        };
        assert_eq!(record.san, "e4");
        assert_eq!(record.pair.to_string(), "e2e4");
        assert_eq!(g.side_to_move(), Color::Black);
        assert_eq!(
            g.export_position(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(g.position_history().len(), 2);
        assert_eq!(g.last_move().map(|p| p.to_string()), Some("e2e4".into()));
    }

    #[test]
    fn illegal_commit_leaves_game_unchanged() {
        let mut g = Game::new();
        let err = g.commit_move(sq("e2"), sq("e5"), None).unwrap_err();
        assert!(matches!(err, ChessError::IllegalMoveRequested { .. }));
        // Opponent's piece.
        assert!(g.commit_move(sq("e7"), sq("e5"), None).is_err());
        assert_eq!(g.export_position(), STARTING_FEN);
        assert!(g.history().is_empty());
    }

    #[test]
    fn apply_move_returns_emitted_pair() {
        let mut g = Game::new();
        assert_eq!(g.apply_move("g1f3").unwrap().to_string(), "g1f3");
        assert!(matches!(
            g.apply_move("zz"),
            Err(ChessError::UnsupportedNotation(_))
        ));
        assert!(matches!(
            g.apply_move("e2e4q"),
            Err(ChessError::IllegalMoveRequested { .. })
        ));
    }

    #[test]
    fn fools_mate() {
        let mut g = Game::new();
        play(&mut g, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(g.state(), GameState::Checkmate);
        assert!(g.is_game_over());
        assert_eq!(g.history().last().unwrap().san, "Qh4#");
        assert_eq!(g.export_move_history(), "1. f3 e5 2. g4 Qh4#");
        assert!(g.legal_moves().is_empty());
        assert!(g.commit_move(sq("e1"), sq("f2"), None).is_err());
    }

    #[test]
    fn stalemate_fixture() {
        let g = Game::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(g.state(), GameState::Stalemate);
        assert!(g.legal_moves().is_empty());
    }

    #[test]
    fn check_suffix() {
        let mut g = Game::new();
        play(&mut g, &["e2e4", "f7f6"]);
        let Commit::Played(rec) = g.apply_san("Qh5+").unwrap() else {
            panic!("expected a played move");
        };
        assert_eq!(rec.san, "Qh5+");
        assert_eq!(g.state(), GameState::Check);
    }

    #[test]
    fn promotion_pending_then_chosen() {
        let mut g = Game::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let targets = g.legal_targets(sq("e7"));
        assert!(targets.promotion_pending);
        assert_eq!(targets.promotion_choices, PieceKind::PROMOTION_CHOICES.to_vec());

        let c = g.commit_move(sq("e7"), sq("e8"), None).unwrap();
        assert_eq!(
            c,
            Commit::PromotionPending {
                from: sq("e7"),
                to: sq("e8")
            }
        );
        assert_eq!(g.pending_promotion(), Some((sq("e7"), sq("e8"))));
        // Only the pending pawn may move now.
        assert_eq!(g.legal_moves().len(), 1);
        assert!(g.commit_move(sq("e1"), sq("d1"), None).is_err());
        assert_eq!(g.legal_targets(sq("e7")).promotion_choices.len(), 4);

        let Commit::Played(rec) = g
            .commit_move(sq("e7"), sq("e8"), Some(PieceKind::Queen))
            .unwrap()
        else {
            panic!("expected a played move");
        };
        assert_eq!(rec.san, "e8=Q+");
        assert_eq!(rec.pair.to_string(), "e7e8q");
        assert_eq!(g.pending_promotion(), None);
        assert_eq!(
            g.board().piece_at(sq("e8")).map(|p| p.kind()),
            Some(PieceKind::Queen)
        );
    }

    #[test]
    fn promotion_to_king_is_refused() {
        let mut g = Game::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(
            g.commit_move(sq("e7"), sq("e8"), Some(PieceKind::King))
                .is_err()
        );
        assert!(g.apply_move("e7e8").is_err());
        assert_eq!(g.pending_promotion(), None);
    }

    #[test]
    fn undo_cancels_pending_promotion() {
        let mut g = Game::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        g.commit_move(sq("e7"), sq("e8"), None).unwrap();
        g.undo_last_move().unwrap();
        assert_eq!(g.pending_promotion(), None);
        assert!(g.legal_moves().len() > 1);
        assert!(g.history().is_empty());
    }

    #[test]
    fn undo_restores_position() {
        let mut g = Game::new();
        play(&mut g, &["e2e4", "e7e5", "g1f3"]);
        let before = g.position_history()[2].clone();
        let undone = g.undo_last_move().unwrap();
        assert_eq!(SquarePair::from(undone).to_string(), "g1f3");
        assert_eq!(g.export_position(), before);
        assert_eq!(g.history().len(), 2);
        assert_eq!(g.position_history().len(), 3);
        assert_eq!(g.side_to_move(), Color::White);
    }

    #[test]
    fn undo_out_of_checkmate() {
        let mut g = Game::new();
        play(&mut g, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        g.undo_last_move().unwrap();
        assert_eq!(g.state(), GameState::Normal);
        assert!(!g.legal_moves().is_empty());
    }

    #[test]
    fn undo_nothing_errors() {
        let mut g = Game::new();
        assert_eq!(g.undo_last_move(), Err(ChessError::NothingToUndo));
    }

    #[test]
    fn movetext_starting_with_black() {
        let mut g = Game::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").unwrap();
        play(&mut g, &["e8d7", "e2e4", "d7e6"]);
        assert_eq!(g.export_move_history(), "12... Kd7 13. e4 Ke6");
    }

    #[test]
    fn load_position_resets_history() {
        let mut g = Game::new();
        play(&mut g, &["e2e4"]);
        g.load_position("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(g.history().is_empty());
        assert_eq!(g.position_history().len(), 1);
        assert!(g.started_from_custom_position());
        // A bad FEN leaves the game as it was.
        assert!(g.load_position("garbage").is_err());
        assert_eq!(g.export_position(), "8/8/8/4k3/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn load_position_with_history_keeps_every_entry() {
        let positions = vec![
            STARTING_FEN.to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_string(),
        ];
        let mut g = Game::new();
        g.load_position_with_history(&positions).unwrap();
        assert_eq!(g.position_history(), positions.as_slice());
        assert!(g.history().is_empty());
        assert!(matches!(g.undo_last_move(), Err(ChessError::NothingToUndo)));
        assert_eq!(g.position_history().len(), 2);

        play(&mut g, &["e7e5"]);
        assert_eq!(g.position_history().len(), 3);
        g.undo_last_move().unwrap();
        assert_eq!(g.position_history(), positions.as_slice());

        // Empty lists and bad earlier entries leave the game as it was.
        assert!(g.load_position_with_history(&[]).is_err());
        let bad = vec!["garbage".to_string(), STARTING_FEN.to_string()];
        assert!(g.load_position_with_history(&bad).is_err());
        assert_eq!(g.position_history(), positions.as_slice());
    }

    #[test]
    fn query_surface() {
        let g = Game::new();
        assert_eq!(g.pieces().len(), 32);
        let t = g.legal_targets(sq("g1"));
        let mut dests = t.destinations.clone();
        dests.sort();
        assert_eq!(dests, vec![sq("f3"), sq("h3")]);
        assert!(!t.promotion_pending);
        assert!(t.promotion_choices.is_empty());
        assert!(g.legal_targets(sq("e4")).destinations.is_empty());
    }

    #[test]
    fn query_surface_serializes_camel_case() {
        let g = Game::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let json = serde_json::to_value(g.legal_targets(sq("e7"))).unwrap();
        assert_eq!(json["destinations"], serde_json::json!(["e8"]));
        assert_eq!(json["promotionPending"], serde_json::json!(true));
        assert_eq!(
            json["promotionChoices"],
            serde_json::json!(["queen", "rook", "bishop", "knight"])
        );
        let piece = serde_json::to_value(&g.pieces()[0]).unwrap();
        assert_eq!(piece["kind"], "king");
        assert_eq!(piece["color"], "white");
        assert_eq!(piece["square"], "e1");
    }
}
