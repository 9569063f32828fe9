//! Legality filtering.
//!
//! Each pseudo-legal candidate is simulated on the board with
//! [`Board::apply`], the mover's king is tested against the opponent's
//! attacks, and the move is reversed with [`Board::unapply`]. The board is
//! borrowed mutably for the whole pass, so simulations never interleave.
//!
//! Castling additionally requires the king's start and transit squares to be
//! unattacked before the move.

use std::collections::BTreeMap;

use tracing::trace;

use crate::engine::board::Board;
use crate::engine::movegen;
use crate::engine::types::{Candidate, ChessError, Color, Move, MoveKind, Square};

// =========================================================================
// LegalMoves
// =========================================================================

/// Filtered legal candidates for the side to move, keyed by origin square.
/// Squares whose piece has no legal move are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegalMoves {
    by_square: BTreeMap<Square, Vec<Candidate>>,
}

impl LegalMoves {
    /// Legal candidates for the piece on `from`.
    pub fn from_square(&self, from: Square) -> &[Candidate] {
        self.by_square.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The candidate reaching `to` from `from`, if legal.
    pub fn find(&self, from: Square, to: Square) -> Option<Candidate> {
        self.from_square(from).iter().copied().find(|c| c.to == to)
    }

    /// Total number of legal candidates across all pieces.
    pub fn len(&self) -> usize {
        self.by_square.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_square.is_empty()
    }

    /// Origin squares with at least one legal move, a1 → h8.
    pub fn origins(&self) -> impl Iterator<Item = Square> + '_ {
        self.by_square.keys().copied()
    }

    /// Every legal move as a [`Move`] without a promotion choice.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.by_square
            .iter()
            .flat_map(|(&from, cands)| cands.iter().map(move |&c| Move::new(from, c)))
    }

    /// Replace the candidates stored for `from`.
    pub(crate) fn set(&mut self, from: Square, cands: Vec<Candidate>) {
        if cands.is_empty() {
            self.by_square.remove(&from);
        } else {
            self.by_square.insert(from, cands);
        }
    }
}

// =========================================================================
// Public API
// =========================================================================

/// Whether `color`'s king is attacked on the current board.
pub fn is_in_check(board: &Board, color: Color) -> Result<bool, ChessError> {
    let king = board.king_square(color)?;
    Ok(movegen::is_square_attacked(board, king, !color))
}

/// Legal moves for every piece of the side to move.
pub fn legal_moves(board: &mut Board) -> Result<LegalMoves, ChessError> {
    let us = board.side_to_move();
    let origins: Vec<Square> = board.pieces_of(us).map(|p| p.square).collect();
    let mut legal = LegalMoves::default();
    for from in origins {
        let cands = legal_moves_from(board, from)?;
        legal.set(from, cands);
    }
    Ok(legal)
}

/// Legal candidates for the piece on `from` (which must belong to the side
/// to move; anything else yields an empty list).
pub fn legal_moves_from(board: &mut Board, from: Square) -> Result<Vec<Candidate>, ChessError> {
    match board.piece_at(from) {
        Some(p) if p.color == board.side_to_move() => {}
        _ => return Ok(Vec::new()),
    }
    let pseudo = movegen::pseudo_legal(board, from);
    let mut legal = Vec::with_capacity(pseudo.len());
    for cand in pseudo {
        if is_legal(board, Move::new(from, cand))? {
            legal.push(cand);
        } else {
            trace!(%from, to = %cand.to, kind = ?cand.kind, "candidate leaves king attacked");
        }
    }
    Ok(legal)
}

/// Simulate `mv`, test the mover's king, then restore the board.
///
/// Promotion candidates are simulated without choosing a kind: the pawn is
/// moved as is, which cannot change whether its own king is attacked.
pub fn is_legal(board: &mut Board, mv: Move) -> Result<bool, ChessError> {
    let us = board
        .piece_at(mv.from)
        .map(|p| p.color)
        .ok_or_else(|| ChessError::inconsistent(format!("no piece on {} to simulate", mv.from)))?;
    let them = !us;

    if mv.kind == MoveKind::Castle {
        let transit = Square::from_file_rank((mv.from.file() + mv.to.file()) / 2, mv.from.rank());
        if movegen::is_square_attacked(board, mv.from, them)
            || movegen::is_square_attacked(board, transit, them)
        {
            return Ok(false);
        }
    }

    let token = board.apply(mv)?;
    let verdict = board
        .king_square(us)
        .map(|king| !movegen::is_square_attacked(board, king, them));
    board.unapply(token);
    verdict
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::PieceKind;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    fn castles(b: &mut Board) -> Vec<String> {
        let king = b.king_square(b.side_to_move()).unwrap();
        let mut v: Vec<String> = legal_moves_from(b, king)
            .unwrap()
            .into_iter()
            .filter(|c| c.kind == MoveKind::Castle)
            .map(|c| c.to.to_algebraic())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn starting_position_has_20_legal_moves() {
        let mut b = Board::starting();
        let legal = legal_moves(&mut b).unwrap();
        assert_eq!(legal.len(), 20);
        assert_eq!(legal.origins().count(), 10);
        assert_eq!(legal.from_square(sq("g1")).len(), 2);
        assert!(legal.from_square(sq("e1")).is_empty());
    }

    #[test]
    fn filtering_leaves_board_untouched() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut b = board(fen);
        let before = b.clone();
        let legal = legal_moves(&mut b).unwrap();
        assert_eq!(legal.len(), 48);
        assert_eq!(b, before);
    }

    #[test]
    fn must_escape_check() {
        // White king on e1 in check from the rook on e8.
        let mut b = board("4r2k/8/8/8/8/8/3P1P2/4K3 w - - 0 1");
        assert!(is_in_check(&b, Color::White).unwrap());
        let legal = legal_moves(&mut b).unwrap();
        // Only the king can move, and only off the e-file.
        assert_eq!(legal.origins().collect::<Vec<_>>(), vec![sq("e1")]);
        assert!(legal.find(sq("e1"), sq("e2")).is_none());
        assert!(legal.find(sq("e1"), sq("d1")).is_some());
        assert_eq!(legal.len(), 2);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // Bishop on e2 pinned by the rook on e8.
        let mut b = board("4r2k/8/8/8/8/8/4B3/4K3 w - - 0 1");
        assert!(legal_moves_from(&mut b, sq("e2")).unwrap().is_empty());
    }

    #[test]
    fn castling_both_sides_when_safe() {
        let mut b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(castles(&mut b), vec!["c1", "g1"]);
    }

    #[test]
    fn castling_through_attacked_transit_is_illegal() {
        // Black rook on f8 covers f1.
        let mut b = board("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert_eq!(castles(&mut b), vec!["c1"]);
    }

    #[test]
    fn castling_into_attack_is_illegal() {
        // Black rook on g8 covers g1.
        let mut b = board("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert_eq!(castles(&mut b), vec!["c1"]);
    }

    #[test]
    fn castling_out_of_check_is_illegal() {
        let mut b = board("4r2k/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(castles(&mut b).is_empty());
    }

    #[test]
    fn queenside_b_file_may_be_attacked() {
        // Black rook on b8 covers b1, which the king never crosses.
        let mut b = board("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert_eq!(castles(&mut b), vec!["c1"]);
    }

    #[test]
    fn en_passant_exposing_king_is_illegal() {
        // Capturing d6 e.p. would open the fifth rank to the rook on a5.
        let mut b = board("4k3/8/8/r2pP2K/8/8/8/8 w - d6 0 1");
        let cands = legal_moves_from(&mut b, sq("e5")).unwrap();
        assert!(!cands.iter().any(|c| c.kind == MoveKind::EnPassant));
    }

    #[test]
    fn promotion_candidates_survive_filter() {
        let mut b = board("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let cands = legal_moves_from(&mut b, sq("e7")).unwrap();
        assert_eq!(cands, vec![Candidate::new(sq("e8"), MoveKind::PromotionPending)]);
        assert_eq!(PieceKind::PROMOTION_CHOICES.len(), 4);
    }

    #[test]
    fn opponent_piece_has_no_legal_moves() {
        let mut b = Board::starting();
        assert!(legal_moves_from(&mut b, sq("e7")).unwrap().is_empty());
    }

    #[test]
    fn checkmate_has_no_legal_moves() {
        // Fool's mate final position.
        let mut b = board("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(is_in_check(&b, Color::White).unwrap());
        assert!(legal_moves(&mut b).unwrap().is_empty());
    }
}
