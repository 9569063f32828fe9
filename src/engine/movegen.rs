//! Pseudo-legal move generation.
//!
//! Movement is table-driven: every piece kind except the pawn maps to a
//! [`Movement`] template (direction vectors plus a continuous/discrete flag).
//! Pawns and castling are special-cased. Nothing here looks at king safety;
//! that is the job of [`crate::engine::legality`].

use crate::engine::board::Board;
use crate::engine::types::{Candidate, Color, Move, MoveKind, Piece, PieceKind, Role, Square};

// =========================================================================
// Movement templates
// =========================================================================

/// Direction vectors for one piece kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Movement {
    /// `(file delta, rank delta)` pairs.
    pub directions: &'static [(i8, i8)],
    /// Slide along each direction until blocked, instead of a single step.
    pub continuous: bool,
}

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Movement template for `kind`; `None` for pawns, whose moves depend on
/// colour and occupancy.
pub const fn movement(kind: PieceKind) -> Option<Movement> {
    match kind {
        PieceKind::Pawn => None,
        PieceKind::Knight => Some(Movement {
            directions: &KNIGHT_JUMPS,
            continuous: false,
        }),
        PieceKind::Bishop => Some(Movement {
            directions: &DIAGONAL,
            continuous: true,
        }),
        PieceKind::Rook => Some(Movement {
            directions: &ORTHOGONAL,
            continuous: true,
        }),
        PieceKind::Queen => Some(Movement {
            directions: &ALL_DIRECTIONS,
            continuous: true,
        }),
        PieceKind::King => Some(Movement {
            directions: &ALL_DIRECTIONS,
            continuous: false,
        }),
    }
}

// =========================================================================
// Public API
// =========================================================================

/// Pseudo-legal candidates for the piece on `from` (empty if the square is
/// empty). Castle candidates are included when the right is set, the king and
/// rook stand on their home squares and the corridor is empty.
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(28);
    if let Some(piece) = board.piece_at(from) {
        let piece = *piece;
        match movement(piece.kind()) {
            None => generate_pawn(board, &piece, &mut out),
            Some(template) => generate_template(board, &piece, template, &mut out),
        }
        if let Role::King { .. } = piece.role {
            generate_castles(board, &piece, &mut out);
        }
    }
    out
}

/// Pseudo-legal moves for every piece of `color`, a1 → h8.
pub fn pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for piece in board.pieces_of(color) {
        let from = piece.square;
        moves.extend(
            pseudo_legal(board, from)
                .into_iter()
                .map(|c| Move::new(from, c)),
        );
    }
    moves
}

/// Whether any piece of `by` attacks `target`.
///
/// Pawn diagonals count whether or not the target is occupied, and a slider
/// attacks the first blocker on each ray whatever its colour.
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    // Pawns: look one rank back from the attacker's point of view.
    for df in [-1, 1] {
        if let Some(sq) = target.offset(df, -by.pawn_direction())
            && board.piece_at(sq).is_some_and(|p| p.is(by, PieceKind::Pawn))
        {
            return true;
        }
    }

    // Every other kind: walk its own template backwards from the target.
    // All templates are symmetric, so the reverse ray is the same ray.
    for kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        let Some(template) = movement(kind) else {
            continue;
        };
        for &(df, dr) in template.directions {
            let mut cursor = target;
            while let Some(sq) = cursor.offset(df, dr) {
                if let Some(p) = board.piece_at(sq) {
                    if p.is(by, kind) {
                        return true;
                    }
                    break;
                }
                if !template.continuous {
                    break;
                }
                cursor = sq;
            }
        }
    }
    false
}

// =========================================================================
// Template pieces (knight, bishop, rook, queen, king steps)
// =========================================================================

fn generate_template(board: &Board, piece: &Piece, template: Movement, out: &mut Vec<Candidate>) {
    for &(df, dr) in template.directions {
        let mut cursor = piece.square;
        while let Some(to) = cursor.offset(df, dr) {
            match board.piece_at(to) {
                None => out.push(Candidate::new(to, MoveKind::Quiet)),
                Some(other) => {
                    if other.color != piece.color {
                        out.push(Candidate::new(to, MoveKind::Capture));
                    }
                    break;
                }
            }
            if !template.continuous {
                break;
            }
            cursor = to;
        }
    }
}

// =========================================================================
// Pawns
// =========================================================================

fn generate_pawn(board: &Board, pawn: &Piece, out: &mut Vec<Candidate>) {
    let us = pawn.color;
    let dir = us.pawn_direction();
    let arriving = |to: Square, otherwise: MoveKind| {
        if to.rank() == us.promotion_rank() {
            MoveKind::PromotionPending
        } else {
            otherwise
        }
    };

    // --- Forward one, then two from the start rank ---
    if let Some(one) = pawn.square.offset(0, dir)
        && board.is_empty(one)
    {
        out.push(Candidate::new(one, arriving(one, MoveKind::Quiet)));
        if pawn.can_double_step()
            && let Some(two) = one.offset(0, dir)
            && board.is_empty(two)
        {
            out.push(Candidate::new(two, MoveKind::Quiet));
        }
    }

    // --- Diagonal captures and en passant ---
    for df in [-1, 1] {
        let Some(to) = pawn.square.offset(df, dir) else {
            continue;
        };
        match board.piece_at(to) {
            Some(other) if other.color != us => {
                out.push(Candidate::new(to, arriving(to, MoveKind::Capture)));
            }
            Some(_) => {}
            None => {
                let victim = Square::from_file_rank(to.file(), pawn.square.rank());
                if board.en_passant() == Some(to)
                    && board
                        .piece_at(victim)
                        .is_some_and(|p| p.is(!us, PieceKind::Pawn))
                {
                    out.push(Candidate::new(to, MoveKind::EnPassant));
                }
            }
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

fn generate_castles(board: &Board, king: &Piece, out: &mut Vec<Candidate>) {
    let us = king.color;
    let rank = us.home_rank();
    if king.square != Square::from_file_rank(4, rank) {
        return;
    }

    // (right, rook file, corridor files, king destination file)
    let sides: [(bool, u8, &[u8], u8); 2] = [
        (king.can_castle_kingside(), 7, &[5, 6], 6),
        (king.can_castle_queenside(), 0, &[1, 2, 3], 2),
    ];
    for (right, rook_file, corridor, dest_file) in sides {
        if !right {
            continue;
        }
        let rook_present = board
            .piece_at(Square::from_file_rank(rook_file, rank))
            .is_some_and(|p| p.is(us, PieceKind::Rook));
        let clear = corridor
            .iter()
            .all(|&f| board.is_empty(Square::from_file_rank(f, rank)));
        if rook_present && clear {
            out.push(Candidate::new(
                Square::from_file_rank(dest_file, rank),
                MoveKind::Castle,
            ));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
