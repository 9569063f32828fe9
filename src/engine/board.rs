//! Mailbox chess board.
//!
//! `Board` owns an 8×8 grid of optional pieces, a per-colour king-square
//! lookup, side to move, en-passant target and move counters. Castling rights
//! are carried by the king pieces themselves.
//!
//! Mutation goes through [`Board::apply`], which returns an [`UndoToken`]
//! holding exactly what the move changed; [`Board::unapply`] restores the board
//! to a state equal (`==`) to the one before `apply`.

use crate::engine::fen;
use crate::engine::types::{ChessError, Color, Move, MoveKind, Piece, PieceId, PieceKind, Role, Square};

/// Standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// UndoToken
// ---------------------------------------------------------------------------

/// Everything needed to invert one [`Board::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoToken {
    pub(crate) mv: Move,
    /// The moving piece as it was before the move.
    pub(crate) moved: Piece,
    /// Captured piece with its original square (differs from `mv.to` for en passant).
    pub(crate) captured: Option<Piece>,
    /// Castling rook before the move and the square it was moved to.
    pub(crate) rook: Option<(Piece, Square)>,
    /// Both kings as they were before the move (castling flags included).
    pub(crate) kings: [Option<Piece>; 2],
    pub(crate) king_squares: [Option<Square>; 2],
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) side_to_move: Color,
    pub(crate) next_id: u16,
}

impl UndoToken {
    /// The move this token reverses.
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// The piece removed by the move, if any.
    pub fn captured(&self) -> Option<&Piece> {
        self.captured.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A complete chess position in mailbox form.
///
/// Squares follow LERF mapping: a1 = 0, b1 = 1, … h8 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub(crate) grid: [Option<Piece>; Square::NUM],
    pub(crate) king_squares: [Option<Square>; 2],
    pub(crate) side_to_move: Color,
    /// Square passed over by the last two-square pawn advance, for one ply only.
    pub(crate) en_passant: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub(crate) halfmove_clock: u32,
    /// Starts at 1, incremented after every Black move.
    pub(crate) fullmove_number: u32,
    next_id: u16,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Board {
            grid: [None; Square::NUM],
            king_squares: [None; 2],
            side_to_move: Color::White,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            next_id: 0,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is always valid")
    }

    /// Parse a FEN string into a board.
    pub fn from_fen(text: &str) -> Result<Self, ChessError> {
        fen::parse(text)
    }

    /// Export the board as a FEN string.
    pub fn to_fen(&self) -> String {
        fen::export(self)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.grid[sq.index()].as_ref()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.grid[sq.index()].is_none()
    }

    /// All pieces, a1 → h8.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.grid.iter().flatten()
    }

    /// All pieces of one colour, a1 → h8.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(move |p| p.color == color)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Square of `color`'s king, from the direct lookup.
    pub fn king_square(&self, color: Color) -> Result<Square, ChessError> {
        let sq = self.king_squares[color.index()]
            .ok_or_else(|| ChessError::inconsistent(format!("{color} has no king")))?;
        match self.piece_at(sq) {
            Some(p) if p.is(color, PieceKind::King) => Ok(sq),
            _ => Err(ChessError::inconsistent(format!(
                "{color} king lookup points at {sq}, which holds no {color} king"
            ))),
        }
    }

    /// The king piece of `color`.
    pub fn king(&self, color: Color) -> Result<&Piece, ChessError> {
        let sq = self.king_square(color)?;
        self.piece_at(sq)
            .ok_or_else(|| ChessError::inconsistent(format!("no piece on king square {sq}")))
    }

    /// FEN castling field built from the kings' flags (`KQkq` order, `-` if none).
    pub fn castling_fen(&self) -> String {
        let mut s = String::with_capacity(4);
        for color in Color::BOTH {
            if let Some(king) = self.king_squares[color.index()].and_then(|sq| self.piece_at(sq)) {
                if king.can_castle_kingside() {
                    s.push(PieceKind::King.to_char(color));
                }
                if king.can_castle_queenside() {
                    s.push(PieceKind::Queen.to_char(color));
                }
            }
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    // -----------------------------------------------------------------------
    // Low-level piece manipulation (position setup)
    // -----------------------------------------------------------------------

    /// Create a new piece on `sq`, replacing anything already there.
    pub(crate) fn spawn(&mut self, color: Color, kind: PieceKind, sq: Square) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.grid[sq.index()] = Some(Piece {
            id,
            color,
            square: sq,
            role: Role::of(kind),
        });
        if kind == PieceKind::King {
            self.king_squares[color.index()] = Some(sq);
        }
        id
    }

    /// Overwrite `color`'s castling flags.
    pub(crate) fn set_castling(
        &mut self,
        color: Color,
        kingside: bool,
        queenside: bool,
    ) -> Result<(), ChessError> {
        let sq = self.king_square(color)?;
        if let Some(king) = self.grid[sq.index()].as_mut() {
            king.role = Role::King {
                kingside,
                queenside,
            };
        }
        Ok(())
    }

    /// Flip the side to move, advancing the full-move number after Black.
    pub fn pass_turn(&mut self) {
        if self.side_to_move == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = !self.side_to_move;
    }

    fn take(&mut self, sq: Square) -> Option<Piece> {
        self.grid[sq.index()].take()
    }

    fn put(&mut self, piece: Piece) {
        if piece.kind() == PieceKind::King {
            self.king_squares[piece.color.index()] = Some(piece.square);
        }
        self.grid[piece.square.index()] = Some(piece);
    }

    /// Clear whichever castling rights depend on `sq` holding its original piece.
    fn revoke_rights_touching(&mut self, sq: Square) {
        for color in Color::BOTH {
            if sq.rank() != color.home_rank() {
                continue;
            }
            let (kingside, queenside) = match sq.file() {
                0 => (false, true),
                4 => (true, true),
                7 => (true, false),
                _ => continue,
            };
            let Some(king_sq) = self.king_squares[color.index()] else {
                continue;
            };
            if let Some(king) = self.grid[king_sq.index()].as_mut()
                && let Role::King {
                    kingside: ks,
                    queenside: qs,
                } = king.role
            {
                king.role = Role::King {
                    kingside: ks && !kingside,
                    queenside: qs && !queenside,
                };
            }
        }
    }

    // -----------------------------------------------------------------------
    // Apply / Unapply
    // -----------------------------------------------------------------------

    /// Apply a move's board effects: capture, en passant, castling rook,
    /// promotion, castling-right revocation, en-passant target and half-move
    /// clock. Side to move and full-move number are left untouched.
    ///
    /// The caller is responsible for legality. A `PromotionPending` move
    /// without a chosen kind moves the pawn onto the last rank unchanged.
    pub fn apply(&mut self, mv: Move) -> Result<UndoToken, ChessError> {
        let moving = *self
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::inconsistent(format!("no piece on {} to move", mv.from)))?;
        let us = moving.color;

        let mut token = UndoToken {
            mv,
            moved: moving,
            captured: None,
            rook: None,
            kings: [
                self.king_squares[0].and_then(|sq| self.grid[sq.index()]),
                self.king_squares[1].and_then(|sq| self.grid[sq.index()]),
            ],
            king_squares: self.king_squares,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            side_to_move: self.side_to_move,
            next_id: self.next_id,
        };

        // ---- Capture ----
        let capture_sq = if mv.kind == MoveKind::EnPassant {
            Square::from_file_rank(mv.to.file(), mv.from.rank())
        } else {
            mv.to
        };
        if let Some(victim) = self.piece_at(capture_sq) {
            if victim.color == us {
                return Err(ChessError::inconsistent(format!(
                    "{} would capture its own piece on {capture_sq}",
                    mv.from
                )));
            }
            if victim.kind() == PieceKind::King {
                return Err(ChessError::inconsistent(format!(
                    "move {mv} would capture the {} king",
                    victim.color
                )));
            }
            token.captured = self.take(capture_sq);
        } else if mv.kind == MoveKind::EnPassant {
            return Err(ChessError::inconsistent(format!(
                "en passant to {} finds no pawn on {capture_sq}",
                mv.to
            )));
        }

        // ---- Move the piece (or replace it on promotion) ----
        self.take(mv.from);
        let landed = match mv.promotion {
            Some(kind) => {
                let id = PieceId(self.next_id);
                self.next_id += 1;
                Piece {
                    id,
                    color: us,
                    square: mv.to,
                    role: Role::of(kind),
                }
            }
            None => {
                let role = match moving.role {
                    Role::King { .. } => Role::King {
                        kingside: false,
                        queenside: false,
                    },
                    role => role,
                };
                Piece {
                    square: mv.to,
                    role,
                    ..moving
                }
            }
        };
        self.put(landed);

        // ---- Castling: move the rook ----
        if mv.kind == MoveKind::Castle {
            let (rook_from, rook_to) = castling_rook_squares(mv.from, mv.to)?;
            let rook = self
                .take(rook_from)
                .filter(|r| r.is(us, PieceKind::Rook))
                .ok_or_else(|| {
                    ChessError::inconsistent(format!("castling rook missing on {rook_from}"))
                })?;
            self.put(Piece {
                square: rook_to,
                ..rook
            });
            token.rook = Some((rook, rook_to));
        }

        // ---- Castling rights ----
        self.revoke_rights_touching(mv.from);
        self.revoke_rights_touching(capture_sq);

        // ---- En passant target: only right after a two-square advance ----
        self.en_passant = None;
        if moving.kind() == PieceKind::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            self.en_passant = mv.from.offset(0, us.pawn_direction());
        }

        // ---- Halfmove clock ----
        if moving.kind() == PieceKind::Pawn || token.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        Ok(token)
    }

    /// Reverse a move previously applied with [`Board::apply`]. Also restores
    /// side to move and full-move number, so it undoes a [`Board::pass_turn`]
    /// made after the apply.
    pub fn unapply(&mut self, token: UndoToken) {
        let mv = token.mv;

        self.grid[mv.to.index()] = None;
        if let Some((rook, rook_to)) = token.rook {
            self.grid[rook_to.index()] = None;
            self.grid[rook.square.index()] = Some(rook);
        }
        self.grid[mv.from.index()] = Some(token.moved);
        if let Some(captured) = token.captured {
            self.grid[captured.square.index()] = Some(captured);
        }
        for king in token.kings.into_iter().flatten() {
            self.grid[king.square.index()] = Some(king);
        }

        self.king_squares = token.king_squares;
        self.en_passant = token.en_passant;
        self.halfmove_clock = token.halfmove_clock;
        self.fullmove_number = token.fullmove_number;
        self.side_to_move = token.side_to_move;
        self.next_id = token.next_id;
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.piece_at(sq) {
                    Some(p) => p.fen_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

/// For a castling king move, return (rook_from, rook_to).
pub(crate) fn castling_rook_squares(
    king_from: Square,
    king_to: Square,
) -> Result<(Square, Square), ChessError> {
    let rank = king_from.rank();
    match king_to.file() {
        6 => Ok((Square::from_file_rank(7, rank), Square::from_file_rank(5, rank))),
        2 => Ok((Square::from_file_rank(0, rank), Square::from_file_rank(3, rank))),
        _ => Err(ChessError::inconsistent(format!(
            "invalid castling king destination: {king_to}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
