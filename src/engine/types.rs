use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank the king and rooks start on.
    #[inline]
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank delta of a single pawn advance.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank from which a pawn may advance two squares.
    #[inline]
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Farthest rank, where pawns promote.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Parse "white"/"black" (case-insensitive), also accepting "w"/"b".
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Some(Color::White),
            "black" | "b" => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceKind
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// All piece kinds in order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// The kinds a pawn may promote to, in the order they are offered.
    pub const PROMOTION_CHOICES: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Index for array lookups: Pawn=0 .. King=5.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Uppercase letter used in algebraic notation (`P` for pawns).
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        match color {
            Color::White => self.letter(),
            Color::Black => self.letter().to_ascii_lowercase(),
        }
    }

    /// Parse a FEN piece character; case gives the colour.
    pub fn from_char(c: char) -> Option<(Color, PieceKind)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some((color, kind))
    }

    /// Parse a promotion letter in either case (`q`, `R`, ...).
    pub fn promotion_from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "pawn"),
            PieceKind::Knight => write!(f, "knight"),
            PieceKind::Bishop => write!(f, "bishop"),
            PieceKind::Rook => write!(f, "rook"),
            PieceKind::Queen => write!(f, "queen"),
            PieceKind::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, LERF: a1=0, h8=63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(pub u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn new(index: u8) -> Self {
        debug_assert!(index < 64, "Square index out of range: {index}");
        Square(index)
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// The square `(df, dr)` away, or `None` if that leaves the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square::from_file_rank(file, rank))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }

    #[inline]
    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    #[inline]
    pub fn rank_char(self) -> char {
        (b'1' + self.rank()) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl Serialize for Square {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// Stable identity of a piece for the lifetime of the board.
///
/// A moved piece keeps its id; a promoted pawn is replaced by a piece with a
/// fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceId(pub u16);

/// Piece kind together with the state only that kind carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King { kingside: bool, queenside: bool },
}

impl Role {
    /// Fresh role for a kind; kings start without castling rights.
    pub fn of(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Pawn => Role::Pawn,
            PieceKind::Knight => Role::Knight,
            PieceKind::Bishop => Role::Bishop,
            PieceKind::Rook => Role::Rook,
            PieceKind::Queen => Role::Queen,
            PieceKind::King => Role::King {
                kingside: false,
                queenside: false,
            },
        }
    }

    pub fn kind(self) -> PieceKind {
        match self {
            Role::Pawn => PieceKind::Pawn,
            Role::Knight => PieceKind::Knight,
            Role::Bishop => PieceKind::Bishop,
            Role::Rook => PieceKind::Rook,
            Role::Queen => PieceKind::Queen,
            Role::King { .. } => PieceKind::King,
        }
    }
}

/// A piece on the board. Owned exclusively by the board grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: PieceId,
    pub color: Color,
    pub square: Square,
    pub role: Role,
}

impl Piece {
    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.role.kind()
    }

    #[inline]
    pub fn is(&self, color: Color, kind: PieceKind) -> bool {
        self.color == color && self.kind() == kind
    }

    /// Whether this pawn may currently advance two squares. Derived from its
    /// rank, so it can never go stale.
    pub fn can_double_step(&self) -> bool {
        self.role == Role::Pawn && self.square.rank() == self.color.pawn_start_rank()
    }

    /// Kingside castling right (always false for non-kings).
    pub fn can_castle_kingside(&self) -> bool {
        matches!(self.role, Role::King { kingside: true, .. })
    }

    /// Queenside castling right (always false for non-kings).
    pub fn can_castle_queenside(&self) -> bool {
        matches!(self.role, Role::King { queenside: true, .. })
    }

    /// FEN character for this piece.
    pub fn fen_char(&self) -> char {
        self.kind().to_char(self.color)
    }
}

// ---------------------------------------------------------------------------
// Move candidates and moves
// ---------------------------------------------------------------------------

/// What a candidate destination does when played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Quiet,
    Capture,
    EnPassant,
    Castle,
    /// A pawn reaching the farthest rank; the piece kind is chosen at commit.
    PromotionPending,
}

/// A destination produced by move generation for one piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub to: Square,
    pub kind: MoveKind,
}

impl Candidate {
    #[inline]
    pub fn new(to: Square, kind: MoveKind) -> Self {
        Candidate { to, kind }
    }
}

/// A fully specified move: origin, candidate and (for promotions) the chosen
/// kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, candidate: Candidate) -> Self {
        Move {
            from,
            to: candidate.to,
            kind: candidate.kind,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Move {
            from,
            to,
            kind: MoveKind::PromotionPending,
            promotion: Some(promotion),
        }
    }

    #[inline]
    pub fn is_castle(&self) -> bool {
        self.kind == MoveKind::Castle
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.kind == MoveKind::EnPassant
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char(Color::Black))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Classification of the position for the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Normal,
    Check,
    Checkmate,
    Stalemate,
}

impl GameState {
    pub fn as_str(&self) -> &str {
        match self {
            GameState::Normal => "normal",
            GameState::Check => "check",
            GameState::Checkmate => "checkmate",
            GameState::Stalemate => "stalemate",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameState::Checkmate | GameState::Stalemate)
    }

    /// Four-way decision from check status and legal move availability.
    pub fn classify(in_check: bool, has_legal_moves: bool) -> Self {
        match (in_check, has_legal_moves) {
            (true, false) => GameState::Checkmate,
            (true, true) => GameState::Check,
            (false, false) => GameState::Stalemate,
            (false, true) => GameState::Normal,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the rules engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("invalid position format: {0}")]
    InvalidPositionFormat(String),

    #[error("illegal move requested: {from} -> {to}: {reason}")]
    IllegalMoveRequested {
        from: String,
        to: String,
        reason: String,
    },

    #[error("unsupported notation: {0}")]
    UnsupportedNotation(String),

    #[error("inconsistent board state: {0}")]
    InconsistentBoardState(String),

    #[error("no moves to undo")]
    NothingToUndo,

    /// The engine adapter could not produce a move.
    #[error("engine has no move: {0}")]
    EngineUnavailable(String),

    /// A session request that the current game state does not allow.
    #[error("request refused: {0}")]
    RequestRefused(String),
}

impl ChessError {
    pub(crate) fn illegal(from: Square, to: Square, reason: impl Into<String>) -> Self {
        ChessError::IllegalMoveRequested {
            from: from.to_algebraic(),
            to: to.to_algebraic(),
            reason: reason.into(),
        }
    }

    /// Build an invariant violation and log it; these must never happen.
    pub(crate) fn inconsistent(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(%detail, "board invariant violated");
        ChessError::InconsistentBoardState(detail)
    }

    /// True for invariant violations (programming defects), false for
    /// recoverable input errors.
    pub fn is_defect(&self) -> bool {
        matches!(self, ChessError::InconsistentBoardState(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
