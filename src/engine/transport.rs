//! Compact square-pair notation: `e2e4`, `e7e8q`.
//!
//! The boundary format exchanged with the relay and external engines.

use std::fmt;
use std::str::FromStr;

use crate::engine::types::{ChessError, Color, Move, PieceKind, Square};

/// Origin, destination and optional promotion kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SquarePair {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl SquarePair {
    pub fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Self {
        SquarePair {
            from,
            to,
            promotion,
        }
    }

    /// Parse `<from><to>[q|r|b|n]`. The promotion letter may be either case.
    pub fn parse(text: &str) -> Result<Self, ChessError> {
        let bad = || ChessError::UnsupportedNotation(format!("bad square pair '{text}'"));
        let text = text.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(bad());
        }
        let from = Square::from_algebraic(&text[0..2]).ok_or_else(bad)?;
        let to = Square::from_algebraic(&text[2..4]).ok_or_else(bad)?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => Some(PieceKind::promotion_from_char(c).ok_or_else(bad)?),
        };
        if from == to {
            return Err(bad());
        }
        Ok(SquarePair::new(from, to, promotion))
    }
}

impl From<Move> for SquarePair {
    fn from(mv: Move) -> Self {
        SquarePair::new(mv.from, mv.to, mv.promotion)
    }
}

impl FromStr for SquarePair {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SquarePair::parse(s)
    }
}

impl fmt::Display for SquarePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char(Color::Black))?;
        }
        Ok(())
    }
}
