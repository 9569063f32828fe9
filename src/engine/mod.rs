pub mod board;
pub mod fen;
pub mod game;
pub mod legality;
pub mod movegen;
pub mod pgn;
pub mod san;
pub mod transport;
pub mod types;

pub use board::{Board, STARTING_FEN, UndoToken};
pub use game::{Commit, Game, LegalTargets, MoveRecord, PieceView};
pub use legality::LegalMoves;
pub use transport::SquarePair;
pub use types::*;
