//! PGN (Portable Game Notation) export.
//!
//! Produces PGN with the Seven Tag Roster and move text with move numbers.

use crate::engine::game::Game;
use crate::engine::types::{Color, GameState};

/// Outcome token written in the `Result` tag and after the movetext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Ongoing => "*",
        }
    }

    /// Result implied by the board: the side to move loses on checkmate.
    pub fn from_game(game: &Game) -> Self {
        match game.state() {
            GameState::Checkmate => GameResult::win_for(!game.side_to_move()),
            GameState::Stalemate => GameResult::Draw,
            GameState::Normal | GameState::Check => GameResult::Ongoing,
        }
    }

    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }
}

// =========================================================================
// PGN generation
// =========================================================================

const LINE_WIDTH: usize = 80;

/// Export a game as PGN, with the result read from the final position.
pub fn to_pgn(game: &Game) -> String {
    to_pgn_with_result(game, GameResult::from_game(game))
}

/// Export a game as PGN with an explicit result (resignation, agreed draw).
pub fn to_pgn_with_result(game: &Game, result: GameResult) -> String {
    let mut pgn = String::with_capacity(512);
    let result_str = result.as_str();

    // Seven Tag Roster.
    let date = game.created_at.format("%Y.%m.%d").to_string();
    pgn.push_str("[Event \"Casual Game\"]\n");
    pgn.push_str("[Site \"chess-rules\"]\n");
    pgn.push_str(&format!("[Date \"{date}\"]\n"));
    pgn.push_str("[Round \"-\"]\n");
    pgn.push_str(&format!("[White \"{}\"]\n", game.white_player));
    pgn.push_str(&format!("[Black \"{}\"]\n", game.black_player));
    pgn.push_str(&format!("[Result \"{result_str}\"]\n"));

    if game.started_from_custom_position() {
        pgn.push_str("[SetUp \"1\"]\n");
        pgn.push_str(&format!("[FEN \"{}\"]\n", game.starting_fen()));
    }
    pgn.push('\n');

    // Movetext, wrapped so no line exceeds LINE_WIDTH.
    let mut line = String::new();
    for token in game
        .movetext_tokens()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(result_str))
    {
        if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
            pgn.push_str(&line);
            pgn.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(token);
    }
    pgn.push_str(&line);
    pgn.push('\n');

    pgn
}

// =========================================================================
// Tests
// =========================================================================
