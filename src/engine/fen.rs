//! FEN (Forsyth–Edwards Notation) parsing and generation.
//!
//! Six space-separated fields: placement (rank 8 → 1), side to move,
//! castling rights, en-passant target, half-move clock, full-move number.

use crate::engine::board::Board;
use crate::engine::types::{ChessError, Color, PieceKind, Square};

fn invalid(msg: impl Into<String>) -> ChessError {
    ChessError::InvalidPositionFormat(msg.into())
}

/// Parse a FEN string into a [`Board`].
///
/// Validates all six fields and ensures exactly one king per side. Grammar is
/// strict so that [`export`] reproduces the input byte for byte: adjacent
/// empty-square digits are rejected, and castling letters must appear in
/// `KQkq` order.
pub fn parse(fen: &str) -> Result<Board, ChessError> {
    let fields: Vec<&str> = fen.split(' ').collect();
    if fields.len() != 6 {
        return Err(invalid(format!("expected 6 fields, got {}", fields.len())));
    }

    let mut board = Board::empty();

    // ----- Field 1: Piece placement -----
    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, got {}", ranks.len())));
    }

    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8; // FEN starts from rank 8
        let mut file: u8 = 0;
        let mut last_was_digit = false;
        for ch in rank_str.chars() {
            if file > 7 {
                return Err(invalid(format!("too many squares in rank {}", rank + 1)));
            }
            if let Some(digit) = ch.to_digit(10) {
                if !(1..=8).contains(&digit) || last_was_digit {
                    return Err(invalid(format!(
                        "invalid empty count '{ch}' in rank {}",
                        rank + 1
                    )));
                }
                file += digit as u8;
                last_was_digit = true;
            } else if let Some((color, kind)) = PieceKind::from_char(ch) {
                if kind == PieceKind::Pawn && (rank == 0 || rank == 7) {
                    return Err(invalid(format!("pawn on back rank {}", rank + 1)));
                }
                if kind == PieceKind::King && board.king_squares[color.index()].is_some() {
                    return Err(invalid(format!("{color} has more than one king")));
                }
                board.spawn(color, kind, Square::from_file_rank(file, rank));
                file += 1;
                last_was_digit = false;
            } else {
                return Err(invalid(format!(
                    "invalid character '{ch}' in piece placement"
                )));
            }
        }
        if file != 8 {
            return Err(invalid(format!(
                "rank {} has {} squares instead of 8",
                rank + 1,
                file
            )));
        }
    }

    for color in Color::BOTH {
        if board.king_squares[color.index()].is_none() {
            return Err(invalid(format!("{color} has no king")));
        }
    }

    // ----- Field 2: Side to move -----
    board.side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(invalid(format!("invalid side to move: '{other}'"))),
    };

    // ----- Field 3: Castling availability -----
    let mut rights = [[false; 2]; 2];
    if fields[2] != "-" {
        let mut last_order = None;
        for c in fields[2].chars() {
            let (order, color, side) = match c {
                'K' => (0, Color::White, 0),
                'Q' => (1, Color::White, 1),
                'k' => (2, Color::Black, 0),
                'q' => (3, Color::Black, 1),
                _ => return Err(invalid(format!("invalid castling string: '{}'", fields[2]))),
            };
            if last_order.is_some_and(|last| order <= last) {
                return Err(invalid(format!(
                    "castling string out of order: '{}'",
                    fields[2]
                )));
            }
            last_order = Some(order);
            rights[color.index()][side] = true;
        }
    }
    for color in Color::BOTH {
        let [kingside, queenside] = rights[color.index()];
        board.set_castling(color, kingside, queenside)?;
    }

    // ----- Field 4: En passant target square -----
    if fields[3] != "-" {
        let ep = Square::from_algebraic(fields[3])
            .ok_or_else(|| invalid(format!("invalid en passant square: '{}'", fields[3])))?;
        // The target sits behind a pawn of the side that just moved.
        let expected_rank = match board.side_to_move {
            Color::White => 5,
            Color::Black => 2,
        };
        if ep.rank() != expected_rank {
            return Err(invalid(format!(
                "en passant square {} does not match side to move",
                fields[3]
            )));
        }
        board.en_passant = Some(ep);
    }

    // ----- Field 5: Halfmove clock -----
    board.halfmove_clock = parse_counter(fields[4])
        .ok_or_else(|| invalid(format!("invalid halfmove clock: '{}'", fields[4])))?;

    // ----- Field 6: Fullmove number -----
    board.fullmove_number = parse_counter(fields[5])
        .filter(|&n| n >= 1)
        .ok_or_else(|| invalid(format!("invalid fullmove number: '{}'", fields[5])))?;

    Ok(board)
}

/// Decimal counter without sign or leading zeros.
fn parse_counter(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0'))
    {
        return None;
    }
    s.parse().ok()
}

/// Export a board as a FEN string.
pub fn export(board: &Board) -> String {
    let mut fen = String::with_capacity(80);

    // ----- Field 1: Piece placement -----
    for rank in (0..8).rev() {
        let mut empty_count = 0u8;
        for file in 0..8 {
            match board.piece_at(Square::from_file_rank(file, rank)) {
                Some(piece) => {
                    if empty_count > 0 {
                        fen.push((b'0' + empty_count) as char);
                        empty_count = 0;
                    }
                    fen.push(piece.fen_char());
                }
                None => empty_count += 1,
            }
        }
        if empty_count > 0 {
            fen.push((b'0' + empty_count) as char);
        }
        if rank > 0 {
            fen.push('/');
        }
    }

    // ----- Field 2: Side to move -----
    fen.push(' ');
    fen.push(match board.side_to_move() {
        Color::White => 'w',
        Color::Black => 'b',
    });

    // ----- Field 3: Castling -----
    fen.push(' ');
    fen.push_str(&board.castling_fen());

    // ----- Field 4: En passant -----
    fen.push(' ');
    match board.en_passant() {
        Some(sq) => fen.push_str(&sq.to_algebraic()),
        None => fen.push('-'),
    }

    // ----- Fields 5 & 6: Clocks -----
    fen.push_str(&format!(
        " {} {}",
        board.halfmove_clock(),
        board.fullmove_number()
    ));

    fen
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
