//! Standard Algebraic Notation (SAN) generation and parsing.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.

use crate::engine::board::Board;
use crate::engine::legality::LegalMoves;
use crate::engine::types::{ChessError, GameState, Move, MoveKind, PieceKind, Square};

// =========================================================================
// SAN generation
// =========================================================================

/// Convert a move to SAN notation, before it is played on `board`.
///
/// `legal` must be the legal set of the position (used for disambiguation).
/// No `+` or `#` is appended; see [`with_suffix`].
pub fn move_to_san(board: &Board, mv: Move, legal: &LegalMoves) -> Result<String, ChessError> {
    if mv.is_castle() {
        return Ok(if mv.to.file() > mv.from.file() {
            "O-O".into()
        } else {
            "O-O-O".into()
        });
    }

    let piece = board
        .piece_at(mv.from)
        .ok_or_else(|| ChessError::inconsistent(format!("SAN: no piece on {}", mv.from)))?;
    let capture = mv.is_en_passant() || board.piece_at(mv.to).is_some();

    let mut san = String::with_capacity(8);
    if piece.kind() == PieceKind::Pawn {
        if capture {
            san.push(mv.from.file_char());
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(promo.letter());
        }
    } else {
        san.push(piece.kind().letter());
        san.push_str(&disambiguation(board, mv, piece.kind(), legal));
        if capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
    }
    Ok(san)
}

/// Append `+` for check or `#` for checkmate.
pub fn with_suffix(mut san: String, state: GameState) -> String {
    match state {
        GameState::Check => san.push('+'),
        GameState::Checkmate => san.push('#'),
        GameState::Normal | GameState::Stalemate => {}
    }
    san
}

/// Origin file, rank, or both, when another piece of the same kind and colour
/// could also legally reach the destination.
fn disambiguation(board: &Board, mv: Move, kind: PieceKind, legal: &LegalMoves) -> String {
    let Some(color) = board.piece_at(mv.from).map(|p| p.color) else {
        return String::new();
    };

    let rivals: Vec<Square> = legal
        .moves()
        .filter(|m| {
            m.to == mv.to
                && m.from != mv.from
                && board
                    .piece_at(m.from)
                    .is_some_and(|p| p.is(color, kind))
        })
        .map(|m| m.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let same_file = rivals.iter().any(|s| s.file() == mv.from.file());
    let same_rank = rivals.iter().any(|s| s.rank() == mv.from.rank());

    match (same_file, same_rank) {
        (false, _) => mv.from.file_char().to_string(),
        (true, false) => mv.from.rank_char().to_string(),
        (true, true) => mv.from.to_algebraic(),
    }
}

// =========================================================================
// SAN parsing
// =========================================================================

/// Parse a SAN string against the legal set of `board`.
///
/// Accepts `e4`, `Nf3`, `Bxe5`, `O-O`, `O-O-O`, `0-0`, `e8=Q`, `e8Q`; check
/// and annotation suffixes are ignored. A promotion without a kind returns
/// the pending move so the caller can hold it.
pub fn parse_san(board: &Board, legal: &LegalMoves, text: &str) -> Result<Move, ChessError> {
    let unsupported = |why: &str| ChessError::UnsupportedNotation(format!("'{text}': {why}"));
    let san = text.trim().trim_end_matches(['+', '#', '!', '?']);

    // Castling.
    let castle_file = match san {
        "O-O" | "0-0" => Some(6),
        "O-O-O" | "0-0-0" => Some(2),
        _ => None,
    };
    if let Some(file) = castle_file {
        let king = board.king_square(board.side_to_move())?;
        return legal
            .from_square(king)
            .iter()
            .find(|c| c.kind == MoveKind::Castle && c.to.file() == file)
            .map(|&c| Move::new(king, c))
            .ok_or_else(|| unsupported("castling is not legal here"));
    }

    let mut chars: Vec<char> = san.chars().collect();

    // Promotion suffix: "=Q" or a bare trailing kind letter.
    let mut promotion = None;
    if let Some(&last) = chars.last()
        && last.is_ascii_uppercase()
        && chars.len() > 2
    {
        promotion = Some(
            PieceKind::promotion_from_char(last).ok_or_else(|| unsupported("bad promotion kind"))?,
        );
        chars.pop();
        if chars.last() == Some(&'=') {
            chars.pop();
        }
    }

    // Piece letter (pawns have none).
    let kind = match chars.first() {
        Some('N') => PieceKind::Knight,
        Some('B') => PieceKind::Bishop,
        Some('R') => PieceKind::Rook,
        Some('Q') => PieceKind::Queen,
        Some('K') => PieceKind::King,
        Some(c) if ('a'..='h').contains(c) => PieceKind::Pawn,
        _ => return Err(unsupported("expected a piece letter or file")),
    };
    let body = if kind == PieceKind::Pawn {
        &chars[..]
    } else {
        &chars[1..]
    };
    if promotion.is_some() && kind != PieceKind::Pawn {
        return Err(unsupported("only pawns promote"));
    }

    // Destination is the last two characters; an optional 'x' precedes it.
    if body.len() < 2 {
        return Err(unsupported("missing destination square"));
    }
    let dest_text: String = body[body.len() - 2..].iter().collect();
    let dest = Square::from_algebraic(&dest_text).ok_or_else(|| unsupported("bad destination"))?;
    let mut hint = &body[..body.len() - 2];
    if hint.last() == Some(&'x') {
        hint = &hint[..hint.len() - 1];
    }
    if hint.len() > 2 {
        return Err(unsupported("too many disambiguation characters"));
    }
    let mut hint_file = None;
    let mut hint_rank = None;
    if kind == PieceKind::Pawn && hint.is_empty() {
        // A pawn without a file prefix is a straight push.
        hint_file = Some(dest.file());
    }
    for &c in hint {
        match c {
            'a'..='h' if hint_file.is_none() => hint_file = Some(c as u8 - b'a'),
            '1'..='8' if hint_rank.is_none() => hint_rank = Some(c as u8 - b'1'),
            _ => return Err(unsupported("bad disambiguation")),
        }
    }

    let us = board.side_to_move();
    let matches: Vec<Move> = legal
        .moves()
        .filter(|m| {
            m.to == dest
                && board.piece_at(m.from).is_some_and(|p| p.is(us, kind))
                && hint_file.is_none_or(|f| m.from.file() == f)
                && hint_rank.is_none_or(|r| m.from.rank() == r)
        })
        .collect();

    let mv = match matches.as_slice() {
        [] => return Err(unsupported("no legal move matches")),
        [only] => *only,
        _ => return Err(unsupported("ambiguous")),
    };

    match (mv.kind, promotion) {
        (MoveKind::PromotionPending, Some(p)) => Ok(Move::with_promotion(mv.from, mv.to, p)),
        (MoveKind::PromotionPending, None) => Ok(mv),
        (_, Some(_)) => Err(unsupported("promotion on a non-promoting move")),
        (_, None) => Ok(mv),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::legality;
    use crate::engine::types::Candidate;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn setup(fen: &str) -> (Board, LegalMoves) {
        let mut b = Board::from_fen(fen).unwrap();
        let legal = legality::legal_moves(&mut b).unwrap();
        (b, legal)
    }

    fn san(fen: &str, from: &str, to: &str) -> String {
        let (b, legal) = setup(fen);
        let cand = legal.find(sq(from), sq(to)).expect("move must be legal");
        move_to_san(&b, Move::new(sq(from), cand), &legal).unwrap()
    }

    fn parse(fen: &str, text: &str) -> Result<Move, ChessError> {
        let (b, legal) = setup(fen);
        parse_san(&b, &legal, text)
    }

    // -------------------------------------------------------------------
    // Generation
    // -------------------------------------------------------------------

    #[test]
    fn san_pawn_push_and_knight() {
        let start = crate::engine::board::STARTING_FEN;
        assert_eq!(san(start, "e2", "e4"), "e4");
        assert_eq!(san(start, "g1", "f3"), "Nf3");
    }

    #[test]
    fn san_pawn_capture() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(san(fen, "e4", "d5"), "exd5");
    }

    #[test]
    fn san_en_passant() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        assert_eq!(san(fen, "e5", "f6"), "exf6");
    }

    #[test]
    fn san_promotion_and_capture_promotion() {
        let (b, legal) = setup("3r3k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let push = Move::with_promotion(sq("e7"), sq("e8"), PieceKind::Queen);
        assert_eq!(move_to_san(&b, push, &legal).unwrap(), "e8=Q");
        let take = Move::with_promotion(sq("e7"), sq("d8"), PieceKind::Knight);
        assert_eq!(move_to_san(&b, take, &legal).unwrap(), "exd8=N");
    }

    #[test]
    fn san_castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san(fen, "e1", "g1"), "O-O");
        assert_eq!(san(fen, "e1", "c1"), "O-O-O");
    }

    #[test]
    fn san_file_disambiguation() {
        // Rooks on a1 and h1 both reach d1 along the first rank.
        let fen = "4k3/8/8/8/8/8/4K3/R6R w - - 0 1";
        assert_eq!(san(fen, "a1", "d1"), "Rad1");
        assert_eq!(san(fen, "h1", "d1"), "Rhd1");
    }

    #[test]
    fn san_rank_disambiguation() {
        let fen = "R7/8/8/8/8/8/7k/R3K3 w - - 0 1";
        assert_eq!(san(fen, "a1", "a4"), "R1a4");
        assert_eq!(san(fen, "a8", "a4"), "R8a4");
    }

    #[test]
    fn san_full_square_disambiguation() {
        // Queens on a1, a3 and c1 all reach b2; a1 needs file and rank.
        let fen = "4k3/8/8/8/8/Q7/8/Q1Q1K3 w - - 0 1";
        assert_eq!(san(fen, "a1", "b2"), "Qa1b2");
    }

    #[test]
    fn suffixes() {
        assert_eq!(with_suffix("Qh4".into(), GameState::Checkmate), "Qh4#");
        assert_eq!(with_suffix("Bb5".into(), GameState::Check), "Bb5+");
        assert_eq!(with_suffix("Kb1".into(), GameState::Stalemate), "Kb1");
    }

    // -------------------------------------------------------------------
    // Parsing
    // -------------------------------------------------------------------

    #[test]
    fn parse_basic_moves() {
        let start = crate::engine::board::STARTING_FEN;
        let mv = parse(start, "e4").unwrap();
        assert_eq!((mv.from, mv.to), (sq("e2"), sq("e4")));
        let mv = parse(start, "Nf3").unwrap();
        assert_eq!((mv.from, mv.to), (sq("g1"), sq("f3")));
    }

    #[test]
    fn parse_castling_both_spellings() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mv = parse(fen, "O-O").unwrap();
        assert_eq!((mv.to, mv.kind), (sq("g1"), MoveKind::Castle));
        let mv = parse(fen, "0-0-0").unwrap();
        assert_eq!((mv.to, mv.kind), (sq("c1"), MoveKind::Castle));
    }

    #[test]
    fn parse_promotion() {
        let fen = "7k/4P3/8/8/8/8/8/4K3 w - - 0 1";
        let mv = parse(fen, "e8=Q+").unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Queen));
        let mv = parse(fen, "e8N").unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Knight));
        let pending = parse(fen, "e8").unwrap();
        assert_eq!(pending, Move::new(sq("e7"), Candidate::new(sq("e8"), MoveKind::PromotionPending)));
    }

    #[test]
    fn parse_capture_with_check_suffix() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        let mv = parse(fen, "exd5+").unwrap();
        assert_eq!((mv.from, mv.to), (sq("e4"), sq("d5")));
    }

    #[test]
    fn parse_disambiguated() {
        let fen = "4k3/8/8/8/8/8/4K3/R6R w - - 0 1";
        assert_eq!(parse(fen, "Rhd1").unwrap().from, sq("h1"));
        assert!(matches!(
            parse(fen, "Rd1"),
            Err(ChessError::UnsupportedNotation(_))
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        let start = crate::engine::board::STARTING_FEN;
        for text in ["", "Z9", "e9", "Ke2", "Nf3=Q", "O-O", "e4=Q", "abcde4"] {
            assert!(
                matches!(parse(start, text), Err(ChessError::UnsupportedNotation(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn generated_san_parses_back_in_kiwipete() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let (b, legal) = setup(fen);
        for mv in legal.moves() {
            let text = move_to_san(&b, mv, &legal).unwrap();
            let back = parse_san(&b, &legal, &text).unwrap();
            assert_eq!(back, mv, "SAN {text} did not parse back");
        }
    }
}
