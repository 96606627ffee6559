//! FEN module.
//! Grammar-level validation of Forsyth-Edwards Notation and expansion of the
//! piece-placement field into a flat 64-character board string.
//! No move legality or position semantics: a board with nine kings is fine here.

use shakmaty::Piece;

/// Marker for an empty square in a board string.
pub const EMPTY_SQUARE: char = '_';

/// Why a FEN string was rejected. One variant per grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN string")]
    Empty,
    #[error("Expected 8 rows, found {0}")]
    RowCount(usize),
    #[error("Invalid character '{character}' in row {row}")]
    InvalidCharacter { character: char, row: usize },
    #[error("Row {row} has {count} squares instead of 8")]
    RowSquares { row: usize, count: u32 },
    #[error("Invalid turn field (must be 'w' or 'b')")]
    Turn,
    #[error("Invalid castling field")]
    Castling,
    #[error("Invalid en passant field")]
    EnPassant,
    #[error("Invalid halfmove counter")]
    Halfmove,
    #[error("Invalid fullmove number")]
    Fullmove,
}

/// Validates a FEN string field by field and stops at the first violation.
///
/// Only the placement field is mandatory; trailing fields are checked when
/// present. Anything after the sixth field is ignored.
pub fn validate_fen(fen: &str) -> Result<(), FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    let placement = parts.first().ok_or(FenError::Empty)?;

    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::RowCount(rows.len()));
    }
    for (i, row) in rows.iter().enumerate() {
        validate_row(row, i + 1)?;
    }

    if let Some(turn) = parts.get(1) {
        if !matches!(*turn, "w" | "b") {
            return Err(FenError::Turn);
        }
    }

    if let Some(castling) = parts.get(2) {
        let rights = castling.chars().all(|c| matches!(c, 'K' | 'Q' | 'k' | 'q'));
        if *castling != "-" && !rights {
            return Err(FenError::Castling);
        }
    }

    if let Some(ep) = parts.get(3) {
        if *ep != "-" && !is_en_passant_square(ep) {
            return Err(FenError::EnPassant);
        }
    }

    if let Some(halfmove) = parts.get(4) {
        if !is_counter(halfmove) {
            return Err(FenError::Halfmove);
        }
    }
    if let Some(fullmove) = parts.get(5) {
        if !is_counter(fullmove) {
            return Err(FenError::Fullmove);
        }
    }

    Ok(())
}

/// Running square count over one rank; `index` is 1-based for messages.
fn validate_row(row: &str, index: usize) -> Result<(), FenError> {
    let count = row.chars().try_fold(0u32, |count, c| {
        if let Some(skip) = c.to_digit(10) {
            Ok(count + skip)
        } else if Piece::from_char(c).is_some() {
            Ok(count + 1)
        } else {
            Err(FenError::InvalidCharacter { character: c, row: index })
        }
    })?;

    if count != 8 {
        return Err(FenError::RowSquares { row: index, count });
    }
    Ok(())
}

/// `[a-h][36]`
fn is_en_passant_square(field: &str) -> bool {
    matches!(field.as_bytes(), [b'a'..=b'h', b'3' | b'6'])
}

fn is_counter(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

/// Expands a placement field into the board string, rank 8 first.
///
/// Accepts a full FEN too; only the first field is read. Input is not
/// re-validated, so a malformed field yields a string of the wrong length.
pub fn board_string(placement: &str) -> String {
    let placement = placement.split_whitespace().next().unwrap_or("");
    let mut board = String::with_capacity(64);

    for row in placement.split('/') {
        for c in row.chars() {
            match c.to_digit(10) {
                Some(n) => board.extend(std::iter::repeat_n(EMPTY_SQUARE, n as usize)),
                None => board.push(c),
            }
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    fn with_fields(rest: &str) -> String {
        format!("{} {}", START, rest)
    }

    #[test]
    fn test_start_position_is_valid() {
        assert_eq!(validate_fen(&with_fields("w KQkq - 0 1")), Ok(()));
    }

    #[test]
    fn test_placement_only_is_valid() {
        assert_eq!(validate_fen(START), Ok(()));
        assert_eq!(validate_fen("8/8/8/8/8/8/8/8"), Ok(()));
        assert_eq!(validate_fen("r3k2r/1b4bq/8/8/8/8/7B/R3K2R"), Ok(()));
    }

    #[test]
    fn test_empty_fen() {
        assert_eq!(validate_fen(""), Err(FenError::Empty));
        assert_eq!(validate_fen("   \t "), Err(FenError::Empty));
    }

    #[test]
    fn test_wrong_row_count() {
        assert_eq!(validate_fen("8/8/8/8/8/8/8"), Err(FenError::RowCount(7)));
        assert_eq!(validate_fen("8/8/8/8/8/8/8/8/8"), Err(FenError::RowCount(9)));
    }

    #[test]
    fn test_short_row() {
        let err = validate_fen("8/8/8/8/8/8/8/7").unwrap_err();
        assert_eq!(err, FenError::RowSquares { row: 8, count: 7 });
        assert_eq!(err.to_string(), "Row 8 has 7 squares instead of 8");
    }

    #[test]
    fn test_long_row() {
        let err = validate_fen("ppppppppp/8/8/8/8/8/8/8").unwrap_err();
        assert_eq!(err, FenError::RowSquares { row: 1, count: 9 });
    }

    #[test]
    fn test_illegal_character() {
        let err = validate_fen("8/8/8/8/8/8/8/pppppppX").unwrap_err();
        assert_eq!(err, FenError::InvalidCharacter { character: 'X', row: 8 });
        assert_eq!(err.to_string(), "Invalid character 'X' in row 8");
    }

    #[test]
    fn test_illegal_character_reported_before_count() {
        // Scan stops at the bad character even though the row is also short.
        let err = validate_fen("8/8/x/8/8/8/8/8").unwrap_err();
        assert_eq!(err, FenError::InvalidCharacter { character: 'x', row: 3 });
    }

    #[test]
    fn test_turn_field() {
        assert_eq!(validate_fen(&with_fields("b")), Ok(()));
        assert_eq!(validate_fen(&with_fields("x KQkq - 0 1")), Err(FenError::Turn));
        assert_eq!(validate_fen(&with_fields("W")), Err(FenError::Turn));
    }

    #[test]
    fn test_castling_field() {
        assert_eq!(validate_fen(&with_fields("w -")), Ok(()));
        assert_eq!(validate_fen(&with_fields("w Kq")), Ok(()));
        assert_eq!(validate_fen(&with_fields("w KQkqX")), Err(FenError::Castling));
        assert_eq!(validate_fen(&with_fields("w --")), Err(FenError::Castling));
    }

    #[test]
    fn test_en_passant_field() {
        assert_eq!(validate_fen(&with_fields("w KQkq e3")), Ok(()));
        assert_eq!(validate_fen(&with_fields("b KQkq h6")), Ok(()));
        assert_eq!(validate_fen(&with_fields("w KQkq -")), Ok(()));
        assert_eq!(validate_fen(&with_fields("w KQkq e9")), Err(FenError::EnPassant));
        assert_eq!(validate_fen(&with_fields("w KQkq e4")), Err(FenError::EnPassant));
        assert_eq!(validate_fen(&with_fields("w KQkq i3")), Err(FenError::EnPassant));
        assert_eq!(validate_fen(&with_fields("w KQkq e3x")), Err(FenError::EnPassant));
    }

    #[test]
    fn test_counters() {
        assert_eq!(validate_fen(&with_fields("w KQkq - 12 40")), Ok(()));
        assert_eq!(validate_fen(&with_fields("w KQkq - -1 1")), Err(FenError::Halfmove));
        assert_eq!(validate_fen(&with_fields("w KQkq - 0 one")), Err(FenError::Fullmove));
    }

    #[test]
    fn test_extra_fields_ignored() {
        assert_eq!(validate_fen(&with_fields("w KQkq - 0 1 whatever ../x")), Ok(()));
    }

    #[test]
    fn test_first_failure_wins() {
        // Bad turn and bad castling: turn is checked first.
        assert_eq!(validate_fen(&with_fields("x KQkqX")), Err(FenError::Turn));
    }

    #[test]
    fn test_empty_board_string() {
        assert_eq!(board_string("8/8/8/8/8/8/8/8"), "_".repeat(64));
    }

    #[test]
    fn test_start_board_string() {
        let board = board_string(&with_fields("w KQkq - 0 1"));
        assert_eq!(board.len(), 64);
        assert_eq!(&board[..8], "rnbqkbnr");
        assert_eq!(&board[8..16], "pppppppp");
        assert_eq!(&board[16..48], "_".repeat(32));
        assert_eq!(&board[56..], "RNBQKBNR");
    }

    #[test]
    fn test_board_string_mixed_row() {
        let board = board_string("4k3/8/8/8/8/8/8/R3K2R");
        assert_eq!(&board[..8], "____k___");
        assert_eq!(&board[56..], "R___K__R");
    }

    #[test]
    fn test_board_string_does_not_revalidate() {
        assert_eq!(board_string("7/8"), "_".repeat(15));
    }
}
