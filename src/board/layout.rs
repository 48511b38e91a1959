use shakmaty::{Board, Piece};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid board layout: {0}")]
    Invalid(String),
}

/// Rows from the eighth rank down to the first, files a to h, as in FEN.
pub type Grid = [[Option<Piece>; 8]; 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A run of empty squares.
    Empty(u32),
    /// A single occupied square. The symbol is not checked against the piece table.
    Piece(char),
}

/// Splits a board layout into its rank strings, top rank first.
pub fn ranks(layout: &str) -> impl Iterator<Item = &str> {
    layout.split('/')
}

/// Tokenizes one rank string left to right.
pub fn tokens(rank: &str) -> impl Iterator<Item = Token> + '_ {
    rank.chars().map(|c| match c.to_digit(10) {
        Some(n) => Token::Empty(n),
        None => Token::Piece(c),
    })
}

/// Returns the piece placement field of a FEN, which is the whole input when
/// only the board layout was given.
pub fn board_field(fen: &str) -> &str {
    fen.split_whitespace().next().unwrap_or("")
}

pub fn encode_layout(grid: &Grid) -> String {
    let mut layout = String::with_capacity(72);

    for (rank_idx, rank) in grid.iter().enumerate() {
        if rank_idx > 0 {
            layout.push('/');
        }

        let mut empty = 0u32;
        for square in rank {
            match square {
                Some(piece) => {
                    if empty > 0 {
                        layout.push_str(&empty.to_string());
                        empty = 0;
                    }
                    layout.push(piece.char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            layout.push_str(&empty.to_string());
        }
    }

    layout
}

/// Strict check of a board layout. Rendering never calls this; it is opt-in
/// for callers that prefer to reject malformed input up front.
pub fn validate(layout: &str) -> Result<(), LayoutError> {
    Board::from_ascii_board_fen(layout.as_bytes())
        .map(|_| ())
        .map_err(|e| LayoutError::Invalid(format!("{} ({})", layout, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Color, Role};

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn test_tokens_mixed_rank() {
        let toks: Vec<Token> = tokens("r3k2r").collect();
        assert_eq!(
            toks,
            vec![
                Token::Piece('r'),
                Token::Empty(3),
                Token::Piece('k'),
                Token::Empty(2),
                Token::Piece('r'),
            ]
        );
    }

    #[test]
    fn test_unknown_symbol_is_still_a_piece_token() {
        let toks: Vec<Token> = tokens("X7").collect();
        assert_eq!(toks, vec![Token::Piece('X'), Token::Empty(7)]);
    }

    #[test]
    fn test_ranks_in_input_order() {
        let r: Vec<&str> = ranks(START).collect();
        assert_eq!(r.len(), 8);
        assert_eq!(r[0], "rnbqkbnr");
        assert_eq!(r[7], "RNBQKBNR");
    }

    #[test]
    fn test_board_field() {
        assert_eq!(board_field(&format!("{} w KQkq - 0 1", START)), START);
        assert_eq!(board_field(START), START);
        assert_eq!(board_field(""), "");
    }

    #[test]
    fn test_encode_start_position() {
        let back = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];
        let mut grid: Grid = [[None; 8]; 8];
        for file in 0..8 {
            grid[0][file] = Some(Piece { color: Color::Black, role: back[file] });
            grid[1][file] = Some(Piece { color: Color::Black, role: Role::Pawn });
            grid[6][file] = Some(Piece { color: Color::White, role: Role::Pawn });
            grid[7][file] = Some(Piece { color: Color::White, role: back[file] });
        }
        assert_eq!(encode_layout(&grid), START);
    }

    #[test]
    fn test_encode_interior_runs() {
        let mut grid: Grid = [[None; 8]; 8];
        grid[3][2] = Some(Piece { color: Color::White, role: Role::Knight });
        grid[3][7] = Some(Piece { color: Color::Black, role: Role::Queen });
        assert_eq!(encode_layout(&grid), "8/8/8/2N4q/8/8/8/8");
    }

    #[test]
    fn test_validate() {
        assert!(validate(START).is_ok());
        assert!(validate("8/8/8/8/8/8/8/8").is_ok());
        assert!(validate("8/8/8/8/8/8/8/X7").is_err());
        assert!(validate("8/8/8/8/8/8/8/8/8").is_err());
    }
}
