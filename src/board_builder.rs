use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::color::{Color, NUM_COLORS};
use crate::piece::Piece;
use crate::square::Square;
use std::ops::{Index, IndexMut};

/// Represents a chess position that has *not* been validated for legality.
///
/// This structure is useful in the following cases:
/// * You are trying to build a chess board manually in code (say, for a
///   test position).
/// * The `Board` structure will only hold positions that pass its sanity
///   checks.  This structure will hold anything.
///
/// Promote it to a [`Board`] with `TryFrom`/`TryInto`; that is where the
/// sanity checks run.
///
/// ```
/// use referee::{Board, BoardBuilder, Color, Piece, Square};
/// use std::convert::TryFrom;
///
/// # use referee::Error;
/// # fn main() -> Result<(), Error> {
/// let e1: Square = "e1".parse()?;
/// let e8: Square = "e8".parse()?;
///
/// let mut position = BoardBuilder::new();
/// position.piece(e1, Piece::King, Color::White);
/// position.piece(e8, Piece::King, Color::Black);
///
/// // You can index the position by the square:
/// assert_eq!(position[e1], Some((Piece::King, Color::White)));
///
/// let board = Board::try_from(&position)?;
/// assert!(!board.in_check());
/// # Ok(())
/// # }
/// ```
#[derive(Copy, Clone, Debug)]
pub struct BoardBuilder {
    pieces: [Option<(Piece, Color)>; 64],
    side_to_move: Color,
    castle_rights: [CastleRights; NUM_COLORS],
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl BoardBuilder {
    /// Construct a new, empty, BoardBuilder.
    ///
    /// * No pieces are on the board
    /// * `CastleRights` are empty for both sides
    /// * `en_passant` is not set
    /// * `side_to_move` is Color::White
    /// * the halfmove clock is 0 and the fullmove number is 1
    pub fn new() -> BoardBuilder {
        BoardBuilder {
            pieces: [None; 64],
            side_to_move: Color::White,
            castle_rights: [CastleRights::NoRights, CastleRights::NoRights],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Set up a board with everything pre-loaded.
    pub fn setup<'a>(
        pieces: impl IntoIterator<Item = &'a (Square, Piece, Color)>,
        side_to_move: Color,
        white_castle_rights: CastleRights,
        black_castle_rights: CastleRights,
        en_passant: Option<Square>,
    ) -> BoardBuilder {
        let mut result = BoardBuilder {
            pieces: [None; 64],
            side_to_move,
            castle_rights: [white_castle_rights, black_castle_rights],
            en_passant,
            halfmove_clock: 0,
            fullmove_number: 1,
        };

        for &(square, piece, color) in pieces.into_iter() {
            result.pieces[square.to_index()] = Some((piece, color));
        }

        result
    }

    /// Get the current player
    pub fn get_side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Get the castle rights for a player
    pub fn get_castle_rights(&self, color: Color) -> CastleRights {
        self.castle_rights[color.to_index()]
    }

    /// Get the current en-passant target square
    pub fn get_en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Get the halfmove clock
    pub fn get_halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Get the fullmove number
    pub fn get_fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Set the side to move on the position
    ///
    /// This function can be used on self directly or in a builder pattern.
    pub fn side_to_move(&mut self, color: Color) -> &mut Self {
        self.side_to_move = color;
        self
    }

    /// Set the castle rights for a particular color on the position
    ///
    /// This function can be used on self directly or in a builder pattern.
    pub fn castle_rights(&mut self, color: Color, castle_rights: CastleRights) -> &mut Self {
        self.castle_rights[color.to_index()] = castle_rights;
        self
    }

    /// Set a piece on a square.
    ///
    /// Note that this can and will overwrite another piece on the square if
    /// needed.
    ///
    /// Note also that this will not update your castle rights.
    ///
    /// This function can be used on self directly or in a builder pattern.
    pub fn piece(&mut self, square: Square, piece: Piece, color: Color) -> &mut Self {
        self[square] = Some((piece, color));
        self
    }

    /// Clear a square on the board.
    ///
    /// Note that this will not update your castle rights.
    ///
    /// This function can be used on self directly or in a builder pattern.
    pub fn clear_square(&mut self, square: Square) -> &mut Self {
        self[square] = None;
        self
    }

    /// Set or clear the en-passant target square.
    ///
    /// This function can be used directly or in a builder pattern.
    pub fn en_passant(&mut self, square: Option<Square>) -> &mut Self {
        self.en_passant = square;
        self
    }

    /// Set the halfmove clock (halfmoves since the last capture or pawn
    /// advance).
    ///
    /// This function can be used directly or in a builder pattern.
    pub fn halfmove_clock(&mut self, clock: u32) -> &mut Self {
        self.halfmove_clock = clock;
        self
    }

    /// Set the fullmove number.
    ///
    /// This function can be used directly or in a builder pattern.
    pub fn fullmove_number(&mut self, number: u32) -> &mut Self {
        self.fullmove_number = number;
        self
    }
}

impl Index<Square> for BoardBuilder {
    type Output = Option<(Piece, Color)>;

    fn index(&self, square: Square) -> &Self::Output {
        &self.pieces[square.to_index()]
    }
}

impl IndexMut<Square> for BoardBuilder {
    fn index_mut(&mut self, square: Square) -> &mut Self::Output {
        &mut self.pieces[square.to_index()]
    }
}

impl From<&Board> for BoardBuilder {
    fn from(board: &Board) -> BoardBuilder {
        let mut result = BoardBuilder::new();
        for square in Square::all() {
            result.pieces[square.to_index()] = board.occupant(square);
        }
        result.side_to_move = board.side_to_move();
        result.castle_rights = [
            board.castle_rights(Color::White),
            board.castle_rights(Color::Black),
        ];
        result.en_passant = board.en_passant();
        result.halfmove_clock = board.halfmove_clock();
        result.fullmove_number = board.fullmove_number();
        result
    }
}

impl From<Board> for BoardBuilder {
    fn from(board: Board) -> BoardBuilder {
        BoardBuilder::from(&board)
    }
}

impl Default for BoardBuilder {
    /// The standard starting position, ready to edit.
    fn default() -> BoardBuilder {
        BoardBuilder::from(&Board::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn the_default_builder_is_the_starting_position() {
        let board = Board::try_from(&BoardBuilder::default()).unwrap();
        assert_eq!(board, Board::default());
    }

    #[test]
    fn kings_are_mandatory_and_unique() {
        // no kings at all
        assert!(Board::try_from(&BoardBuilder::new()).is_err());

        // only one king
        let mut builder = BoardBuilder::new();
        builder.piece(sq("e1"), Piece::King, Color::White);
        assert!(Board::try_from(&builder).is_err());

        // two kings of the same color
        builder
            .piece(sq("e8"), Piece::King, Color::Black)
            .piece(sq("a4"), Piece::King, Color::White);
        assert!(Board::try_from(&builder).is_err());

        builder.clear_square(sq("a4"));
        assert!(Board::try_from(&builder).is_ok());
    }

    #[test]
    fn pawns_may_not_stand_on_the_back_ranks() {
        let mut builder = BoardBuilder::new();
        builder
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("e8"), Piece::King, Color::Black)
            .piece(sq("c8"), Piece::Pawn, Color::White);
        assert!(Board::try_from(&builder).is_err());

        builder.clear_square(sq("c8")).piece(sq("c1"), Piece::Pawn, Color::Black);
        assert!(Board::try_from(&builder).is_err());
    }

    #[test]
    fn the_side_to_move_may_not_capture_the_king() {
        let mut builder = BoardBuilder::new();
        builder
            .piece(sq("a1"), Piece::King, Color::White)
            .piece(sq("e8"), Piece::King, Color::Black)
            .piece(sq("e5"), Piece::Rook, Color::White);
        // white to move, and white's rook already bears on the black king
        assert!(Board::try_from(&builder).is_err());

        // with black to move this is an ordinary check
        builder.side_to_move(Color::Black);
        let board = Board::try_from(&builder).unwrap();
        assert!(board.in_check());
    }

    #[test]
    fn castle_rights_need_king_and_rook_at_home() {
        let mut builder = BoardBuilder::new();
        builder
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("e8"), Piece::King, Color::Black)
            .castle_rights(Color::White, CastleRights::KingSide);
        // no rook on h1
        assert!(Board::try_from(&builder).is_err());

        builder.piece(sq("h1"), Piece::Rook, Color::White);
        assert!(Board::try_from(&builder).is_ok());

        // a wandering king forfeits the claim
        builder.clear_square(sq("e1")).piece(sq("d1"), Piece::King, Color::White);
        assert!(Board::try_from(&builder).is_err());
    }

    #[test]
    fn en_passant_targets_must_be_earned() {
        let mut builder = BoardBuilder::new();
        builder
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("e8"), Piece::King, Color::Black)
            .en_passant(Some(sq("d6")));
        // no black pawn on d5 to have double-advanced
        assert!(Board::try_from(&builder).is_err());

        builder.piece(sq("d5"), Piece::Pawn, Color::Black);
        assert!(Board::try_from(&builder).is_ok());

        // the wrong rank entirely
        builder.en_passant(Some(sq("d5")));
        assert!(Board::try_from(&builder).is_err());
    }

    #[test]
    fn squares_can_be_written_and_cleared_through_indexing() {
        let mut builder = BoardBuilder::new();
        builder[sq("d4")] = Some((Piece::Queen, Color::Black));
        assert_eq!(builder[sq("d4")], Some((Piece::Queen, Color::Black)));
        builder.clear_square(sq("d4"));
        assert_eq!(builder[sq("d4")], None);
    }
}
