use crate::board::Board;
use crate::chess_move::ChessMove;
use crate::color::Color;
use crate::direction::{
    between, Direction, BISHOP_DIRECTIONS, KNIGHT_DIRECTIONS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};
use crate::piece::{Piece, PROMOTION_PIECES};
use crate::square::Square;
use arrayvec::ArrayVec;
use std::collections::btree_set;
use std::collections::BTreeSet;

/// A queen in the open air reaches 27 squares; no piece reaches more.
const MAX_RAW_DESTS: usize = 27;

type RawDests = ArrayVec<Square, MAX_RAW_DESTS>;

impl Board {
    /// Give me all the legal moves for this board.
    ///
    /// Candidates are enumerated per piece and intersected with that piece's
    /// move restriction (the squares that keep its king safe under the
    /// current pins and checks).  An empty result is the game ending:
    /// checkmate if [`Board::check_origins`] is non-empty, stalemate if it
    /// is, and an automatic draw once the halfmove clock reaches 50,
    /// whatever the pieces could otherwise do.
    ///
    /// ```
    /// use referee::Board;
    ///
    /// // 16 pawn moves and 4 knight moves
    /// assert_eq!(Board::default().legal_moves().len(), 20);
    /// ```
    pub fn legal_moves(&self) -> BTreeSet<ChessMove> {
        let mut moves = BTreeSet::new();
        if self.halfmove_clock() >= 50 {
            return moves;
        }

        let color = self.side_to_move();
        for square in Square::all() {
            let piece = match self.occupant(square) {
                Some((piece, owner)) if owner == color => piece,
                _ => continue,
            };
            match piece {
                Piece::King => self.king_moves(square, &mut moves),
                Piece::Pawn => {
                    let raw = self.pawn_raw_moves(square);
                    self.push_restricted(square, piece, raw, &mut moves);
                }
                Piece::Knight => {
                    let raw = self.knight_raw_moves(square);
                    self.push_restricted(square, piece, raw, &mut moves);
                }
                Piece::Bishop => {
                    let raw = self.slider_raw_moves(square, &BISHOP_DIRECTIONS);
                    self.push_restricted(square, piece, raw, &mut moves);
                }
                Piece::Rook => {
                    let raw = self.slider_raw_moves(square, &ROOK_DIRECTIONS);
                    self.push_restricted(square, piece, raw, &mut moves);
                }
                Piece::Queen => {
                    let raw = self.slider_raw_moves(square, &QUEEN_DIRECTIONS);
                    self.push_restricted(square, piece, raw, &mut moves);
                }
            }
        }
        moves
    }

    /// Intersect a piece's raw candidates with its move restriction, fanning
    /// a pawn's arrival on the last rank out into the four promotions.
    fn push_restricted(
        &self,
        source: Square,
        piece: Piece,
        raw: RawDests,
        moves: &mut BTreeSet<ChessMove>,
    ) {
        let color = self.side_to_move();
        let allowed = self.move_restrictions(source);
        for dest in raw {
            if let Some(allowed) = &allowed {
                if !allowed.contains(&dest) {
                    continue;
                }
            }
            if piece == Piece::Pawn && dest.row() == color.to_their_backrank() {
                for &promotion in PROMOTION_PIECES.iter() {
                    moves.insert(ChessMove::new(source, dest, Some(promotion)));
                }
            } else {
                moves.insert(ChessMove::new(source, dest, None));
            }
        }
    }

    /// Which destinations keep the king safe for the piece on `square`?
    ///
    /// `None` means unrestricted: the piece is not pinned and its king is
    /// not in check.  With two or more checkers the answer is the empty set
    /// for every queried square; only the king can move then, and the king's
    /// generator deliberately never asks this function.
    fn move_restrictions(&self, square: Square) -> Option<BTreeSet<Square>> {
        let color = self.side_to_move();
        let checkers = self.check_origins();
        if checkers.len() >= 2 {
            return Some(BTreeSet::new());
        }

        let pin_line = self.pinner(color, square).map(|pinner| {
            // slide along the ray toward the attacker, or capture it
            let mut line: BTreeSet<Square> = between(square, pinner).into_iter().collect();
            line.insert(pinner);
            line
        });

        let check_relief = checkers.first().map(|&origin| {
            let mut relief = BTreeSet::new();
            relief.insert(origin);
            match self.piece_on(origin) {
                Some(Piece::Bishop) | Some(Piece::Rook) | Some(Piece::Queen) => {
                    relief.extend(between(origin, self.king_square(color)));
                }
                // a knight or pawn check cannot be blocked, only captured
                _ => {}
            }
            relief
        });

        match (pin_line, check_relief) {
            (None, None) => None,
            (Some(line), None) => Some(line),
            (None, Some(relief)) => Some(relief),
            (Some(line), Some(relief)) => Some(line.intersection(&relief).copied().collect()),
        }
    }

    fn pawn_raw_moves(&self, source: Square) -> RawDests {
        let color = self.side_to_move();
        let forward = color.forward_delta();
        let mut dests = RawDests::new();

        if let Some(one) = source.try_offset(forward, 0) {
            if self.occupant(one).is_none() {
                dests.push(one);
                if source.row() == color.to_second_rank() {
                    if let Some(two) = one.try_offset(forward, 0) {
                        if self.occupant(two).is_none() {
                            dests.push(two);
                        }
                    }
                }
            }
        }

        for &col_delta in &[-1, 1] {
            if let Some(dest) = source.try_offset(forward, col_delta) {
                if self.color_on(dest) == Some(!color) || Some(dest) == self.en_passant() {
                    dests.push(dest);
                }
            }
        }
        dests
    }

    fn knight_raw_moves(&self, source: Square) -> RawDests {
        let color = self.side_to_move();
        let mut dests = RawDests::new();
        for dir in KNIGHT_DIRECTIONS.iter() {
            let (row_delta, col_delta) = dir.offset();
            if let Some(dest) = source.try_offset(row_delta, col_delta) {
                if self.color_on(dest) != Some(color) {
                    dests.push(dest);
                }
            }
        }
        dests
    }

    fn slider_raw_moves(&self, source: Square, directions: &[Direction]) -> RawDests {
        let color = self.side_to_move();
        let mut dests = RawDests::new();
        for dir in directions.iter() {
            let (row_delta, col_delta) = dir.offset();
            let mut current = source;
            while let Some(next) = current.try_offset(row_delta, col_delta) {
                match self.color_on(next) {
                    None => {
                        dests.push(next);
                        current = next;
                    }
                    Some(owner) if owner != color => {
                        dests.push(next);
                        break;
                    }
                    Some(_) => break,
                }
            }
        }
        dests
    }

    /// King moves bypass `move_restrictions` entirely: the king escapes
    /// check by stepping off every threatened square, which the opponent's
    /// threat set (with its x-ray through this king) already encodes.
    fn king_moves(&self, source: Square, moves: &mut BTreeSet<ChessMove>) {
        let color = self.side_to_move();
        let enemy_threats = self.threatened(!color);

        for dir in QUEEN_DIRECTIONS.iter() {
            let (row_delta, col_delta) = dir.offset();
            if let Some(dest) = source.try_offset(row_delta, col_delta) {
                if self.color_on(dest) == Some(color) || enemy_threats.contains(&dest) {
                    continue;
                }
                moves.insert(ChessMove::new(source, dest, None));
            }
        }

        if !self.in_check() {
            let row = color.to_my_backrank();
            if self.kingside_castle_possible(color) {
                moves.insert(ChessMove::new(source, Square::make_square(row, 6), None));
            }
            if self.queenside_castle_possible(color) {
                moves.insert(ChessMove::new(source, Square::make_square(row, 2), None));
            }
        }
    }

    /// Kingside castling needs the two squares between king and rook empty,
    /// and the king's start, transit and destination squares unattacked.
    fn kingside_castle_possible(&self, color: Color) -> bool {
        if !self.castle_rights(color).has_kingside() {
            return false;
        }
        let row = color.to_my_backrank();
        let threats = self.threatened(!color);
        [5u8, 6]
            .iter()
            .all(|&col| self.occupant(Square::make_square(row, col)).is_none())
            && [4u8, 5, 6]
                .iter()
                .all(|&col| !threats.contains(&Square::make_square(row, col)))
    }

    /// Queenside castling needs all three squares between king and rook
    /// empty; the rook's transit square (the b-file) may be attacked, the
    /// king's path may not.
    fn queenside_castle_possible(&self, color: Color) -> bool {
        if !self.castle_rights(color).has_queenside() {
            return false;
        }
        let row = color.to_my_backrank();
        let threats = self.threatened(!color);
        [1u8, 2, 3]
            .iter()
            .all(|&col| self.occupant(Square::make_square(row, col)).is_none())
            && [2u8, 3, 4]
                .iter()
                .all(|&col| !threats.contains(&Square::make_square(row, col)))
    }
}

/// The move generation iterator
///
/// Walks the current legal-move set in its natural (source, dest, promotion)
/// order without the caller having to hold the set.
///
/// ```
/// use referee::{Board, MoveGen};
///
/// let board = Board::default();
/// let mut iterable = MoveGen::new_legal(&board);
/// assert_eq!(iterable.len(), 20);
///
/// let count = iterable.by_ref().filter(|m| m.get_promotion().is_none()).count();
/// assert_eq!(count, 20);
/// ```
pub struct MoveGen {
    moves: btree_set::IntoIter<ChessMove>,
}

impl MoveGen {
    /// Create a new `MoveGen` over every legal move in the position.
    pub fn new_legal(board: &Board) -> MoveGen {
        MoveGen {
            moves: board.legal_moves().into_iter(),
        }
    }

    /// Count the leaf nodes of the legal-move tree, `depth` plies deep.
    ///
    /// This is the standard way to cross-check a move generator against
    /// published results.
    pub fn perft(board: &Board, depth: usize) -> usize {
        if depth == 0 {
            return 1;
        }
        let mut count = 0;
        for m in MoveGen::new_legal(board) {
            if depth == 1 {
                count += 1;
            } else {
                let mut next = board.clone();
                next.make_move(m);
                count += MoveGen::perft(&next, depth - 1);
            }
        }
        count
    }
}

impl Iterator for MoveGen {
    type Item = ChessMove;

    fn next(&mut self) -> Option<ChessMove> {
        self.moves.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.moves.size_hint()
    }
}

impl ExactSizeIterator for MoveGen {
    fn len(&self) -> usize {
        self.moves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_builder::BoardBuilder;
    use crate::board::BoardStatus;
    use crate::castle_rights::CastleRights;
    use std::convert::TryInto;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn mv(name: &str) -> ChessMove {
        name.parse().unwrap()
    }

    fn dests_from(board: &Board, source: Square) -> BTreeSet<Square> {
        board
            .legal_moves()
            .into_iter()
            .filter(|m| m.get_source() == source)
            .map(|m| m.get_dest())
            .collect()
    }

    #[test]
    fn twenty_moves_from_the_starting_position() {
        let board = Board::default();
        let moves = board.legal_moves();
        assert_eq!(moves.len(), 20);
        assert!(moves.contains(&mv("e2e4")));
        assert!(moves.contains(&mv("g1f3")));
        // 16 pawn moves, 4 knight moves
        assert_eq!(
            moves
                .iter()
                .filter(|m| board.piece_on(m.get_source()) == Some(Piece::Pawn))
                .count(),
            16
        );
        assert_eq!(MoveGen::new_legal(&board).len(), 20);
        assert_eq!(MoveGen::new_legal(&board).count(), 20);
    }

    #[test]
    fn a_pinned_bishop_cannot_leave_its_file() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("e4"), Piece::Bishop, Color::White)
            .piece(sq("e8"), Piece::Rook, Color::Black)
            .piece(sq("g8"), Piece::King, Color::Black)
            .try_into()
            .unwrap();

        // the bishop moves diagonally, the pin line runs along the file:
        // nothing is left
        assert!(dests_from(&board, sq("e4")).is_empty());
        // the king is unbothered behind its bishop
        assert_eq!(dests_from(&board, sq("e1")).len(), 5);
        assert_eq!(board.legal_moves().len(), 5);
    }

    #[test]
    fn a_pinned_queen_slides_along_the_pin_line_only() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("e4"), Piece::Queen, Color::White)
            .piece(sq("e8"), Piece::Rook, Color::Black)
            .piece(sq("g8"), Piece::King, Color::Black)
            .try_into()
            .unwrap();

        let expected: BTreeSet<Square> =
            vec![sq("e5"), sq("e6"), sq("e7"), sq("e8")].into_iter().collect();
        assert_eq!(dests_from(&board, sq("e4")), expected);
    }

    #[test]
    fn double_check_silences_everything_but_the_king() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::Rook, Color::White)
            .piece(sq("b2"), Piece::Bishop, Color::White)
            .piece(sq("h8"), Piece::King, Color::White)
            .piece(sq("e5"), Piece::King, Color::Black)
            .piece(sq("d5"), Piece::Queen, Color::Black)
            .side_to_move(Color::Black)
            .try_into()
            .unwrap();

        assert_eq!(board.check_origins().len(), 2);
        let moves = board.legal_moves();
        assert!(moves.iter().all(|m| m.get_source() == sq("e5")));
        // e4 and e6 stay covered by the rook (x-ray through the king),
        // d4 and f6 by the bishop
        let expected: BTreeSet<Square> =
            vec![sq("d6"), sq("f4"), sq("f5")].into_iter().collect();
        assert_eq!(dests_from(&board, sq("e5")), expected);
    }

    #[test]
    fn a_checked_king_cannot_retreat_along_the_ray() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::Rook, Color::White)
            .piece(sq("a2"), Piece::King, Color::White)
            .piece(sq("e5"), Piece::King, Color::Black)
            .side_to_move(Color::Black)
            .try_into()
            .unwrap();

        let moves = board.legal_moves();
        assert!(!moves.contains(&mv("e5e6")));
        assert!(!moves.contains(&mv("e5e4")));
        assert_eq!(moves.len(), 6);
    }

    #[test]
    fn blocking_and_capturing_relieve_a_single_check() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("a1"), Piece::Rook, Color::White)
            .piece(sq("h4"), Piece::Queen, Color::White)
            .piece(sq("e8"), Piece::Rook, Color::Black)
            .piece(sq("g8"), Piece::King, Color::Black)
            .try_into()
            .unwrap();

        assert_eq!(board.check_origins(), &[sq("e8")][..]);
        // the rook can block on its file's crossing of the check line, the
        // queen can block or capture the checker
        let moves = board.legal_moves();
        assert!(moves.contains(&mv("h4e4"))); // block
        assert!(moves.contains(&mv("h4e7"))); // block
        assert!(!moves.contains(&mv("h4h8"))); // does not address the check
        assert!(moves.iter().all(|m| {
            m.get_source() == sq("e1")
                || matches!(
                    m.get_dest(),
                    d if d.col() == 4 || d == sq("e8")
                )
        }));
    }

    #[test]
    fn a_protected_queen_next_to_the_king_mates() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("e2"), Piece::Queen, Color::Black)
            .piece(sq("e3"), Piece::King, Color::Black)
            .try_into()
            .unwrap();

        // the queen is defended, so capturing it is no escape
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.check_origins(), &[sq("e2")][..]);
        assert_eq!(board.status(), BoardStatus::Checkmate);
    }

    #[test]
    fn stalemate_is_an_empty_set_without_check() {
        let board: Board = BoardBuilder::new()
            .piece(sq("b6"), Piece::King, Color::White)
            .piece(sq("c7"), Piece::Queen, Color::White)
            .piece(sq("a8"), Piece::King, Color::Black)
            .side_to_move(Color::Black)
            .try_into()
            .unwrap();

        assert!(board.legal_moves().is_empty());
        assert!(board.check_origins().is_empty());
        assert_eq!(board.status(), BoardStatus::Stalemate);
    }

    #[test]
    fn the_fifty_move_rule_empties_the_move_set() {
        let board: Board = BoardBuilder::from(&Board::default())
            .halfmove_clock(50)
            .try_into()
            .unwrap();
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.status(), BoardStatus::FiftyMoveDraw);

        let board: Board = BoardBuilder::from(&Board::default())
            .halfmove_clock(49)
            .try_into()
            .unwrap();
        assert_eq!(board.legal_moves().len(), 20);
        assert_eq!(board.status(), BoardStatus::Ongoing);
    }

    #[test]
    fn promotions_fan_out_into_four_moves() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("a7"), Piece::Pawn, Color::White)
            .piece(sq("b8"), Piece::Rook, Color::Black)
            .piece(sq("h8"), Piece::King, Color::Black)
            .try_into()
            .unwrap();

        let from_pawn: Vec<ChessMove> = board
            .legal_moves()
            .into_iter()
            .filter(|m| m.get_source() == sq("a7"))
            .collect();
        // four quiet promotions on a8, four capture-promotions on b8
        assert_eq!(from_pawn.len(), 8);
        assert!(from_pawn.iter().all(|m| m.get_promotion().is_some()));
        let quiet: BTreeSet<Piece> = from_pawn
            .iter()
            .filter(|m| m.get_dest() == sq("a8"))
            .filter_map(|m| m.get_promotion())
            .collect();
        assert_eq!(quiet.len(), 4);
    }

    #[test]
    fn castling_requires_empty_squares() {
        let mut builder = BoardBuilder::new();
        builder
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("h1"), Piece::Rook, Color::White)
            .piece(sq("f1"), Piece::Bishop, Color::White)
            .piece(sq("e8"), Piece::King, Color::Black)
            .castle_rights(Color::White, CastleRights::KingSide);
        let board: Board = (&builder).try_into().unwrap();
        assert!(!board.legal_moves().contains(&mv("e1g1")));

        // clearing the bishop clears the way
        builder.clear_square(sq("f1"));
        let board: Board = (&builder).try_into().unwrap();
        assert!(board.legal_moves().contains(&mv("e1g1")));
    }

    #[test]
    fn castling_requires_an_unattacked_king_path() {
        for attacked in &["e8", "f8", "g8"] {
            let board: Board = BoardBuilder::new()
                .piece(sq("e1"), Piece::King, Color::White)
                .piece(sq("h1"), Piece::Rook, Color::White)
                .piece(sq(attacked), Piece::Rook, Color::Black)
                .piece(sq("a8"), Piece::King, Color::Black)
                .castle_rights(Color::White, CastleRights::KingSide)
                .try_into()
                .unwrap();
            assert!(
                !board.legal_moves().contains(&mv("e1g1")),
                "castling through a rook on {} should be illegal",
                attacked
            );
        }
    }

    #[test]
    fn castling_requires_the_right_to_remain() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("h1"), Piece::Rook, Color::White)
            .piece(sq("e8"), Piece::King, Color::Black)
            .try_into()
            .unwrap();
        // pieces at home, but the rights are gone
        assert!(!board.legal_moves().contains(&mv("e1g1")));
    }

    #[test]
    fn queenside_castling_ignores_attacks_on_the_rook_path() {
        let mut builder = BoardBuilder::new();
        builder
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("a1"), Piece::Rook, Color::White)
            .piece(sq("b8"), Piece::Rook, Color::Black)
            .piece(sq("h8"), Piece::King, Color::Black)
            .castle_rights(Color::White, CastleRights::QueenSide);
        // b1 is attacked, but only the king's path matters
        let board: Board = (&builder).try_into().unwrap();
        assert!(board.legal_moves().contains(&mv("e1c1")));

        // a piece on b1 still blocks, though: the rook must pass through
        builder.piece(sq("b1"), Piece::Knight, Color::White);
        let board: Board = (&builder).try_into().unwrap();
        assert!(!board.legal_moves().contains(&mv("e1c1")));
    }

    #[test]
    fn no_castling_while_in_check() {
        let board: Board = BoardBuilder::new()
            .piece(sq("e1"), Piece::King, Color::White)
            .piece(sq("h1"), Piece::Rook, Color::White)
            .piece(sq("e8"), Piece::Rook, Color::Black)
            .piece(sq("a8"), Piece::King, Color::Black)
            .castle_rights(Color::White, CastleRights::KingSide)
            .try_into()
            .unwrap();
        assert!(board.in_check());
        assert!(!board.legal_moves().contains(&mv("e1g1")));
    }
}

#[cfg(test)]
fn kiwipete() -> Board {
    use std::convert::TryInto;

    let sq = |name: &str| -> Square { name.parse().unwrap() };
    let pieces = [
        (sq("a8"), Piece::Rook, Color::Black),
        (sq("e8"), Piece::King, Color::Black),
        (sq("h8"), Piece::Rook, Color::Black),
        (sq("a7"), Piece::Pawn, Color::Black),
        (sq("c7"), Piece::Pawn, Color::Black),
        (sq("d7"), Piece::Pawn, Color::Black),
        (sq("e7"), Piece::Queen, Color::Black),
        (sq("f7"), Piece::Pawn, Color::Black),
        (sq("g7"), Piece::Bishop, Color::Black),
        (sq("a6"), Piece::Bishop, Color::Black),
        (sq("b6"), Piece::Knight, Color::Black),
        (sq("e6"), Piece::Pawn, Color::Black),
        (sq("f6"), Piece::Knight, Color::Black),
        (sq("g6"), Piece::Pawn, Color::Black),
        (sq("d5"), Piece::Pawn, Color::White),
        (sq("e5"), Piece::Knight, Color::White),
        (sq("b4"), Piece::Pawn, Color::Black),
        (sq("e4"), Piece::Pawn, Color::White),
        (sq("c3"), Piece::Knight, Color::White),
        (sq("f3"), Piece::Queen, Color::White),
        (sq("h3"), Piece::Pawn, Color::Black),
        (sq("a2"), Piece::Pawn, Color::White),
        (sq("b2"), Piece::Pawn, Color::White),
        (sq("c2"), Piece::Pawn, Color::White),
        (sq("d2"), Piece::Bishop, Color::White),
        (sq("e2"), Piece::Bishop, Color::White),
        (sq("f2"), Piece::Pawn, Color::White),
        (sq("g2"), Piece::Pawn, Color::White),
        (sq("h2"), Piece::Pawn, Color::White),
        (sq("a1"), Piece::Rook, Color::White),
        (sq("e1"), Piece::King, Color::White),
        (sq("h1"), Piece::Rook, Color::White),
    ];
    crate::board_builder::BoardBuilder::setup(
        &pieces,
        Color::White,
        crate::castle_rights::CastleRights::Both,
        crate::castle_rights::CastleRights::Both,
        None,
    )
    .try_into()
    .unwrap()
}

#[test]
fn perft_initial_position() {
    let board = Board::default();
    assert_eq!(MoveGen::perft(&board, 1), 20);
    assert_eq!(MoveGen::perft(&board, 2), 400);
    assert_eq!(MoveGen::perft(&board, 3), 8902);
}

#[test]
fn perft_kiwipete() {
    let board = kiwipete();
    assert_eq!(MoveGen::perft(&board, 1), 48);
    assert_eq!(MoveGen::perft(&board, 2), 2039);
}
