use crate::board_builder::BoardBuilder;
use crate::castle_rights::CastleRights;
use crate::chess_move::ChessMove;
use crate::color::{Color, ALL_COLORS, NUM_COLORS};
use crate::direction::{
    between, Direction, BISHOP_DIRECTIONS, KNIGHT_DIRECTIONS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};
use crate::error::Error;
use crate::piece::Piece;
use crate::square::Square;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;
use std::fmt;

/// The current state of the game, as far as this crate can tell.
///
/// Draws this crate does not adjudicate (repetition, insufficient material)
/// never show up here; an external arbiter can detect them from the
/// accessors on [`Board`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum BoardStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    FiftyMoveDraw,
}

/// A representation of a chess board.  That's why you're here, right?
///
/// The board owns the piece grid and its metadata (side to move, castling
/// rights, en-passant target, move counters), plus three pieces of *derived*
/// state: the squares each color threatens, the pieces pinned against each
/// king, and the squares currently giving check.  Derived state is rebuilt
/// from scratch after every move, never patched, so it can always be trusted
/// to match the grid.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    grid: [[Option<(Piece, Color)>; 8]; 8],
    side_to_move: Color,
    castle_rights: [CastleRights; NUM_COLORS],
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    kings: [Square; NUM_COLORS],
    pinned: [BTreeMap<Square, Square>; NUM_COLORS],
    threatened: [BTreeSet<Square>; NUM_COLORS],
    check_origins: Vec<Square>,
}

impl Board {
    /// What piece is on a particular `Square`?  Is there even one?
    #[inline]
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.occupant(square).map(|(piece, _)| piece)
    }

    /// What color's piece is on a particular `Square`?
    #[inline]
    pub fn color_on(&self, square: Square) -> Option<Color> {
        self.occupant(square).map(|(_, color)| color)
    }

    #[inline]
    pub(crate) fn occupant(&self, square: Square) -> Option<(Piece, Color)> {
        self.grid[square.row() as usize][square.col() as usize]
    }

    #[inline]
    fn set(&mut self, square: Square, occupant: Option<(Piece, Color)>) {
        self.grid[square.row() as usize][square.col() as usize] = occupant;
    }

    /// Who's turn is it?
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Grab the `CastleRights` for a particular side.
    #[inline]
    pub fn castle_rights(&self, color: Color) -> CastleRights {
        self.castle_rights[color.to_index()]
    }

    /// Grab my `CastleRights`.
    #[inline]
    pub fn my_castle_rights(&self) -> CastleRights {
        self.castle_rights(self.side_to_move())
    }

    /// The square a double-advanced pawn skipped over last move, if any.
    /// This is the square an en-passant capture lands on, and it is only
    /// ever live for the single move that answers the double advance.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Halfmoves since the last capture or pawn advance.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Full moves since the game started.  Starts at 1, increments after
    /// Black moves.
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Where is `color`'s king?
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.to_index()]
    }

    /// The squares of every enemy piece currently attacking the
    /// side-to-move's king, in board-scan order.  Empty means not in check.
    #[inline]
    pub fn check_origins(&self) -> &[Square] {
        &self.check_origins
    }

    /// Is the side to move in check?
    #[inline]
    pub fn in_check(&self) -> bool {
        !self.check_origins.is_empty()
    }

    /// Every square `color` attacks.  A square counts as threatened even if
    /// moving there would be illegal for the attacker, and even if one of
    /// the attacker's own pieces stands on it.
    #[inline]
    pub fn threatened(&self, color: Color) -> &BTreeSet<Square> {
        &self.threatened[color.to_index()]
    }

    /// If a piece of `color` on `square` is pinned against its king, the
    /// square of the enemy slider pinning it.
    #[inline]
    pub(crate) fn pinner(&self, color: Color, square: Square) -> Option<Square> {
        self.pinned[color.to_index()].get(&square).copied()
    }

    /// Reinitialize to the standard starting position.
    pub fn reset(&mut self) {
        *self = Board::default();
    }

    /// How did the game end?  Or did it?
    ///
    /// ```
    /// use referee::{Board, BoardStatus};
    ///
    /// assert_eq!(Board::default().status(), BoardStatus::Ongoing);
    /// ```
    pub fn status(&self) -> BoardStatus {
        if self.halfmove_clock >= 50 {
            BoardStatus::FiftyMoveDraw
        } else if !self.legal_moves().is_empty() {
            BoardStatus::Ongoing
        } else if self.in_check() {
            BoardStatus::Checkmate
        } else {
            BoardStatus::Stalemate
        }
    }

    /// Does this board "make sense"?  Exactly one king per color, with the
    /// cached king squares pointing at them?  This is for sanity checking.
    pub fn is_sane(&self) -> bool {
        for &color in ALL_COLORS.iter() {
            let mut kings =
                Square::all().filter(|&sq| self.occupant(sq) == Some((Piece::King, color)));
            if kings.next() != Some(self.king_square(color)) || kings.next().is_some() {
                return false;
            }
        }
        true
    }

    /// Make a chess move on the board.
    ///
    /// `m` must be a member of the most recent [`Board::legal_moves`] set;
    /// that precondition is asserted in debug builds and not re-validated in
    /// release builds.
    ///
    /// ```
    /// use referee::{Board, Color};
    ///
    /// let mut board = Board::default();
    /// board.make_move("e2e4".parse().expect("valid move text"));
    /// assert_eq!(board.side_to_move(), Color::Black);
    /// ```
    pub fn make_move(&mut self, m: ChessMove) {
        debug_assert!(
            self.legal_moves().contains(&m),
            "applied move {} is not in the current legal-move set",
            m
        );

        let source = m.get_source();
        let dest = m.get_dest();
        let (piece, color) = self.occupant(source).unwrap();

        if let Some((Piece::King, _)) = self.occupant(dest) {
            // A king can never actually be captured; landing on one means the
            // move generator let an illegal move through.  Continuing would
            // corrupt the position, so don't.
            panic!("move {} captures a king; the position is corrupt", m);
        }
        let captured = self.occupant(dest).is_some();

        if piece == Piece::Pawn && Some(dest) == self.en_passant {
            // The double-advanced pawn sits beside the source square, on the
            // capture's file.
            self.set(Square::make_square(source.row(), dest.col()), None);
        }

        if piece == Piece::King && (dest.col() as i8 - source.col() as i8).abs() == 2 {
            let row = color.to_my_backrank();
            let (rook_from, rook_to) = if dest.col() == 6 {
                (Square::make_square(row, 7), Square::make_square(row, 5))
            } else {
                (Square::make_square(row, 0), Square::make_square(row, 3))
            };
            let rook = self.occupant(rook_from);
            self.set(rook_from, None);
            self.set(rook_to, rook);
        }

        self.set(source, None);
        self.set(dest, Some((m.get_promotion().unwrap_or(piece), color)));

        if piece == Piece::King {
            self.kings[color.to_index()] = dest;
        }

        let my_loss = CastleRights::square_to_castle_rights(color, source);
        self.castle_rights[color.to_index()] = self.castle_rights(color).remove(my_loss);
        let their_loss = CastleRights::square_to_castle_rights(!color, dest);
        self.castle_rights[(!color).to_index()] = self.castle_rights(!color).remove(their_loss);

        self.en_passant =
            if piece == Piece::Pawn && (dest.row() as i8 - source.row() as i8).abs() == 2 {
                Some(Square::make_square((source.row() + dest.row()) / 2, source.col()))
            } else {
                None
            };

        if piece == Piece::Pawn || captured {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = !color;

        self.rebuild_pins(Color::White);
        self.rebuild_pins(Color::Black);
        self.rebuild_threats_and_checks();
    }

    /// Recompute which pieces are pinned against `color`'s king.
    ///
    /// Every enemy slider that shares a rank, file or exact diagonal with
    /// the king pins the piece between them, provided there is exactly one.
    pub(crate) fn rebuild_pins(&mut self, color: Color) {
        let king = self.king_square(color);
        self.pinned[color.to_index()].clear();

        for square in Square::all() {
            let (piece, owner) = match self.occupant(square) {
                Some(occupant) => occupant,
                None => continue,
            };
            if owner == color {
                continue;
            }

            let row_delta = king.row() as i8 - square.row() as i8;
            let col_delta = king.col() as i8 - square.col() as i8;
            let shares_line = row_delta == 0 || col_delta == 0;
            let shares_diagonal = row_delta.abs() == col_delta.abs();
            let aligned = match piece {
                Piece::Rook => shares_line,
                Piece::Bishop => shares_diagonal,
                Piece::Queen => shares_line || shares_diagonal,
                _ => false,
            };
            if !aligned {
                continue;
            }

            let mut blockers = between(square, king)
                .into_iter()
                .filter(|&sq| self.occupant(sq).is_some());
            if let (Some(blocker), None) = (blockers.next(), blockers.next()) {
                if self.color_on(blocker) == Some(color) {
                    self.pinned[color.to_index()].insert(blocker, square);
                }
            }
        }
    }

    /// Recompute both threat sets and the check origins for the side to
    /// move, from nothing but the grid.
    pub(crate) fn rebuild_threats_and_checks(&mut self) {
        self.threatened = [BTreeSet::new(), BTreeSet::new()];
        self.check_origins.clear();

        let defender = self.side_to_move;
        let king = self.king_square(defender);

        for square in Square::all() {
            if let Some((_, color)) = self.occupant(square) {
                let threats = self.threatened_squares(square);
                if color != defender && threats.contains(&king) {
                    self.check_origins.push(square);
                }
                self.threatened[color.to_index()].extend(threats);
            }
        }
    }

    /// The set of squares the piece on `square` attacks: every square that
    /// would be check if the enemy king stood there.
    pub(crate) fn threatened_squares(&self, square: Square) -> BTreeSet<Square> {
        let mut threats = BTreeSet::new();
        let (piece, color) = match self.occupant(square) {
            Some(occupant) => occupant,
            None => return threats,
        };

        match piece {
            Piece::Pawn => {
                // only the forward diagonals; the push square is not a threat
                for &col_delta in &[-1, 1] {
                    if let Some(sq) = square.try_offset(color.forward_delta(), col_delta) {
                        threats.insert(sq);
                    }
                }
            }
            Piece::Knight => {
                for dir in KNIGHT_DIRECTIONS.iter() {
                    let (row_delta, col_delta) = dir.offset();
                    if let Some(sq) = square.try_offset(row_delta, col_delta) {
                        threats.insert(sq);
                    }
                }
            }
            Piece::King => {
                for dir in QUEEN_DIRECTIONS.iter() {
                    let (row_delta, col_delta) = dir.offset();
                    if let Some(sq) = square.try_offset(row_delta, col_delta) {
                        threats.insert(sq);
                    }
                }
            }
            Piece::Bishop => self.ray_threats(square, color, &BISHOP_DIRECTIONS, &mut threats),
            Piece::Rook => self.ray_threats(square, color, &ROOK_DIRECTIONS, &mut threats),
            Piece::Queen => self.ray_threats(square, color, &QUEEN_DIRECTIONS, &mut threats),
        }

        threats
    }

    /// Walk each ray until the board edge or the first occupied square.  The
    /// occupied square is itself threatened.  The enemy king does not stop
    /// the ray: it is counted and the square behind it is threatened too, so
    /// a checked king cannot escape by stepping straight back along the ray.
    fn ray_threats(
        &self,
        origin: Square,
        attacker: Color,
        directions: &[Direction],
        threats: &mut BTreeSet<Square>,
    ) {
        for dir in directions.iter() {
            let (row_delta, col_delta) = dir.offset();
            let mut current = origin;
            while let Some(next) = current.try_offset(row_delta, col_delta) {
                threats.insert(next);
                match self.occupant(next) {
                    Some((Piece::King, color)) if color != attacker => {
                        if let Some(past) = next.try_offset(row_delta, col_delta) {
                            threats.insert(past);
                        }
                        break;
                    }
                    Some(_) => break,
                    None => current = next,
                }
            }
        }
    }
}

impl Default for Board {
    /// The standard starting position.
    fn default() -> Board {
        let back = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];

        let mut grid: [[Option<(Piece, Color)>; 8]; 8] = [[None; 8]; 8];
        for (col, &piece) in back.iter().enumerate() {
            grid[0][col] = Some((piece, Color::White));
            grid[1][col] = Some((Piece::Pawn, Color::White));
            grid[6][col] = Some((Piece::Pawn, Color::Black));
            grid[7][col] = Some((piece, Color::Black));
        }

        let mut board = Board {
            grid,
            side_to_move: Color::White,
            castle_rights: [CastleRights::Both, CastleRights::Both],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            kings: [Square::make_square(0, 4), Square::make_square(7, 4)],
            pinned: [BTreeMap::new(), BTreeMap::new()],
            threatened: [BTreeSet::new(), BTreeSet::new()],
            check_origins: vec![],
        };
        board.rebuild_pins(Color::White);
        board.rebuild_pins(Color::Black);
        board.rebuild_threats_and_checks();
        board
    }
}

impl TryFrom<&BoardBuilder> for Board {
    type Error = Error;

    /// Validate a hand-built position and promote it to a real `Board`.
    ///
    /// Rejected positions: missing or duplicated kings, pawns on either back
    /// rank, castle rights whose king or rook is not at home, an en-passant
    /// target that no double advance could have produced, and positions
    /// where the side to move could capture the opposing king.
    fn try_from(builder: &BoardBuilder) -> Result<Board, Error> {
        let mut grid: [[Option<(Piece, Color)>; 8]; 8] = [[None; 8]; 8];
        let mut kings: [Option<Square>; NUM_COLORS] = [None, None];

        for square in Square::all() {
            if let Some((piece, color)) = builder[square] {
                if piece == Piece::Pawn && (square.row() == 0 || square.row() == 7) {
                    return Err(Error::InvalidBoard);
                }
                if piece == Piece::King {
                    if kings[color.to_index()].is_some() {
                        return Err(Error::InvalidBoard);
                    }
                    kings[color.to_index()] = Some(square);
                }
                grid[square.row() as usize][square.col() as usize] = Some((piece, color));
            }
        }

        let kings = [
            kings[0].ok_or(Error::InvalidBoard)?,
            kings[1].ok_or(Error::InvalidBoard)?,
        ];

        for &color in ALL_COLORS.iter() {
            let rights = builder.get_castle_rights(color);
            let row = color.to_my_backrank() as usize;
            if rights != CastleRights::NoRights && kings[color.to_index()].col() != 4 {
                return Err(Error::InvalidBoard);
            }
            if rights != CastleRights::NoRights && kings[color.to_index()].row() as usize != row {
                return Err(Error::InvalidBoard);
            }
            if rights.has_kingside() && grid[row][7] != Some((Piece::Rook, color)) {
                return Err(Error::InvalidBoard);
            }
            if rights.has_queenside() && grid[row][0] != Some((Piece::Rook, color)) {
                return Err(Error::InvalidBoard);
            }
        }

        let side_to_move = builder.get_side_to_move();
        if let Some(target) = builder.get_en_passant() {
            let mover = !side_to_move;
            let (target_row, pawn_row) = match mover {
                Color::White => (2, 3),
                Color::Black => (5, 4),
            };
            if target.row() != target_row
                || grid[target.row() as usize][target.col() as usize].is_some()
                || grid[pawn_row][target.col() as usize] != Some((Piece::Pawn, mover))
            {
                return Err(Error::InvalidBoard);
            }
        }

        let mut board = Board {
            grid,
            side_to_move,
            castle_rights: [
                builder.get_castle_rights(Color::White),
                builder.get_castle_rights(Color::Black),
            ],
            en_passant: builder.get_en_passant(),
            halfmove_clock: builder.get_halfmove_clock(),
            fullmove_number: builder.get_fullmove_number(),
            kings,
            pinned: [BTreeMap::new(), BTreeMap::new()],
            threatened: [BTreeSet::new(), BTreeSet::new()],
            check_origins: vec![],
        };
        board.rebuild_pins(Color::White);
        board.rebuild_pins(Color::Black);
        board.rebuild_threats_and_checks();

        // the player who just moved cannot have left their own king en prise
        if board
            .threatened(side_to_move)
            .contains(&board.king_square(!side_to_move))
        {
            return Err(Error::InvalidBoard);
        }

        Ok(board)
    }
}

impl TryFrom<&mut BoardBuilder> for Board {
    type Error = Error;

    fn try_from(builder: &mut BoardBuilder) -> Result<Board, Error> {
        Board::try_from(&*builder)
    }
}

impl TryFrom<BoardBuilder> for Board {
    type Error = Error;

    fn try_from(builder: BoardBuilder) -> Result<Board, Error> {
        Board::try_from(&builder)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in (0..8u8).rev() {
            write!(f, "{} ", row + 1)?;
            for col in 0..8u8 {
                let square = Square::make_square(row, col);
                match self.occupant(square) {
                    None => write!(f, " . ")?,
                    Some((piece, color)) => {
                        let letter = if color == Color::White {
                            piece.to_string().to_uppercase()
                        } else {
                            piece.to_string()
                        };
                        if self.check_origins.contains(&square) {
                            write!(f, "c{} ", letter)?;
                        } else {
                            write!(f, " {} ", letter)?;
                        }
                    }
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "   a  b  c  d  e  f  g  h")?;
        writeln!(f, "{} to move", self.side_to_move)
    }
}
