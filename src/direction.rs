use crate::square::Square;
use arrayvec::ArrayVec;

/// One of the 16 board directions: the 8 ray directions sliders and kings
/// move along, and the 8 knight jumps.
///
/// North points from rank 1 toward rank 8; East points from file a toward
/// file h.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    NNE,
    NEE,
    SEE,
    SSE,
    SSW,
    SWW,
    NWW,
    NNW,
}

/// The rays a rook moves along.
pub const ROOK_DIRECTIONS: [Direction; 4] =
    [Direction::N, Direction::E, Direction::S, Direction::W];

/// The rays a bishop moves along.
pub const BISHOP_DIRECTIONS: [Direction; 4] =
    [Direction::NE, Direction::SE, Direction::SW, Direction::NW];

/// The rays a queen (or a stepping king) moves along.
pub const QUEEN_DIRECTIONS: [Direction; 8] = [
    Direction::N,
    Direction::NE,
    Direction::E,
    Direction::SE,
    Direction::S,
    Direction::SW,
    Direction::W,
    Direction::NW,
];

/// The knight jumps.
pub const KNIGHT_DIRECTIONS: [Direction; 8] = [
    Direction::NNE,
    Direction::NEE,
    Direction::SEE,
    Direction::SSE,
    Direction::SSW,
    Direction::SWW,
    Direction::NWW,
    Direction::NNW,
];

impl Direction {
    /// The (row, col) delta of a single step in this direction.
    #[inline]
    pub fn offset(self) -> (i8, i8) {
        match self {
            Direction::N => (1, 0),
            Direction::NE => (1, 1),
            Direction::E => (0, 1),
            Direction::SE => (-1, 1),
            Direction::S => (-1, 0),
            Direction::SW => (-1, -1),
            Direction::W => (0, -1),
            Direction::NW => (1, -1),
            Direction::NNE => (2, 1),
            Direction::NEE => (1, 2),
            Direction::SEE => (-1, 2),
            Direction::SSE => (-2, 1),
            Direction::SSW => (-2, -1),
            Direction::SWW => (-1, -2),
            Direction::NWW => (1, -2),
            Direction::NNW => (2, -1),
        }
    }
}

/// The squares strictly between `from` and `to`, walked with single steps
/// whose per-axis increments are clamped to {-1, 0, 1}.
///
/// For squares sharing a rank, file or exact diagonal this is the line
/// segment between them (at most 6 squares), excluding both endpoints.
pub fn between(from: Square, to: Square) -> ArrayVec<Square, 8> {
    let mut squares = ArrayVec::new();
    if from == to {
        return squares;
    }
    let mut row = from.row() as i8;
    let mut col = from.col() as i8;
    loop {
        row += (to.row() as i8 - row).signum();
        col += (to.col() as i8 - col).signum();
        if row == to.row() as i8 && col == to.col() as i8 {
            return squares;
        }
        squares.push(Square::make_square(row as u8, col as u8));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn between_on_a_file() {
        let squares: Vec<Square> = between(sq("e1"), sq("e5")).into_iter().collect();
        assert_eq!(squares, vec![sq("e2"), sq("e3"), sq("e4")]);
    }

    #[test]
    fn between_on_a_diagonal() {
        let squares: Vec<Square> = between(sq("h1"), sq("d5")).into_iter().collect();
        assert_eq!(squares, vec![sq("g2"), sq("f3"), sq("e4")]);
    }

    #[test]
    fn between_adjacent_squares_is_empty() {
        assert!(between(sq("e1"), sq("e2")).is_empty());
        assert!(between(sq("e1"), sq("f2")).is_empty());
        assert!(between(sq("e1"), sq("e1")).is_empty());
    }

    #[test]
    fn every_direction_moves_somewhere() {
        let center = sq("d4");
        for dirs in &[QUEEN_DIRECTIONS, KNIGHT_DIRECTIONS] {
            for dir in dirs.iter() {
                let (dr, dc) = dir.offset();
                assert!(center.try_offset(dr, dc).is_some());
            }
        }
    }
}
