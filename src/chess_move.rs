use crate::error::Error;
use crate::piece::Piece;
use crate::square::Square;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Represent a ChessMove in memory
///
/// A move is nothing more than a source square, a destination square, and
/// (for a pawn reaching the last rank) the piece promoted to.  Castling is
/// encoded as the king moving two columns; there is no separate move kind.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ChessMove {
    source: Square,
    dest: Square,
    promotion: Option<Piece>,
}

impl ChessMove {
    /// Create a new chess move, given a source `Square`, a destination
    /// `Square`, and an optional promotion `Piece`
    #[inline]
    pub fn new(source: Square, dest: Square, promotion: Option<Piece>) -> ChessMove {
        ChessMove {
            source,
            dest,
            promotion,
        }
    }

    /// Get the source square (square the piece is currently on).
    #[inline]
    pub fn get_source(&self) -> Square {
        self.source
    }

    /// Get the destination square (square the piece is going to).
    #[inline]
    pub fn get_dest(&self) -> Square {
        self.dest
    }

    /// Get the promotion piece (maybe).
    #[inline]
    pub fn get_promotion(&self) -> Option<Piece> {
        self.promotion
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.promotion {
            None => write!(f, "{}{}", self.source, self.dest),
            Some(x) => write!(f, "{}{}{}", self.source, self.dest, x),
        }
    }
}

impl FromStr for ChessMove {
    type Err = Error;

    /// Parse a move written as source square, destination square, and an
    /// optional promotion letter.
    ///
    /// ```
    /// use referee::{ChessMove, Piece, Square};
    ///
    /// let mv: ChessMove = "e7e8q".parse().expect("valid move text");
    /// assert_eq!(
    ///     mv,
    ///     ChessMove::new(
    ///         Square::make_square(6, 4),
    ///         Square::make_square(7, 4),
    ///         Some(Piece::Queen)
    ///     )
    /// );
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source: Square = s.get(0..2).ok_or(Error::InvalidUciMove)?.parse()?;
        let dest: Square = s.get(2..4).ok_or(Error::InvalidUciMove)?.parse()?;

        let promotion = match s.get(4..) {
            None | Some("") => None,
            Some("q") => Some(Piece::Queen),
            Some("r") => Some(Piece::Rook),
            Some("n") => Some(Piece::Knight),
            Some("b") => Some(Piece::Bishop),
            Some(_) => return Err(Error::InvalidUciMove),
        };

        Ok(ChessMove::new(source, dest, promotion))
    }
}

impl Ord for ChessMove {
    fn cmp(&self, other: &ChessMove) -> Ordering {
        if self.source != other.source {
            self.source.cmp(&other.source)
        } else if self.dest != other.dest {
            self.dest.cmp(&other.dest)
        } else {
            // None sorts before any promotion piece
            match (self.promotion, other.promotion) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.cmp(&y),
            }
        }
    }
}

impl PartialOrd for ChessMove {
    fn partial_cmp(&self, other: &ChessMove) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_move_text() {
        assert!("e2e-".parse::<ChessMove>().is_err());
        assert!("".parse::<ChessMove>().is_err());
        assert!("e7e8p".parse::<ChessMove>().is_err());
        assert!("e7e8z".parse::<ChessMove>().is_err());
    }

    #[test]
    fn valid_move_text() {
        assert_eq!(
            "e2e4".parse::<ChessMove>().unwrap(),
            ChessMove::new(
                Square::make_square(1, 4),
                Square::make_square(3, 4),
                None
            )
        );
        assert_eq!(
            "g1f3".parse::<ChessMove>().unwrap(),
            ChessMove::new(
                Square::make_square(0, 6),
                Square::make_square(2, 5),
                None
            )
        );
        assert_eq!("a7a8r".parse::<ChessMove>().unwrap().get_promotion(), Some(Piece::Rook));
    }

    #[test]
    fn promotions_are_distinct_moves() {
        let quiet: ChessMove = "e7e8".parse().unwrap();
        let queen: ChessMove = "e7e8q".parse().unwrap();
        let rook: ChessMove = "e7e8r".parse().unwrap();
        assert_ne!(queen, rook);
        assert_ne!(quiet, queen);
        assert!(quiet < queen);
    }
}
