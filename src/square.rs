use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Represent a square on the chess board as a (row, col) pair.
///
/// Row 0 is rank 1 (White's first rank) and col 0 is file a.  Squares order
/// by `8 * row + col`, which makes them usable as map and set keys with a
/// stable board-scan (row-major) order.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Square {
    row: u8,
    col: u8,
}

/// How many squares are there?
pub const NUM_SQUARES: usize = 64;

impl Square {
    /// Make a square given a row and a col.
    /// Note: It is invalid, but allowed, to pass in a row or col >= 8.  Doing
    /// so will crash stuff.
    #[inline]
    pub fn make_square(row: u8, col: u8) -> Square {
        debug_assert!(row < 8 && col < 8);
        Square { row, col }
    }

    /// Return the row (0 = rank 1) of this square.
    #[inline]
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Return the col (0 = file a) of this square.
    #[inline]
    pub fn col(&self) -> u8 {
        self.col
    }

    /// Convert this `Square` to a `usize` between 0 and 63 for table lookup
    /// purposes.
    #[inline]
    pub fn to_index(&self) -> usize {
        (self.row as usize) * 8 + (self.col as usize)
    }

    /// The square offset from me by (`row_delta`, `col_delta`), or `None` if
    /// that square is off the board.
    #[inline]
    pub fn try_offset(&self, row_delta: i8, col_delta: i8) -> Option<Square> {
        let row = self.row as i8 + row_delta;
        let col = self.col as i8 + col_delta;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Iterate every square on the board in board-scan (row-major) order:
    /// a1, b1, ..., h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|row| (0..8).map(move |col| Square { row, col }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.col) as char,
            (b'1' + self.row) as char
        )
    }
}

impl FromStr for Square {
    type Err = Error;

    /// Parse a square from its algebraic name.
    ///
    /// ```
    /// use referee::Square;
    ///
    /// let sq: Square = "e4".parse().expect("valid square");
    /// assert_eq!(sq, Square::make_square(3, 4));
    /// assert!("j9".parse::<Square>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file = chars.next().ok_or(Error::InvalidSquare)?;
        let rank = chars.next().ok_or(Error::InvalidSquare)?;
        if chars.next().is_some() {
            return Err(Error::InvalidSquare);
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(Error::InvalidSquare);
        }
        Ok(Square::make_square(rank as u8 - b'1', file as u8 - b'a'))
    }
}
