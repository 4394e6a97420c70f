use std::fmt;
use std::ops::Not;

/// Represent a color.
#[derive(PartialOrd, Ord, PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    White,
    Black,
}

/// How many colors are there?
pub const NUM_COLORS: usize = 2;
/// List all colors
pub const ALL_COLORS: [Color; NUM_COLORS] = [Color::White, Color::Black];

impl Color {
    /// Convert the `Color` to a `usize` for table lookups.
    #[inline]
    pub fn to_index(&self) -> usize {
        *self as usize
    }

    /// The row my pieces start on (row 0 for White, row 7 for Black).
    #[inline]
    pub fn to_my_backrank(&self) -> u8 {
        match *self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// The row my opponent's pieces start on.  Also the row my pawns promote
    /// on.
    #[inline]
    pub fn to_their_backrank(&self) -> u8 {
        match *self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// The row my pawns start on, from which they may advance two squares.
    #[inline]
    pub fn to_second_rank(&self) -> u8 {
        match *self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// The row delta a pawn of this color moves by (+1 for White, -1 for
    /// Black).
    #[inline]
    pub fn forward_delta(&self) -> i8 {
        match *self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl Not for Color {
    type Output = Color;

    /// Get the other color.
    #[inline]
    fn not(self) -> Color {
        if self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Color::White => "White",
                Color::Black => "Black",
            }
        )
    }
}
