//! A chess rules engine.
//!
//! The crate owns one job: given a position, produce the exact set of legal
//! moves for the side to move, and apply the move the caller picked.  Pins,
//! checks, castling rights, en passant and promotion are all accounted for.
//! Everything else (search, evaluation, notation, networking) belongs to the
//! caller.
//!
//! ```
//! use referee::{Board, ChessMove};
//!
//! let mut board = Board::default();
//! assert_eq!(board.legal_moves().len(), 20);
//!
//! let e4: ChessMove = "e2e4".parse().expect("valid move text");
//! board.make_move(e4);
//! assert_eq!(board.legal_moves().len(), 20);
//! ```

pub mod board;
pub mod board_builder;
pub mod castle_rights;
pub mod chess_move;
pub mod color;
pub mod direction;
pub mod error;
pub mod movegen;
pub mod piece;
pub mod square;

pub use crate::board::{Board, BoardStatus};
pub use crate::board_builder::BoardBuilder;
pub use crate::castle_rights::{CastleRights, ALL_CASTLE_RIGHTS, NUM_CASTLE_RIGHTS};
pub use crate::chess_move::ChessMove;
pub use crate::color::{Color, ALL_COLORS, NUM_COLORS};
pub use crate::direction::{
    between, Direction, BISHOP_DIRECTIONS, KNIGHT_DIRECTIONS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};
pub use crate::error::Error;
pub use crate::movegen::MoveGen;
pub use crate::piece::{Piece, ALL_PIECES, NUM_PIECES, NUM_PROMOTION_PIECES, PROMOTION_PIECES};
pub use crate::square::Square;
