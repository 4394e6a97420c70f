use failure::Fail;

/// Sometimes, bad stuff happens.
#[derive(Clone, Debug, Fail)]
pub enum Error {
    /// The board created from a `BoardBuilder` was found to be invalid
    #[fail(
        display = "The board specified did not pass sanity checks.  Are you sure the kings exist and the side to move cannot capture the opposing king?"
    )]
    InvalidBoard,

    /// The string specified does not name a square on the board
    #[fail(display = "The string specified does not contain a valid square")]
    InvalidSquare,

    /// The string specified does not contain a valid move
    #[fail(display = "The string specified does not contain a valid move")]
    InvalidUciMove,
}
