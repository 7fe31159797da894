//! Board model and placement rules for an 8×8 grid-clearing puzzle.
//!
//! - [`core`] - compact board and piece representations ([`BitBoard`], [`PieceShape`])
//! - [`engine`] - game state and placement rules ([`GameState`], [`Move`], [`PieceSupply`])

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Number of pieces offered per round.
pub const PIECE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece collides with occupied cells")]
pub struct PieceCollisionError;

#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum PieceShapeError {
    #[display("piece has no rows")]
    NoRows,
    #[display("piece has no filled cells")]
    NoFilledCells,
    #[display("piece has {_0} rows, at most {} allowed", BitBoard::HEIGHT)]
    TooManyRows(#[error(not(source))] usize),
    #[display("piece row {row} has {len} columns, at most {} allowed", BitBoard::WIDTH)]
    TooManyColumns { row: usize, len: usize },
    #[display("piece row {row} has {len} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[display("invalid cell character {_0:?}, expected '#' or '.'")]
    InvalidCell(#[error(not(source))] char),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece seed {_0:?}, expected 32 hex digits")]
pub struct PieceSeedError(#[error(not(source))] pub(crate) String);

#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum BoardShapeError {
    #[display("board has {_0} rows, expected {}", BitBoard::HEIGHT)]
    RowCount(#[error(not(source))] usize),
    #[display("board row {row} has {len} columns, expected {}", BitBoard::WIDTH)]
    ColumnCount { row: usize, len: usize },
    #[display("invalid cell character {_0:?}, expected '#' or '.'")]
    InvalidCell(#[error(not(source))] char),
}
