use std::sync::Arc;

use crate::{
    PIECE_COUNT, PieceCollisionError,
    core::{
        bit_board::{BitBoard, FilledLines},
        piece::PieceShape,
        position::Position,
    },
};

use super::moves::Move;

/// Bonus for the k-th line cleared by a single placement is `LINE_CLEAR_BONUS * k`.
pub const LINE_CLEAR_BONUS: i32 = 50;

/// Total bonus for clearing `lines` lines with one placement.
///
/// The k-th line (rows first, then columns, each in ascending order) adds
/// `50 * k`, so one line gives 50, two give 150, three give 300.
#[must_use]
pub fn line_clear_bonus(lines: usize) -> i32 {
    (1..).take(lines).map(|k: i32| LINE_CLEAR_BONUS * k).sum()
}

/// Board, the pieces of the current round and the running score.
///
/// Piece identity is positional: index `i` always refers to the `i`-th piece
/// slot of the round. The piece triple is shared read-only between every state
/// derived from the same round, so cloning a `GameState` only copies the board
/// and the score.
///
/// # Example
///
/// ```
/// use blockblast_engine::{BitBoard, GameState, PieceShape, Position};
///
/// let dot = PieceShape::rectangle(1, 1);
/// let state = GameState::new(BitBoard::EMPTY, [dot.clone(), dot.clone(), dot]);
///
/// let placed = state.place(&state.pieces()[0], Position::new(2, 3)).unwrap();
/// assert!(placed.board().is_occupied(2, 3));
/// assert!(state.board().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: BitBoard,
    pieces: Arc<[PieceShape; PIECE_COUNT]>,
    score: i32,
}

/// Outcome of a single successful placement.
#[derive(Debug, Clone)]
pub struct Placement {
    state: GameState,
    cleared_lines: FilledLines,
}

impl Placement {
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Rows and columns removed by this placement.
    #[must_use]
    pub fn cleared_lines(&self) -> FilledLines {
        self.cleared_lines
    }
}

impl GameState {
    #[must_use]
    pub fn new(board: BitBoard, pieces: [PieceShape; PIECE_COUNT]) -> Self {
        Self {
            board,
            pieces: Arc::new(pieces),
            score: 0,
        }
    }

    /// Returns the same state with the score replaced.
    #[must_use]
    pub fn with_score(self, score: i32) -> Self {
        Self { score, ..self }
    }

    #[must_use]
    pub fn board(&self) -> BitBoard {
        self.board
    }

    #[must_use]
    pub fn pieces(&self) -> &[PieceShape; PIECE_COUNT] {
        &self.pieces
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Places `piece` with its top-left corner at `position`.
    ///
    /// Full rows and columns are cleared afterwards and the line-clear bonus is
    /// added to the returned state. `self` is never modified.
    ///
    /// The caller must make sure the piece fits inside the board at `position`
    /// (see [`PieceShape::bounds`]).
    pub fn place(
        &self,
        piece: &PieceShape,
        position: Position,
    ) -> Result<Self, PieceCollisionError> {
        self.place_with_lines(piece, position).map(Placement::into_state)
    }

    /// Like [`Self::place`], but also reports which lines were cleared.
    pub fn place_with_lines(
        &self,
        piece: &PieceShape,
        position: Position,
    ) -> Result<Placement, PieceCollisionError> {
        let mask = piece.project(position.x(), position.y());
        if self.board.is_colliding(mask) {
            return Err(PieceCollisionError);
        }

        let board = self.board.filled(mask);
        let cleared_lines = board.filled_lines();
        let state = Self {
            board: board.cleared(cleared_lines),
            pieces: Arc::clone(&self.pieces),
            score: self.score + line_clear_bonus(cleared_lines.count()),
        };
        Ok(Placement {
            state,
            cleared_lines,
        })
    }

    /// Places the piece referenced by `mv`.
    pub fn apply_move(&self, mv: Move) -> Result<Placement, PieceCollisionError> {
        self.place_with_lines(&self.pieces[mv.piece_index()], mv.position())
    }

    /// Replays `moves` in order and returns the final state.
    pub fn apply_moves(&self, moves: &[Move]) -> Result<Self, PieceCollisionError> {
        moves
            .iter()
            .try_fold(self.clone(), |state, mv| {
                state.apply_move(*mv).map(Placement::into_state)
            })
    }
}
