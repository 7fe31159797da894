use anyhow::Context;
use blockblast_engine::{BitBoard, GameState, PIECE_COUNT, PieceShape};
use serde::Deserialize;

/// One round as handed over by the screen reader: the board and the three offered pieces.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundFile {
    pub board: BoardGrid,
    pub pieces: Vec<PieceShape>,
    /// Score carried into the round.
    #[serde(default)]
    pub score: i32,
}

/// Board occupancy, either as `#`/`.` rows or as a boolean matrix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoardGrid {
    Text(Vec<String>),
    Cells(Vec<Vec<bool>>),
}

impl BoardGrid {
    pub fn to_board(&self) -> anyhow::Result<BitBoard> {
        let board = match self {
            BoardGrid::Text(rows) => BitBoard::from_rows(rows.as_slice()),
            BoardGrid::Cells(rows) => BitBoard::from_grid(rows.as_slice()),
        };
        Ok(board?)
    }
}

impl RoundFile {
    pub fn to_state(&self) -> anyhow::Result<GameState> {
        let board = self.board.to_board().context("Invalid board")?;
        let pieces: [PieceShape; PIECE_COUNT] =
            self.pieces.clone().try_into().map_err(|pieces: Vec<_>| {
                anyhow::anyhow!("Expected {PIECE_COUNT} pieces, got {}", pieces.len())
            })?;
        Ok(GameState::new(board, pieces).with_score(self.score))
    }
}
