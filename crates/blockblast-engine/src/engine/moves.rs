use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PIECE_COUNT, core::position::Position};

/// One placement of a round's plan: which piece slot goes where.
///
/// Moves of a plan must be replayed in order, because earlier placements may
/// clear lines that later placements rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMove")]
pub struct Move {
    piece_index: u8,
    position: Position,
}

#[derive(Deserialize)]
struct RawMove {
    piece_index: u8,
    position: Position,
}

impl TryFrom<RawMove> for Move {
    type Error = String;

    fn try_from(RawMove { piece_index, position }: RawMove) -> Result<Self, Self::Error> {
        if usize::from(piece_index) >= PIECE_COUNT {
            return Err(format!(
                "piece index {piece_index} out of range, expected < {PIECE_COUNT}"
            ));
        }
        Ok(Self {
            piece_index,
            position,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece {} at {}", self.piece_index, self.position)
    }
}

impl Move {
    /// # Panics
    ///
    /// Panics if `piece_index` is not a valid piece slot.
    #[must_use]
    pub fn new(piece_index: usize, position: Position) -> Self {
        assert!(piece_index < PIECE_COUNT);
        #[expect(clippy::cast_possible_truncation)]
        let piece_index = piece_index as u8;
        Self {
            piece_index,
            position,
        }
    }

    #[must_use]
    pub fn piece_index(self) -> usize {
        usize::from(self.piece_index)
    }

    #[must_use]
    pub fn position(self) -> Position {
        self.position
    }
}
