use std::fmt;

use serde::{Deserialize, Serialize};

use super::bit_board::BitBoard;

/// Top-left anchor of a piece's bounding box on the board.
///
/// # Coordinate System
///
/// - (0, 0) is the top-left cell
/// - X increases rightward (columns)
/// - Y increases downward (rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    x: u8,
    y: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    x: u8,
    y: u8,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(RawPosition { x, y }: RawPosition) -> Result<Self, Self::Error> {
        if usize::from(x) >= BitBoard::WIDTH || usize::from(y) >= BitBoard::HEIGHT {
            return Err(format!("position ({x}, {y}) is outside the board"));
        }
        Ok(Self { x, y })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Position {
    pub const ORIGIN: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!((x as usize) < BitBoard::WIDTH);
        assert!((y as usize) < BitBoard::HEIGHT);
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> usize {
        usize::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> usize {
        usize::from(self.y)
    }
}
