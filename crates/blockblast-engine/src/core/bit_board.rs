use std::fmt;

use serde::{Deserialize, Serialize};

use crate::BoardShapeError;

const WIDTH: usize = 8;
const HEIGHT: usize = 8;

// Row 0 (y=0): bits 0-7
const ROW_MASK: u64 = 0xff;
// Column 0 (x=0): bits 0, 8, 16, ..., 56
const COLUMN_MASK: u64 = 0x0101_0101_0101_0101;

/// Occupancy of the 8×8 board packed into a single `u64`.
///
/// # Bit Layout
///
/// Bit `y * 8 + x` is set when cell `(x, y)` is occupied. `(0, 0)` is the
/// top-left cell, x grows rightward and y grows downward:
///
/// ```text
///        x=0 x=1 ... x=7
///  y=0     0   1 ...   7
///  y=1     8   9 ...  15
///  ...
///  y=7    56  57 ...  63
/// ```
///
/// Boards are plain values. Every operation that changes occupancy returns a new
/// board and leaves `self` untouched.
///
/// # Example
///
/// ```
/// use blockblast_engine::BitBoard;
///
/// let board = BitBoard::EMPTY.filled(BitBoard::row(0));
/// let lines = board.filled_lines();
/// assert_eq!(lines.count(), 1);
/// assert_eq!(board.cleared(lines), BitBoard::EMPTY);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard {
    bits: u64,
}

impl Serialize for BitBoard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "00000000000000ff" (16 hex digits, bit 0 is the least significant)
        serializer.serialize_str(&format!("{:016x}", self.bits))
    }
}

impl<'de> Deserialize<'de> for BitBoard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() != 16 {
            return Err(serde::de::Error::custom(format!(
                "expected 16 hex digits, got {} ({s})",
                s.len()
            )));
        }
        let bits = u64::from_str_radix(&s, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid board hex: {s} ({e})")))?;
        Ok(BitBoard { bits })
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let ch = if self.is_occupied(x, y) { '#' } else { '.' };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl BitBoard {
    pub const WIDTH: usize = WIDTH;
    pub const HEIGHT: usize = HEIGHT;

    pub const EMPTY: Self = Self { bits: 0 };
    pub const FULL: Self = Self { bits: u64::MAX };

    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.bits
    }

    /// Mask of every cell in row `y`.
    #[must_use]
    pub const fn row(y: usize) -> Self {
        Self {
            bits: ROW_MASK << (y * WIDTH),
        }
    }

    /// Mask of every cell in column `x`.
    #[must_use]
    pub const fn column(x: usize) -> Self {
        Self {
            bits: COLUMN_MASK << x,
        }
    }

    /// Mask with the single cell `(x, y)` set.
    #[must_use]
    pub const fn cell(x: usize, y: usize) -> Self {
        Self {
            bits: 1 << (y * WIDTH + x),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub fn is_occupied(self, x: usize, y: usize) -> bool {
        self.bits & Self::cell(x, y).bits != 0
    }

    /// Number of occupied cells.
    #[inline]
    #[must_use]
    pub fn count_occupied(self) -> u32 {
        self.bits.count_ones()
    }

    /// Checks if any cell of `mask` is already occupied.
    #[inline]
    #[must_use]
    pub fn is_colliding(self, mask: BitBoard) -> bool {
        self.bits & mask.bits != 0
    }

    /// Returns true when every cell of `mask` is occupied.
    #[inline]
    #[must_use]
    pub fn contains(self, mask: BitBoard) -> bool {
        self.bits & mask.bits == mask.bits
    }

    /// Returns a board with the cells of `mask` occupied.
    #[inline]
    #[must_use]
    pub fn filled(self, mask: BitBoard) -> Self {
        Self {
            bits: self.bits | mask.bits,
        }
    }

    /// Collects every row and column whose 8 cells are all occupied.
    #[must_use]
    pub fn filled_lines(self) -> FilledLines {
        let mut lines = FilledLines::default();
        for i in 0..HEIGHT {
            if self.contains(Self::row(i)) {
                lines.rows |= 1 << i;
            }
            if self.contains(Self::column(i)) {
                lines.columns |= 1 << i;
            }
        }
        lines
    }

    /// Returns a board with all cells of `lines` emptied.
    ///
    /// A cell on both a cleared row and a cleared column is removed once.
    #[must_use]
    pub fn cleared(self, lines: FilledLines) -> Self {
        Self {
            bits: self.bits & !lines.mask().bits,
        }
    }

    /// Builds a board from a row-major boolean grid.
    ///
    /// The grid must be exactly 8 rows of 8 cells.
    pub fn from_grid<R>(grid: &[R]) -> Result<Self, BoardShapeError>
    where
        R: AsRef<[bool]>,
    {
        if grid.len() != HEIGHT {
            return Err(BoardShapeError::RowCount(grid.len()));
        }
        let mut board = Self::EMPTY;
        for (y, row) in grid.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != WIDTH {
                return Err(BoardShapeError::ColumnCount {
                    row: y,
                    len: row.len(),
                });
            }
            for (x, _) in row.iter().enumerate().filter(|(_, cell)| **cell) {
                board = board.filled(Self::cell(x, y));
            }
        }
        Ok(board)
    }

    /// Parses a board from text rows, '#' for occupied and '.' for empty.
    pub fn from_rows<S>(rows: &[S]) -> Result<Self, BoardShapeError>
    where
        S: AsRef<str>,
    {
        let grid = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .chars()
                    .map(|ch| match ch {
                        '#' => Ok(true),
                        '.' => Ok(false),
                        ch => Err(BoardShapeError::InvalidCell(ch)),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_grid(&grid)
    }

    /// Converts the board back into a row-major boolean grid.
    #[must_use]
    pub fn to_grid(self) -> [[bool; WIDTH]; HEIGHT] {
        let mut grid = [[false; WIDTH]; HEIGHT];
        for (y, row) in grid.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.is_occupied(x, y);
            }
        }
        grid
    }

    /// Creates a `BitBoard` from ASCII art representation for testing.
    /// '#' represents an occupied cell, '.' represents an empty cell.
    /// Whitespace and blank lines are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the art is not 8 rows of 8 cells.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let rows: Vec<String> = art
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|line| !line.is_empty())
            .collect();
        match Self::from_rows(&rows) {
            Ok(board) => board,
            Err(e) => panic!("invalid board art: {e}"),
        }
    }
}

/// Full rows and columns found on a board, one bit per line index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilledLines {
    rows: u8,
    columns: u8,
}

impl FilledLines {
    /// Bitmask of full rows (bit `y` set when row `y` is full).
    #[must_use]
    pub fn rows(self) -> u8 {
        self.rows
    }

    /// Bitmask of full columns (bit `x` set when column `x` is full).
    #[must_use]
    pub fn columns(self) -> u8 {
        self.columns
    }

    /// Total number of full lines, rows and columns together.
    #[must_use]
    pub fn count(self) -> usize {
        (self.rows.count_ones() + self.columns.count_ones()) as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.rows == 0 && self.columns == 0
    }

    /// Union of every cell on a full line.
    #[must_use]
    pub fn mask(self) -> BitBoard {
        let mut mask = BitBoard::EMPTY;
        for i in 0..HEIGHT {
            if self.rows & (1 << i) != 0 {
                mask = mask.filled(BitBoard::row(i));
            }
            if self.columns & (1 << i) != 0 {
                mask = mask.filled(BitBoard::column(i));
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_bit_layout() {
        assert_eq!(BitBoard::cell(0, 0).bits(), 1);
        assert_eq!(BitBoard::cell(7, 0).bits(), 1 << 7);
        assert_eq!(BitBoard::cell(0, 1).bits(), 1 << 8);
        assert_eq!(BitBoard::cell(7, 7).bits(), 1 << 63);
    }

    #[test]
    fn test_row_and_column_masks() {
        for i in 0..8 {
            assert_eq!(BitBoard::row(i).count_occupied(), 8);
            assert_eq!(BitBoard::column(i).count_occupied(), 8);
            for j in 0..8 {
                assert!(BitBoard::row(i).is_occupied(j, i));
                assert!(BitBoard::column(i).is_occupied(i, j));
            }
        }
    }

    #[test]
    fn test_from_ascii() {
        let board = BitBoard::from_ascii(
            r"
            #.......
            .#......
            ........
            ........
            ........
            ........
            ........
            .......#
            ",
        );
        assert!(board.is_occupied(0, 0));
        assert!(board.is_occupied(1, 1));
        assert!(board.is_occupied(7, 7));
        assert_eq!(board.count_occupied(), 3);
    }

    #[test]
    fn test_from_grid_rejects_wrong_dimensions() {
        let short = vec![vec![false; 8]; 7];
        assert_eq!(
            BitBoard::from_grid(&short),
            Err(BoardShapeError::RowCount(7))
        );

        let mut ragged = vec![vec![false; 8]; 8];
        ragged[3].push(true);
        assert_eq!(
            BitBoard::from_grid(&ragged),
            Err(BoardShapeError::ColumnCount { row: 3, len: 9 })
        );
    }

    #[test]
    fn test_grid_conversion() {
        let mut grid = [[false; 8]; 8];
        grid[2][5] = true;
        grid[6][0] = true;
        let board = BitBoard::from_grid(&grid).unwrap();
        assert!(board.is_occupied(5, 2));
        assert!(board.is_occupied(0, 6));
        assert_eq!(board.to_grid(), grid);
    }

    #[test]
    fn test_filled_lines_detects_rows_and_columns() {
        let board = BitBoard::row(2).filled(BitBoard::column(5));
        let lines = board.filled_lines();
        assert_eq!(lines.rows(), 0b0000_0100);
        assert_eq!(lines.columns(), 0b0010_0000);
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_cleared_removes_intersection_once() {
        let board = BitBoard::row(0)
            .filled(BitBoard::column(0))
            .filled(BitBoard::cell(4, 4));
        let cleared = board.cleared(board.filled_lines());
        assert_eq!(cleared, BitBoard::cell(4, 4));
    }

    #[test]
    fn test_clear_full_board() {
        let lines = BitBoard::FULL.filled_lines();
        assert_eq!(lines.count(), 16);
        assert_eq!(BitBoard::FULL.cleared(lines), BitBoard::EMPTY);
    }

    #[test]
    fn test_partial_line_is_not_filled() {
        let board = BitBoard::from_bits(BitBoard::row(0).bits() & !BitBoard::cell(3, 0).bits());
        assert!(board.filled_lines().is_empty());
    }

    #[test]
    fn test_display() {
        let board = BitBoard::cell(1, 0).filled(BitBoard::cell(0, 7));
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], ".#......");
        assert_eq!(lines[7], "#.......");
    }

    #[test]
    fn test_bit_board_serialization() {
        let board = BitBoard::row(0).filled(BitBoard::cell(7, 7));
        let serialized = serde_json::to_string(&board).unwrap();
        assert_eq!(serialized, "\"80000000000000ff\"");

        let deserialized: BitBoard = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);

        assert!(serde_json::from_str::<BitBoard>("\"ff\"").is_err());
        assert!(serde_json::from_str::<BitBoard>("\"zz000000000000ff\"").is_err());
    }
}
