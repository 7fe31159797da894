use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{PieceShapeError, core::bit_board::BitBoard};

/// Filled cells of one row of a piece, bit `j` set for column `j`.
pub type PieceRowMask = u8;

/// Shape of a movable piece: which cells of its bounding matrix are filled.
///
/// Rows are stored as bitmasks. The matrix is at most 8×8 and rows may carry
/// trailing empty cells; `columns` keeps the declared matrix width so the shape
/// can be rendered back exactly as it was given.
///
/// # Bounds
///
/// [`PieceShape::bounds`] measures the width as the column span of the filled
/// cells (rightmost filled column + 1), so shapes with gaps or offsets such as
/// S and Z pieces never project past the right edge. Trailing empty rows and
/// columns do not count towards the width but rows always count towards the
/// height.
///
/// # Example
///
/// ```
/// use blockblast_engine::{PieceBounds, PieceShape};
///
/// let l = PieceShape::from_ascii(
///     "
///     #.
///     #.
///     ###
///     ",
/// );
/// assert_eq!(l.bounds(), PieceBounds { width: 2, height: 3 });
/// assert_eq!(l.cell_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PieceShape {
    rows: ArrayVec<PieceRowMask, { BitBoard::HEIGHT }>,
    columns: u8,
}

/// Bounding box used to enumerate anchor positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceBounds {
    pub width: usize,
    pub height: usize,
}

impl Serialize for PieceShape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: ["#.", "#.", "##"]
        serializer.collect_seq(self.text_rows())
    }
}

impl<'de> Deserialize<'de> for PieceShape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Rows {
            Text(Vec<String>),
            Cells(Vec<Vec<bool>>),
        }

        let shape = match Rows::deserialize(deserializer)? {
            Rows::Text(rows) => Self::from_text_rows(&rows),
            Rows::Cells(rows) => Self::from_rows(&rows),
        };
        shape.map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PieceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.text_rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl PieceShape {
    /// Builds a piece from a row-major boolean matrix.
    ///
    /// The matrix must be rectangular, at most 8×8 and hold at least one filled cell.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, PieceShapeError>
    where
        R: AsRef<[bool]>,
    {
        let Some(first) = rows.first() else {
            return Err(PieceShapeError::NoRows);
        };
        if rows.len() > BitBoard::HEIGHT {
            return Err(PieceShapeError::TooManyRows(rows.len()));
        }

        let columns = first.as_ref().len();
        let mut masks = ArrayVec::new();
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() > BitBoard::WIDTH {
                return Err(PieceShapeError::TooManyColumns {
                    row: i,
                    len: row.len(),
                });
            }
            if row.len() != columns {
                return Err(PieceShapeError::RaggedRow {
                    row: i,
                    len: row.len(),
                    expected: columns,
                });
            }
            let mask = row
                .iter()
                .enumerate()
                .filter(|(_, cell)| **cell)
                .fold(0_u8, |mask, (j, _)| mask | (1 << j));
            masks.push(mask);
        }

        #[expect(clippy::cast_possible_truncation)]
        let shape = Self {
            rows: masks,
            columns: columns as u8,
        };
        if shape.cell_count() == 0 {
            return Err(PieceShapeError::NoFilledCells);
        }
        Ok(shape)
    }

    /// Parses a piece from text rows, '#' for filled and '.' for empty.
    pub fn from_text_rows<S>(rows: &[S]) -> Result<Self, PieceShapeError>
    where
        S: AsRef<str>,
    {
        let cells = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .chars()
                    .map(|ch| match ch {
                        '#' => Ok(true),
                        '.' => Ok(false),
                        ch => Err(PieceShapeError::InvalidCell(ch)),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(&cells)
    }

    /// Creates a `PieceShape` from ASCII art for testing.
    /// Whitespace and blank lines are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the art does not describe a valid piece.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let rows: Vec<String> = art
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|line| !line.is_empty())
            .collect();
        match Self::from_text_rows(&rows) {
            Ok(shape) => shape,
            Err(e) => panic!("invalid piece art: {e}"),
        }
    }

    /// A `width`×`height` piece with every cell filled.
    ///
    /// # Panics
    ///
    /// Panics if either side is zero or larger than the board.
    #[must_use]
    pub fn rectangle(width: usize, height: usize) -> Self {
        assert!((1..=BitBoard::WIDTH).contains(&width));
        assert!((1..=BitBoard::HEIGHT).contains(&height));
        #[expect(clippy::cast_possible_truncation)]
        let (mask, columns) = (((1_u16 << width) - 1) as PieceRowMask, width as u8);
        Self {
            rows: (0..height).map(|_| mask).collect(),
            columns,
        }
    }

    #[must_use]
    pub fn cell_count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    /// Bounding box of the piece.
    ///
    /// Height is the row count; width is the distance from column 0 to the
    /// rightmost filled cell, inclusive.
    #[must_use]
    pub fn bounds(&self) -> PieceBounds {
        let all = self.rows.iter().fold(0_u8, |acc, row| acc | row);
        PieceBounds {
            width: (u8::BITS - all.leading_zeros()) as usize,
            height: self.rows.len(),
        }
    }

    /// Projects the piece onto an empty board with its top-left corner at `(x, y)`.
    ///
    /// No bounds are checked: cells past the right edge spill into the next row
    /// and rows past the bottom edge are dropped. Callers must keep
    /// `x + width <= 8` and `y + height <= 8`.
    #[must_use]
    pub fn project(&self, x: usize, y: usize) -> BitBoard {
        let bits = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let shift = u32::try_from((y + i) * BitBoard::WIDTH + x).ok()?;
                u64::from(*row).checked_shl(shift)
            })
            .fold(0, |acc, bits| acc | bits);
        BitBoard::from_bits(bits)
    }

    fn text_rows(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| {
            (0..usize::from(self.columns))
                .map(|x| if row & (1 << x) != 0 { '#' } else { '.' })
                .collect()
        })
    }
}
