//! Neighbourhood metrics of a board.
//!
//! Every metric is computed with whole-board bit operations: the board is shifted
//! one cell in each orthogonal direction, and edge masks stop neighbours from
//! wrapping across the left or right border. Cells on the border simply have
//! fewer neighbours; an out-of-bounds neighbour is neither empty nor occupied.

use blockblast_engine::BitBoard;

const COLUMN_0: u64 = BitBoard::column(0).bits();
const COLUMN_7: u64 = BitBoard::column(7).bits();
const ROW_0: u64 = BitBoard::row(0).bits();
const ROW_7: u64 = BitBoard::row(7).bits();

/// Cells whose neighbour in one direction lies on the board.
#[derive(Debug, Clone, Copy)]
struct Direction {
    in_bounds: u64,
    /// Moves each cell's bit onto the cell that sees it as this neighbour.
    shift: fn(u64) -> u64,
}

const DIRECTIONS: [Direction; 4] = [
    // left neighbour of (x, y) is (x - 1, y)
    Direction {
        in_bounds: !COLUMN_0,
        shift: |bits| bits << 1,
    },
    // right neighbour of (x, y) is (x + 1, y)
    Direction {
        in_bounds: !COLUMN_7,
        shift: |bits| bits >> 1,
    },
    // upper neighbour of (x, y) is (x, y - 1)
    Direction {
        in_bounds: !ROW_0,
        shift: |bits| bits << 8,
    },
    // lower neighbour of (x, y) is (x, y + 1)
    Direction {
        in_bounds: !ROW_7,
        shift: |bits| bits >> 8,
    },
];

impl Direction {
    /// Cells whose neighbour in this direction is in `cells`.
    fn neighbour_in(self, cells: u64) -> u64 {
        (self.shift)(cells) & self.in_bounds
    }

    /// Cells whose neighbour in this direction is either off the board or in `cells`.
    fn neighbour_missing_or_in(self, cells: u64) -> u64 {
        !self.in_bounds | self.neighbour_in(cells)
    }
}

/// Isolation and perimeter counts of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardAnalysis {
    isolated_empty_cells: u32,
    isolated_filled_cells: u32,
    perimeter: u32,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: BitBoard) -> Self {
        let occupied = board.bits();
        let empty = !occupied;

        let mut surrounded = empty;
        let mut alone = occupied;
        let mut perimeter = 0;
        for dir in DIRECTIONS {
            surrounded &= dir.neighbour_missing_or_in(occupied);
            alone &= dir.neighbour_missing_or_in(empty);
            perimeter += (occupied & dir.neighbour_missing_or_in(empty)).count_ones();
        }

        Self {
            isolated_empty_cells: surrounded.count_ones(),
            isolated_filled_cells: alone.count_ones(),
            perimeter,
        }
    }

    /// Empty cells whose in-bounds orthogonal neighbours are all occupied.
    #[must_use]
    pub fn isolated_empty_cells(&self) -> u32 {
        self.isolated_empty_cells
    }

    /// Occupied cells whose in-bounds orthogonal neighbours are all empty.
    #[must_use]
    pub fn isolated_filled_cells(&self) -> u32 {
        self.isolated_filled_cells
    }

    /// Number of occupied-cell edges facing an empty cell or the board border.
    #[must_use]
    pub fn perimeter(&self) -> u32 {
        self.perimeter
    }
}
