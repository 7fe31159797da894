//! Board evaluation: scoring the board left behind by a round.
//!
//! A [`BoardEvaluator`] turns a final board into a score delta that the search
//! adds to the line-clear bonuses collected while placing the pieces. Higher is
//! better.
//!
//! # Penalty Model
//!
//! [`PenaltyEvaluator`] only ever subtracts. It penalizes three things measured
//! by [`BoardAnalysis`]:
//!
//! - **Isolated empty cells** - holes boxed in on every in-bounds side, hard to fill later
//! - **Isolated filled cells** - lone blocks with no occupied neighbour
//! - **Perimeter** - edges between occupied cells and empty cells or the border
//!
//! ```text
//! delta = -(w_empty · isolated_empty + w_filled · isolated_filled + w_perimeter · perimeter)
//! ```
//!
//! A small perimeter means the blocks are packed together, which keeps large
//! empty areas free for the next round.
//!
//! # Usage
//!
//! ```
//! use blockblast_engine::BitBoard;
//! use blockblast_evaluator::board_evaluator::{BoardEvaluator, PenaltyEvaluator};
//!
//! let evaluator = PenaltyEvaluator::default();
//! // a lone block: isolated (10) and four perimeter edges (4)
//! assert_eq!(evaluator.evaluate_board(BitBoard::cell(3, 3)), -14);
//! ```

use std::fmt;

use blockblast_engine::BitBoard;
use serde::{Deserialize, Serialize};

use crate::board_analysis::BoardAnalysis;

/// Scores a board after all placements of a round.
///
/// Implementations must be pure: the same board always gets the same score.
pub trait BoardEvaluator: fmt::Debug + Send + Sync {
    /// Returns the score delta for `board` (higher is better).
    fn evaluate_board(&self, board: BitBoard) -> i32;
}

/// Per-unit penalties used by [`PenaltyEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Cost of an empty cell whose neighbours are all occupied.
    pub isolated_empty_cell: i32,
    /// Cost of an occupied cell whose neighbours are all empty.
    pub isolated_filled_cell: i32,
    /// Cost of one perimeter edge.
    pub perimeter_edge: i32,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            isolated_empty_cell: 5,
            isolated_filled_cell: 10,
            perimeter_edge: 1,
        }
    }
}

/// Penalizes isolated cells and the surface perimeter of the board.
#[derive(Debug, Clone, Default)]
pub struct PenaltyEvaluator {
    weights: PenaltyWeights,
}

impl PenaltyEvaluator {
    #[must_use]
    pub fn new(weights: PenaltyWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &PenaltyWeights {
        &self.weights
    }

    /// Penalty for an already computed analysis.
    #[must_use]
    pub fn evaluate_analysis(&self, analysis: &BoardAnalysis) -> i32 {
        let weighted = |count: u32, weight: i32| {
            i32::try_from(count)
                .unwrap_or(i32::MAX)
                .saturating_mul(weight)
        };
        let weights = &self.weights;
        let empty = weighted(analysis.isolated_empty_cells(), weights.isolated_empty_cell);
        let filled = weighted(analysis.isolated_filled_cells(), weights.isolated_filled_cell);
        let perimeter = weighted(analysis.perimeter(), weights.perimeter_edge);
        empty
            .saturating_add(filled)
            .saturating_add(perimeter)
            .saturating_neg()
    }
}

impl BoardEvaluator for PenaltyEvaluator {
    #[inline]
    fn evaluate_board(&self, board: BitBoard) -> i32 {
        self.evaluate_analysis(&BoardAnalysis::from_board(board))
    }
}
