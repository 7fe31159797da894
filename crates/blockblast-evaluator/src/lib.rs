//! Heuristic scoring and round search for the 8×8 grid-clearing puzzle.
//!
//! This crate implements a two-level architecture:
//!
//! 1. **Board Evaluation** ([`board_evaluator`]) - Scores the board left behind after a
//!    round using penalties for isolated cells and surface perimeter.
//!
//! 2. **Round Search** ([`search`]) - Tries every order and every combination of positions
//!    for the three pieces of a round on a pool of worker threads, and keeps the
//!    highest-scoring plan.
//!
//! # Architecture
//!
//! ```text
//! Round Search (select best plan)
//!     ↓ uses
//! Board Evaluation (score final board)
//!     ↓ uses
//! Board Analysis (isolation and perimeter counts)
//! ```
//!
//! # Supporting Modules
//!
//! - [`board_analysis`] - Bit-parallel neighbourhood metrics of a board
//!
//! # Example: Solving a Round
//!
//! ```
//! use blockblast_engine::{BitBoard, GameState, PieceShape};
//! use blockblast_evaluator::{
//!     board_evaluator::PenaltyEvaluator,
//!     search::{SearchConfig, SearchOrchestrator},
//! };
//!
//! let state = GameState::new(
//!     BitBoard::EMPTY,
//!     [
//!         PieceShape::rectangle(1, 1),
//!         PieceShape::rectangle(2, 1),
//!         PieceShape::rectangle(1, 2),
//!     ],
//! );
//! let evaluator = Box::new(PenaltyEvaluator::default());
//! let search = SearchOrchestrator::new(evaluator, SearchConfig::default());
//! let plan = search.find_best_moves(&state).unwrap();
//! let end = state.apply_moves(plan.moves()).unwrap();
//! assert_eq!(end.board(), plan.final_board());
//! ```

pub mod board_analysis;
pub mod board_evaluator;
pub mod search;
