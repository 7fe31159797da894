//! Game state and placement rules.
//!
//! - [`GameState`] - board, the round's three pieces and the running score
//! - [`Placement`] - result of placing one piece (new state and cleared lines)
//! - [`Move`] - a piece slot and the position it goes to
//! - [`PieceSupply`] - seeded random source of rounds for self-play
//!
//! # Round Flow
//!
//! 1. Build a [`GameState`] from the observed board and the three offered pieces
//! 2. Choose three [`Move`]s (see the `blockblast-evaluator` crate)
//! 3. Replay them in order with [`GameState::apply_moves`]
//!
//! Each placement clears every full row and column and adds the line-clear
//! bonus from [`line_clear_bonus`] to the state it returns.

pub use self::{game_state::*, moves::*, piece_supply::*};

mod game_state;
mod moves;
mod piece_supply;
