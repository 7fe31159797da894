pub use self::{bit_board::*, piece::*, position::*};

pub(crate) mod bit_board;
pub(crate) mod piece;
pub(crate) mod position;
