use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::IndexedRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{PIECE_COUNT, PieceSeedError, core::piece::PieceShape};

/// Shapes offered by the random supply, one entry per orientation.
const CATALOG: &[&[&str]] = &[
    // singles and bars
    &["#"],
    &["##"],
    &["###"],
    &["####"],
    &["#####"],
    &["#", "#"],
    &["#", "#", "#"],
    &["#", "#", "#", "#"],
    &["#", "#", "#", "#", "#"],
    // rectangles
    &["##", "##"],
    &["###", "###"],
    &["##", "##", "##"],
    &["###", "###", "###"],
    // small corners
    &["##", "#."],
    &["##", ".#"],
    &["#.", "##"],
    &[".#", "##"],
    // L and J
    &["#.", "#.", "##"],
    &[".#", ".#", "##"],
    &["##", "#.", "#."],
    &["##", ".#", ".#"],
    &["###", "#.."],
    &["###", "..#"],
    &["#..", "###"],
    &["..#", "###"],
    // big corners
    &["###", "#..", "#.."],
    &["###", "..#", "..#"],
    &["#..", "#..", "###"],
    &["..#", "..#", "###"],
    // T
    &["###", ".#."],
    &[".#.", "###"],
    &["#.", "##", "#."],
    &[".#", "##", ".#"],
    // S and Z
    &[".##", "##."],
    &["##.", ".##"],
    &["#.", "##", ".#"],
    &[".#", "##", "#."],
];

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the piece supply's random number generator. The same seed
/// always yields the same sequence of rounds, which makes simulations
/// reproducible.
///
/// # Example
///
/// ```
/// use blockblast_engine::{PieceSeed, PieceSupply};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
///
/// let mut a = PieceSupply::with_seed(seed);
/// let mut b = PieceSupply::with_seed(seed);
/// assert_eq!(a.next_round(), b.next_round());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PieceSeed(u128);

impl PieceSeed {
    /// Expands a small integer into a full seed.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(u128::from(value))
    }
}

/// Written as 32 lowercase hex digits.
impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for PieceSeed {
    type Err = PieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PieceSeedError(s.to_owned());
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u128::from_str_radix(s, 16).map(Self).map_err(|_| invalid())
    }
}

impl From<PieceSeed> for String {
    fn from(seed: PieceSeed) -> Self {
        seed.to_string()
    }
}

impl TryFrom<String> for PieceSeed {
    type Error = PieceSeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        PieceSeed(rng.random())
    }
}

/// Random source of rounds, three pieces at a time.
///
/// Stands in for the real game when running self-play simulations: every piece
/// of a round is drawn uniformly from a fixed catalog of shapes.
#[derive(Debug, Clone)]
pub struct PieceSupply {
    rng: Pcg32,
    catalog: Vec<PieceShape>,
}

impl Default for PieceSupply {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceSupply {
    /// Creates a piece supply with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic rounds.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let catalog = CATALOG
            .iter()
            .map(|rows| {
                PieceShape::from_text_rows(*rows).expect("catalog shapes should be valid")
            })
            .collect();
        Self {
            rng: Pcg32::from_seed(seed.0.to_be_bytes()),
            catalog,
        }
    }

    /// All shapes this supply can offer.
    #[must_use]
    pub fn catalog(&self) -> &[PieceShape] {
        &self.catalog
    }

    /// Draws the three pieces of the next round.
    pub fn next_round(&mut self) -> [PieceShape; PIECE_COUNT] {
        std::array::from_fn(|_| {
            self.catalog
                .choose(&mut self.rng)
                .cloned()
                .expect("catalog should never be empty")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shapes_are_distinct() {
        let supply = PieceSupply::with_seed(PieceSeed::from_u64(0));
        let catalog = supply.catalog();
        assert_eq!(catalog.len(), CATALOG.len());
        for (i, a) in catalog.iter().enumerate() {
            for b in &catalog[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_same_seed_same_rounds() {
        let seed = PieceSeed::from_u64(42);
        let mut a = PieceSupply::with_seed(seed);
        let mut b = PieceSupply::with_seed(seed);
        for _ in 0..10 {
            assert_eq!(a.next_round(), b.next_round());
        }
    }

    #[test]
    fn test_rounds_come_from_catalog() {
        let mut supply = PieceSupply::with_seed(PieceSeed::from_u64(7));
        for _ in 0..20 {
            for piece in supply.next_round() {
                assert!(supply.catalog().contains(&piece));
            }
        }
    }

    #[test]
    fn test_seed_serialization() {
        let seed = PieceSeed::from_u64(0xabc);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"00000000000000000000000000000abc\"");
        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);
        assert!(serde_json::from_str::<PieceSeed>("\"abc\"").is_err());
        assert!(serde_json::from_str::<PieceSeed>("\"+0000000000000000000000000000abc\"").is_err());
    }

    #[test]
    fn test_seed_text_form() {
        let seed: PieceSeed = "0123456789abcdef0123456789ABCDEF".parse().unwrap();
        assert_eq!(seed.to_string(), "0123456789abcdef0123456789abcdef");
        assert_eq!(
            "xyz".parse::<PieceSeed>().unwrap_err(),
            PieceSeedError("xyz".to_owned())
        );
    }
}
