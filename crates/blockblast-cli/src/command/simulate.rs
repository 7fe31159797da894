use std::path::PathBuf;

use anyhow::Context;
use blockblast_engine::{BitBoard, GameState, PieceSeed, PieceSupply};
use blockblast_evaluator::search::{NoValidMoveError, SearchOrchestrator};
use rand::Rng as _;
use serde::Serialize;

use crate::{command::SearchArg, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Maximum number of rounds to play
    #[arg(long, default_value_t = 100)]
    rounds: usize,
    /// Seed for the piece supply (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    #[clap(flatten)]
    search: SearchArg,
    /// Output file path for the JSON summary
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SimulationSummary {
    seed: PieceSeed,
    rounds: usize,
    cleared_lines: usize,
    score: i32,
    game_over: bool,
    final_board: BitBoard,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let seed = arg
        .seed
        .map_or_else(|| rand::rng().random(), PieceSeed::from_u64);
    let search = SearchOrchestrator::new(Box::new(arg.search.evaluator()?), arg.search.config());

    let summary = play(&search, seed, arg.rounds)?;

    eprintln!("Rounds played: {}", summary.rounds);
    eprintln!("Lines cleared: {}", summary.cleared_lines);
    eprintln!("Score: {}", summary.score);
    if summary.game_over {
        eprintln!("Game over: no valid move");
    }
    eprintln!("Final board:");
    eprintln!("{}", summary.final_board);

    util::write_json(&summary, arg.output.as_deref())
}

/// Plays up to `max_rounds` rounds, replaying every plan move by move.
fn play(
    search: &SearchOrchestrator<'_>,
    seed: PieceSeed,
    max_rounds: usize,
) -> anyhow::Result<SimulationSummary> {
    let mut supply = PieceSupply::with_seed(seed);
    let mut summary = SimulationSummary {
        seed,
        rounds: 0,
        cleared_lines: 0,
        score: 0,
        game_over: false,
        final_board: BitBoard::EMPTY,
    };

    while summary.rounds < max_rounds {
        let state =
            GameState::new(summary.final_board, supply.next_round()).with_score(summary.score);
        let plan = match search.find_best_moves(&state) {
            Ok(plan) => plan,
            Err(NoValidMoveError) => {
                log::info!("no valid move in round {}", summary.rounds + 1);
                summary.game_over = true;
                break;
            }
        };

        let mut current = state;
        for mv in plan.moves() {
            let placement = current
                .apply_move(*mv)
                .with_context(|| format!("Planned move collided: {mv}"))?;
            summary.cleared_lines += placement.cleared_lines().count();
            current = placement.into_state();
        }
        summary.rounds += 1;
        summary.score = current.score();
        summary.final_board = current.board();
        log::info!(
            "round {}: score {}, {} lines cleared so far",
            summary.rounds,
            summary.score,
            summary.cleared_lines
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use blockblast_evaluator::{board_evaluator::PenaltyEvaluator, search::SearchConfig};

    use super::*;

    fn search() -> SearchOrchestrator<'static> {
        SearchOrchestrator::new(
            Box::new(PenaltyEvaluator::default()),
            SearchConfig {
                workers: 4,
                time_limit: None,
            },
        )
    }

    #[test]
    fn test_same_seed_same_game() {
        let seed = PieceSeed::from_u64(3);
        let a = play(&search(), seed, 2).unwrap();
        let b = play(&search(), seed, 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rounds, 2);
        assert!(!a.game_over);
    }

    #[test]
    fn test_zero_rounds() {
        let summary = play(&search(), PieceSeed::from_u64(0), 0).unwrap();
        assert_eq!(summary.rounds, 0);
        assert_eq!(summary.final_board, BitBoard::EMPTY);
    }
}
