use std::path::PathBuf;

use anyhow::Context;
use blockblast_evaluator::search::SearchOrchestrator;

use crate::{command::SearchArg, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SolveArg {
    /// Round JSON file with the board and the three offered pieces
    round: PathBuf,
    #[clap(flatten)]
    search: SearchArg,
    /// Output file path for the JSON plan
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SolveArg) -> anyhow::Result<()> {
    let state = util::read_round_file(&arg.round)?
        .to_state()
        .with_context(|| format!("Invalid round file: {}", arg.round.display()))?;
    let search = SearchOrchestrator::new(Box::new(arg.search.evaluator()?), arg.search.config());

    eprintln!("Board:");
    eprintln!("{}", state.board());
    for (i, piece) in state.pieces().iter().enumerate() {
        eprintln!("Piece {i}:");
        eprintln!("{piece}");
    }

    let plan = search
        .find_best_moves(&state)
        .context("Failed to place all pieces of the round")?;

    eprintln!("Moves:");
    for (i, mv) in plan.moves().iter().enumerate() {
        eprintln!("  {}. {mv}", i + 1);
    }
    eprintln!("Score: {}", plan.score());
    if plan.stats().timed_out {
        eprintln!(
            "Time limit reached after {} of {} candidates",
            plan.stats().evaluated_jobs,
            plan.stats().total_jobs
        );
    }
    eprintln!("Final board:");
    eprintln!("{}", plan.final_board());

    util::write_json(&plan, arg.output.as_deref())
}
