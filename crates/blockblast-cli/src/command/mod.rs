use std::{path::PathBuf, time::Duration};

use blockblast_evaluator::{
    board_evaluator::{PenaltyEvaluator, PenaltyWeights},
    search::SearchConfig,
};
use clap::{Parser, Subcommand};

use self::{show_weights::ShowWeightsArg, simulate::SimulateArg, solve::SolveArg};
use crate::util;

mod show_weights;
mod simulate;
mod solve;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Find the best placement of one round's three pieces
    Solve(#[clap(flatten)] SolveArg),
    /// Play rounds of randomly drawn pieces until no move is left
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the default penalty weights as JSON
    ShowWeights(#[clap(flatten)] ShowWeightsArg),
}

/// Options shared by every command that runs a search.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SearchArg {
    /// Penalty weights JSON file (defaults are used when omitted)
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Number of worker threads (defaults to the number of logical CPUs)
    #[arg(long)]
    workers: Option<usize>,
    /// Stop searching after this many milliseconds and keep the best plan so far
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

impl SearchArg {
    fn evaluator(&self) -> anyhow::Result<PenaltyEvaluator> {
        let weights = match &self.weights {
            Some(path) => util::read_weights_file(path)?,
            None => PenaltyWeights::default(),
        };
        Ok(PenaltyEvaluator::new(weights))
    }

    fn config(&self) -> SearchConfig {
        let mut config = SearchConfig::default();
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config.time_limit = self.time_limit_ms.map(Duration::from_millis);
        config
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Solve(arg) => solve::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::ShowWeights(arg) => show_weights::run(&arg)?,
    }
    Ok(())
}
