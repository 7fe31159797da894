use std::path::PathBuf;

use blockblast_evaluator::board_evaluator::PenaltyWeights;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShowWeightsArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ShowWeightsArg) -> anyhow::Result<()> {
    util::write_json(&PenaltyWeights::default(), arg.output.as_deref())
}
