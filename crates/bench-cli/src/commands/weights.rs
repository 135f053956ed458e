use anyhow::Result;
use bench_analytics::{check_integrity, equal_weights, normalize, WeightedInput};
use tracing::{info, warn};

use crate::cli::{NormalizeArgs, WeightsArgs, WeightsCommand};
use crate::util::{print_json, read_json};

pub fn run(command: WeightsCommand) -> Result<()> {
    match command {
        WeightsCommand::Normalize(args) => run_normalize(args),
        WeightsCommand::Check(args) => run_check(args),
    }
}

fn run_normalize(args: NormalizeArgs) -> Result<()> {
    let inputs: Vec<WeightedInput> = read_json(&args.inputs)?;
    let out = if args.equal { equal_weights(&inputs)? } else { normalize(&inputs)? };
    print_json(&out)
}

fn run_check(args: WeightsArgs) -> Result<()> {
    let inputs: Vec<WeightedInput> = read_json(&args.inputs)?;
    let report = check_integrity(&inputs);
    if report.passing {
        info!(total = report.total, "weights sum to 1");
    } else {
        warn!(total = report.total, "weights do not sum to 1");
    }
    print_json(&report)
}
