use anyhow::Result;
use bench_analytics::{compare_sets, MetricSet};

use crate::cli::CompareArgs;
use crate::util::{print_json, read_json};

pub fn run(args: CompareArgs) -> Result<()> {
    let a: MetricSet = read_json(&args.a)?;
    let b: MetricSet = read_json(&args.b)?;
    print_json(&compare_sets(&a, &b))
}
