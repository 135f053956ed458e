use std::collections::BTreeSet;

use anyhow::Result;
use bench_analytics::{aggregate, summarize, DatasetFilter, MeasurementRecord, SeriesFilter};
use tracing::info;

use crate::cli::{SummaryArgs, TrendsArgs};
use crate::util::{print_json, read_json};

pub fn run_trends(args: TrendsArgs) -> Result<()> {
    let records: Vec<MeasurementRecord> = read_json(&args.records)?;
    let filter = SeriesFilter::all().with_subjects(args.subjects)
                                    .with_dataset(DatasetFilter::from(args.dataset));
    let rows = aggregate(&records, &filter);
    info!(records = records.len(), rows = rows.len(), "trend rows built");
    print_json(&rows)
}

pub fn run_summary(args: SummaryArgs) -> Result<()> {
    let records: Vec<MeasurementRecord> = read_json(&args.records)?;
    let subjects: BTreeSet<String> = args.subjects.into_iter().collect();
    print_json(&summarize(&records, &subjects)?)
}
