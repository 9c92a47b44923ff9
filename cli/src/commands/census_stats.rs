use anyhow::{Context, Result};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CensusStatsArgs) -> Result<()> {
    let tracts = super::load_tracts(&args.tracts)?
        .context("[census-stats] --tracts is required")?;

    let summary = tracts.summary()?;
    println!("{:<32} {:>14} {:>14} {:>14} {:>14} {:>14}", "column", "mean", "median", "std", "min", "max");
    for column in &summary {
        let cell = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        println!(
            "{:<32} {:>14} {:>14} {:>14} {:>14} {:>14}",
            column.column, cell(column.mean), cell(column.median), cell(column.std), cell(column.min), cell(column.max)
        );
    }

    Ok(())
}
