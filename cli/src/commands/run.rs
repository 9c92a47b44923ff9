use std::path::PathBuf;

use anyhow::{Context, Result};
use dronedemand::{io, PipelineConfig, RuleSet};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let out_path = &args.output.clone().unwrap_or_else(|| PathBuf::from("./demand.geojson"));

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("[run] failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(hour) = args.hour { config.demand.current_hour = Some(hour) }
    if let Some(k) = args.k { config.height.k = k }

    let rules_path = args.rules.as_deref().or(config.rules_path.as_deref());
    let rules = RuleSet::load(rules_path).context("[run] failed to load classification rules")?;

    let buildings = io::read_buildings(&args.buildings)
        .with_context(|| format!("[run] failed to load buildings from {}", args.buildings.display()))?;
    let tracts = super::load_tracts(&args.tracts)?;

    let output = dronedemand::run(&buildings, tracts.as_ref(), &rules, &config)?;

    info!("[run] writing {} buildings to {}", output.buildings.len(), out_path.display());
    io::write_buildings_geojson(&output.buildings, out_path)?;
    if let Some(csv_path) = &args.csv {
        io::write_buildings_csv(&output.buildings, csv_path)?;
    }

    println!("{}", serde_json::to_string_pretty(&output.report())?);
    Ok(())
}
