use std::path::PathBuf;

use anyhow::Result;
use dronedemand::RuleSet;
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RulesArgs) -> Result<()> {
    let out_path = &args.output.clone().unwrap_or_else(|| PathBuf::from("./rules.json"));

    RuleSet::default().save(out_path)?;
    info!("[rules] wrote default rule set to {}", out_path.display());

    Ok(())
}
