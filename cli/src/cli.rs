use std::path::PathBuf;

/// Drone delivery demand estimation CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "dronedemand", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Estimate heights, classify, allocate population and score demand
    Run(RunArgs),

    /// Write the default classification rule set
    Rules(RulesArgs),

    /// Print summary statistics of a tract file's numeric columns
    CensusStats(CensusStatsArgs),

    /// Simulate daily delivery counts from a Poisson rate
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug)]
pub struct TractArgs {
    /// Census tracts, GeoJSON (.geojson/.json) or TIGER shapefile (.shp)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub tracts: Option<PathBuf>,

    /// Attribute CSV joined onto a shapefile's tracts
    #[arg(long, value_hint = clap::ValueHint::FilePath, requires = "tracts")]
    pub attributes: Option<PathBuf>,

    /// Geo id column of the attribute CSV
    #[arg(long, default_value = "GEOID")]
    pub key_column: String,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Building footprints (GeoJSON FeatureCollection)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub buildings: PathBuf,

    #[command(flatten)]
    pub tracts: TractArgs,

    /// Pipeline configuration (JSON)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Classification rules (JSON), overrides the config's rules_path
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub rules: Option<PathBuf>,

    /// Output GeoJSON file, defaults to "./demand.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also write the building table as CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub csv: Option<PathBuf>,

    /// Override the hour of day (0-23) used by the time factor
    #[arg(long)]
    pub hour: Option<u8>,

    /// Override the k-NN neighbor count
    #[arg(short)]
    pub k: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct RulesArgs {
    /// Output rules file, defaults to "./rules.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CensusStatsArgs {
    #[command(flatten)]
    pub tracts: TractArgs,
}

#[derive(clap::Args, Debug)]
pub struct SimulateArgs {
    /// Expected deliveries per day
    pub lambda: f64,

    /// Number of simulated days
    #[arg(short, long, default_value_t = 30)]
    pub days: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    pub seed: u64,
}
