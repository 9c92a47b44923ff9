pub mod census_stats;
pub mod rules;
pub mod run;
pub mod simulate;

use anyhow::{Context, Result};
use dronedemand::{io, CensusTracts};

use crate::cli::TractArgs;

/// Load tracts by file extension; None when no tract file was given.
pub(crate) fn load_tracts(args: &TractArgs) -> Result<Option<CensusTracts>> {
    let Some(path) = &args.tracts else { return Ok(None) };

    let is_shapefile = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shp"));
    let tracts = if is_shapefile {
        io::read_tracts_shapefile(path, args.attributes.as_deref(), &args.key_column)
    } else {
        anyhow::ensure!(args.attributes.is_none(), "--attributes only applies to shapefile tracts");
        io::read_tracts_geojson(path)
    };

    tracts.map(Some).with_context(|| format!("[cli] failed to load tracts from {}", path.display()))
}
