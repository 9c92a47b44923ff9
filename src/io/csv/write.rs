//! CSV writing operations.

use std::{fs::File, path::Path};

use polars::{frame::DataFrame, io::SerWriter, prelude::{Column, CsvWriter}};
use tracing::info;

use crate::{building::{Building, Buildings}, error::Result};

/// Tabulate the non-geometry building columns, one row per building.
pub fn buildings_to_dataframe(buildings: &Buildings) -> Result<DataFrame> {
    let text = |f: fn(&Building) -> Option<&'static str>| -> Vec<Option<&'static str>> {
        buildings.iter().map(f).collect()
    };

    Ok(DataFrame::new(vec![
        Column::new("id".into(), buildings.iter().map(|b| b.id.as_str()).collect::<Vec<_>>()),
        Column::new("delivery_class".into(), text(|b| b.delivery_class.map(|c| c.as_str()))),
        Column::new("height".into(), buildings.column(|b| b.height)),
        Column::new("height_source".into(), text(|b| b.height_source.map(|s| s.as_str()))),
        Column::new("height_estimated".into(), buildings.iter().map(|b| b.height_estimated).collect::<Vec<_>>()),
        Column::new("area_m2".into(), buildings.column(|b| b.area_m2)),
        Column::new("tract".into(), buildings.iter().map(|b| b.tract).collect::<Vec<_>>()),
        Column::new("estimated_population".into(), buildings.iter().map(|b| b.estimated_population).collect::<Vec<_>>()),
        Column::new("income".into(), buildings.column(|b| b.income)),
        Column::new("demand_potential".into(), buildings.column(|b| b.demand_potential)),
        Column::new("is_hotspot".into(), buildings.iter().map(|b| b.is_hotspot).collect::<Vec<_>>()),
    ])?)
}

/// Write a DataFrame to a CSV file.
fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    CsvWriter::new(file).finish(df)?;
    Ok(())
}

/// Write the building table to a CSV file.
pub fn write_buildings(buildings: &Buildings, path: &Path) -> Result<()> {
    write_csv(&mut buildings_to_dataframe(buildings)?, path)?;
    info!("[io::csv::write] wrote {} rows to {}", buildings.len(), path.display());
    Ok(())
}
