//! TIGER/Line tract shapefiles, optionally joined with an attribute table.

use std::{collections::HashMap, fs, path::Path};

use ahash::AHashMap;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use polars::prelude::DataType;
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};
use tracing::{info, warn};

use crate::{
    census::{is_numeric, CensusTracts},
    error::{Error, Result},
    io::csv::read_table,
};

/// Record fields tried, in order, for a tract's geo id.
const GEO_ID_FIELDS: [&str; 2] = ["GEOID", "GEOID20"];

/// Load tract shapes from a `.shp` file. Numeric record fields (e.g. `ALAND`) become columns.
///
/// When `attributes` is given, the CSV's numeric columns are joined on its `key_column`
/// matching each tract's geo id; tracts with no matching row get nulls.
pub fn read_tracts(path: &Path, attributes: Option<&Path>, key_column: &str) -> Result<CensusTracts> {
    let source = path.display().to_string();
    let mut reader = Reader::from_path(path)?;

    let mut geo_ids = Vec::new();
    let mut shapes = Vec::new();
    let mut records = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;
        let geo_id = GEO_ID_FIELDS.iter()
            .find_map(|field| character_field(&record, field))
            .ok_or_else(|| Error::external(&source, format!("record {} has no GEOID field", geo_ids.len())))?;

        shapes.push(shape_to_multipolygon(shape, &source)?);
        geo_ids.push(geo_id);
        records.push(record);
    }

    let mut columns = numeric_fields(&records);
    if let Some(attributes) = attributes {
        columns.extend(join_attributes(&geo_ids, attributes, key_column)?);
    }

    let mut tracts = CensusTracts::from_columns(geo_ids, shapes, columns, Some(epsg_from_prj(path)))?;
    tracts.rename_acs_columns()?;
    info!("[io::tiger] read {} tracts from {source}", tracts.len());
    Ok(tracts)
}

/// EPSG code from the `.prj` next to a shapefile: NAD83 (4269) if named, otherwise WGS84.
pub fn epsg_from_prj(path: &Path) -> u32 {
    match fs::read_to_string(path.with_extension("prj")) {
        Ok(wkt) if wkt.contains("NAD83") || wkt.contains("North_American_1983") => 4269,
        _ => 4326,
    }
}

/// Coerce a generic shape into an owned multipolygon, raising error if different shape.
fn shape_to_multipolygon(shape: Shape, source: &str) -> Result<MultiPolygon<f64>> {
    let polygon = match shape {
        Shape::Polygon(polygon) => polygon,
        other => return Err(Error::external(source, format!("found non-Polygon shape: {:?}", other.shapetype()))),
    };

    /// Ensure first and last are the same for geo::LineString coords
    fn ring(points: &[shapefile::Point]) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = points.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect();
        if coords.first() != coords.last() {
            coords.push(coords[0]);
        }
        LineString(coords)
    }

    // Each outer ring is followed by its holes.
    let mut polygons = Vec::new();
    let mut current: Option<(LineString<f64>, Vec<LineString<f64>>)> = None;
    for part in polygon.rings() {
        match part {
            PolygonRing::Outer(points) => {
                if let Some((exterior, holes)) = current.take() {
                    polygons.push(Polygon::new(exterior, holes));
                }
                current = Some((ring(points), Vec::new()));
            }
            PolygonRing::Inner(points) => match current.as_mut() {
                Some((_, holes)) => holes.push(ring(points)),
                None => return Err(Error::external(source, "hole ring precedes any outer ring")),
            },
        }
    }
    if let Some((exterior, holes)) = current {
        polygons.push(Polygon::new(exterior, holes));
    }

    Ok(MultiPolygon(polygons))
}

fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Numeric(n) => *n,
        FieldValue::Float(f) => f.map(f64::from),
        FieldValue::Double(d) => Some(*d),
        FieldValue::Integer(i) => Some(f64::from(*i)),
        _ => None,
    }
}

/// Numeric record fields as columns, sorted by field name.
fn numeric_fields(records: &[Record]) -> Vec<(String, Vec<Option<f64>>)> {
    let Some(first) = records.first() else { return Vec::new() };

    let fields: &HashMap<String, FieldValue> = first.as_ref();
    let mut names: Vec<&String> = fields.iter()
        .filter(|(_, value)| matches!(
            value,
            FieldValue::Numeric(_) | FieldValue::Float(_) | FieldValue::Double(_) | FieldValue::Integer(_)
        ))
        .map(|(name, _)| name)
        .collect();
    names.sort();

    names.into_iter()
        .map(|name| {
            let values = records.iter()
                .map(|record| record.get(name).and_then(numeric_value))
                .collect();
            (name.clone(), values)
        })
        .collect()
}

/// Numeric columns of an attribute CSV, reordered to match `geo_ids`.
fn join_attributes(geo_ids: &[String], path: &Path, key_column: &str) -> Result<Vec<(String, Vec<Option<f64>>)>> {
    let df = read_table(path, key_column)?;
    let keys = df.column(key_column)
        .map_err(|_| Error::config("census", format!("{} has no '{key_column}' column", path.display())))?
        .str()?;

    let rows: AHashMap<&str, usize> = keys.into_iter().enumerate()
        .filter_map(|(row, key)| Some((key?.trim(), row)))
        .collect();
    let matched = geo_ids.iter().filter(|id| rows.contains_key(id.as_str())).count();
    if matched < geo_ids.len() {
        warn!("[io::tiger] {} of {} tracts have no row in {}", geo_ids.len() - matched, geo_ids.len(), path.display());
    }

    df.get_columns().iter()
        .filter(|col| col.name().as_str() != key_column && is_numeric(col.dtype()))
        .map(|col| {
            let values: Vec<Option<f64>> = col.cast(&DataType::Float64)?.f64()?.into_iter().collect();
            let aligned = geo_ids.iter()
                .map(|id| rows.get(id.as_str()).and_then(|&row| values[row]))
                .collect();
            Ok((col.name().to_string(), aligned))
        })
        .collect()
}
