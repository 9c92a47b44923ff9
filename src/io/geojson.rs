//! GeoJSON reading and writing for buildings and tracts.

use std::{fs, path::Path};

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::{
    building::{Building, Buildings},
    census::CensusTracts,
    error::{Error, Result},
};

/// Property names tried, in order, for a tract's geo id.
const GEO_ID_KEYS: [&str; 3] = ["GEOID", "GEOID20", "geo_id"];

/// Read a building FeatureCollection from a file.
pub fn read_buildings(path: &Path) -> Result<Buildings> {
    let bytes = fs::read(path)?;
    parse_buildings(&bytes, &path.display().to_string())
}

/// Parse a building FeatureCollection. Every scalar property becomes a tag.
/// Features without a polygonal geometry are skipped.
pub fn parse_buildings(bytes: &[u8], source: &str) -> Result<Buildings> {
    let features = parse_features(bytes, source)?;

    let mut skipped = 0;
    let mut buildings = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let Some(footprint) = feature_geometry(feature, source)? else {
            skipped += 1;
            continue;
        };

        let properties = feature.get("properties").and_then(Value::as_object);
        let id = feature_id(feature.get("id"))
            .or_else(|| properties.and_then(|p| feature_id(p.get("id")).or_else(|| feature_id(p.get("osmid")))))
            .unwrap_or_else(|| idx.to_string());

        let mut building = Building::new(id, footprint);
        for (key, value) in properties.into_iter().flatten() {
            if let Some(text) = scalar_text(value) {
                building.tags.insert(key.clone(), text);
            }
        }
        buildings.push(building);
    }

    if skipped > 0 {
        warn!("[io::geojson] skipped {skipped} non-polygon features in {source}");
    }
    info!("[io::geojson] read {} buildings from {source}", buildings.len());
    Ok(Buildings::new(buildings).with_epsg(4326))
}

/// Read a tract FeatureCollection from a file.
pub fn read_tracts(path: &Path) -> Result<CensusTracts> {
    let bytes = fs::read(path)?;
    parse_tracts(&bytes, &path.display().to_string())
}

/// Parse a tract FeatureCollection with a `GEOID` property and numeric columns.
///
/// Numeric strings are coerced; any other value is null. Columns with no numeric value at all
/// are dropped, and raw ACS variable codes are renamed.
pub fn parse_tracts(bytes: &[u8], source: &str) -> Result<CensusTracts> {
    let features = parse_features(bytes, source)?;

    let mut geo_ids = Vec::with_capacity(features.len());
    let mut shapes = Vec::with_capacity(features.len());
    let mut columns: Vec<(String, Vec<Option<f64>>)> = Vec::new();

    for (row, feature) in features.iter().enumerate() {
        let properties = feature.get("properties").and_then(Value::as_object);
        let geo_id = properties
            .and_then(|p| GEO_ID_KEYS.iter().find_map(|key| feature_id(p.get(*key))))
            .ok_or_else(|| Error::external(source, format!("tract feature {row} has no GEOID property")))?;
        let shape = feature_geometry(feature, source)?
            .ok_or_else(|| Error::external(source, format!("tract {geo_id} has no polygon geometry")))?;

        for (key, value) in properties.into_iter().flatten() {
            if GEO_ID_KEYS.contains(&key.as_str()) { continue }
            let idx = match columns.iter().position(|(name, _)| name == key) {
                Some(idx) => idx,
                None => {
                    columns.push((key.clone(), vec![None; row]));
                    columns.len() - 1
                }
            };
            columns[idx].1.push(numeric_value(value));
        }

        geo_ids.push(geo_id);
        shapes.push(shape);
        for (_, values) in columns.iter_mut() {
            values.resize(geo_ids.len(), None);
        }
    }

    columns.retain(|(_, values)| values.iter().any(Option::is_some));

    let mut tracts = CensusTracts::from_columns(geo_ids, shapes, columns, Some(4326))?;
    tracts.rename_acs_columns()?;
    info!("[io::geojson] read {} tracts with {} numeric columns from {source}", tracts.len(), tracts.numeric_columns().len());
    Ok(tracts)
}

/// Render buildings as a FeatureCollection carrying every pipeline column.
pub fn buildings_to_geojson(buildings: &Buildings) -> Value {
    let features: Vec<Value> = buildings.iter().map(|building| {
        let mut properties = Map::new();
        for (key, value) in &building.tags {
            properties.insert(key.clone(), Value::String(value.clone()));
        }

        properties.insert("id".into(), json!(building.id));
        properties.insert("height".into(), json!(building.height));
        properties.insert("height_source".into(), json!(building.height_source));
        properties.insert("height_estimated".into(), json!(building.height_estimated));
        if let Some(info) = &building.neighbor_info {
            properties.insert("neighbor_info".into(), json!(info));
        }
        properties.insert("delivery_class".into(), json!(building.delivery_class));
        properties.insert("area_m2".into(), json!(building.area_m2));
        properties.insert("tract".into(), json!(building.tract));
        properties.insert("estimated_population".into(), json!(building.estimated_population));
        properties.insert("income".into(), json!(building.income));
        properties.insert("demand_potential".into(), json!(building.demand_potential));
        properties.insert("is_hotspot".into(), json!(building.is_hotspot));

        json!({
            "type": "Feature",
            "id": building.id,
            "geometry": multipolygon_to_value(&building.footprint),
            "properties": properties,
        })
    }).collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write buildings to a GeoJSON file.
pub fn write_buildings(buildings: &Buildings, path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_vec(&buildings_to_geojson(buildings))?)?;
    info!("[io::geojson] wrote {} buildings to {}", buildings.len(), path.display());
    Ok(())
}

/// Features of a FeatureCollection.
fn parse_features(bytes: &[u8], source: &str) -> Result<Vec<Value>> {
    let mut value: Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::external(source, format!("invalid GeoJSON: {e}")))?;
    match value.get_mut("features").map(Value::take) {
        Some(Value::Array(features)) => Ok(features),
        _ => Err(Error::external(source, "not a GeoJSON FeatureCollection")),
    }
}

/// A feature's footprint, None for null or non-polygonal geometry.
fn feature_geometry(feature: &Value, source: &str) -> Result<Option<MultiPolygon<f64>>> {
    let Some(geometry) = feature.get("geometry").and_then(Value::as_object) else {
        return Ok(None);
    };
    let coords = geometry.get("coordinates").and_then(Value::as_array);

    match (geometry.get("type").and_then(Value::as_str), coords) {
        (Some("Polygon"), Some(rings)) => Ok(Some(MultiPolygon(vec![parse_polygon(rings, source)?]))),
        (Some("MultiPolygon"), Some(polygons)) => Ok(Some(MultiPolygon(
            polygons.iter()
                .map(|polygon| {
                    let rings = polygon.as_array()
                        .ok_or_else(|| Error::external(source, "MultiPolygon member is not an array"))?;
                    parse_polygon(rings, source)
                })
                .collect::<Result<Vec<_>>>()?,
        ))),
        _ => Ok(None),
    }
}

/// Parse `[exterior, hole, ...]` ring arrays into a polygon.
fn parse_polygon(rings: &[Value], source: &str) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| parse_ring(ring, source));
    let exterior = rings.next()
        .ok_or_else(|| Error::external(source, "polygon has no exterior ring"))??;
    Ok(Polygon::new(exterior, rings.collect::<Result<Vec<_>>>()?))
}

/// Parse `[[x, y], ...]` into a closed ring.
fn parse_ring(ring: &Value, source: &str) -> Result<LineString<f64>> {
    let positions = ring.as_array()
        .ok_or_else(|| Error::external(source, "ring is not an array"))?;

    let mut coords = positions.iter()
        .map(|position| match position.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(Error::external(source, "coordinate is not numeric")),
            },
            _ => Err(Error::external(source, "position needs at least two coordinates")),
        })
        .collect::<Result<Vec<_>>>()?;

    if coords.first() != coords.last() {
        coords.push(coords[0]);
    }
    Ok(LineString(coords))
}

fn multipolygon_to_value(shape: &MultiPolygon<f64>) -> Value {
    fn ring(ls: &LineString<f64>) -> Vec<[f64; 2]> {
        ls.coords().map(|c| [c.x, c.y]).collect()
    }

    let polygons: Vec<Vec<Vec<[f64; 2]>>> = shape.0.iter()
        .map(|polygon| std::iter::once(ring(polygon.exterior()))
            .chain(polygon.interiors().iter().map(ring))
            .collect())
        .collect();

    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

/// String or integer ids as text.
fn feature_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}
