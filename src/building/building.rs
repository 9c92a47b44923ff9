use std::collections::BTreeMap;

use geo::{Centroid, MultiPolygon, Point};

use crate::{building::{DeliveryClass, HeightSource, NeighborInfo}, geom::Geometries};

/// One physical structure: its footprint, raw tags, and every column the pipeline adds.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: String,
    pub footprint: MultiPolygon<f64>, // Ground footprint (lon, lat)
    pub tags: BTreeMap<String, String>,

    pub height: Option<f64>,
    pub height_source: Option<HeightSource>,
    pub height_estimated: bool,
    pub neighbor_info: Option<NeighborInfo>,

    pub delivery_class: Option<DeliveryClass>,

    pub area_m2: Option<f64>,
    pub tract: Option<u32>, // Index of the containing census tract
    pub estimated_population: f64,
    pub income: Option<f64>,

    pub demand_potential: Option<f64>,
    pub is_hotspot: bool,
}

impl Building {
    /// A building with no tags and no derived columns.
    pub fn new(id: impl Into<String>, footprint: MultiPolygon<f64>) -> Self {
        Self {
            id: id.into(),
            footprint,
            tags: BTreeMap::new(),
            height: None,
            height_source: None,
            height_estimated: false,
            neighbor_info: None,
            delivery_class: None,
            area_m2: None,
            tract: None,
            estimated_population: 0.0,
            income: None,
            demand_potential: None,
            is_hotspot: false,
        }
    }

    /// Builder-style tag insertion.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[inline] pub fn tag(&self, key: &str) -> Option<&str> { self.tags.get(key).map(String::as_str) }

    /// Parse a tag as a finite number; anything unparseable counts as missing.
    pub fn numeric_tag(&self, key: &str) -> Option<f64> {
        self.tag(key)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
    }

    /// Footprint centroid (lon, lat), None for an empty footprint.
    #[inline] pub fn centroid(&self) -> Option<Point<f64>> { self.footprint.centroid() }
}

/// The building collection threaded through the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buildings {
    buildings: Vec<Building>,
    epsg: Option<u32>, // Geographic CRS of the footprints, if known
}

impl Buildings {
    pub fn new(buildings: Vec<Building>) -> Self {
        Self { buildings, epsg: None }
    }

    /// Set the EPSG code of the footprint coordinates (defaults to 4326).
    pub fn with_epsg(mut self, epsg: u32) -> Self {
        self.epsg = Some(epsg);
        self
    }

    #[inline] pub fn len(&self) -> usize { self.buildings.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.buildings.is_empty() }

    #[inline] pub fn epsg(&self) -> u32 { self.epsg.unwrap_or(4326) }

    #[inline] pub fn get(&self, idx: usize) -> Option<&Building> { self.buildings.get(idx) }

    #[inline] pub fn iter(&self) -> std::slice::Iter<'_, Building> { self.buildings.iter() }

    #[inline] pub fn as_slice(&self) -> &[Building] { &self.buildings }

    #[inline] pub fn into_vec(self) -> Vec<Building> { self.buildings }

    /// Same CRS, new rows.
    pub(crate) fn replace(&self, buildings: Vec<Building>) -> Self {
        Self { buildings, epsg: self.epsg }
    }

    /// Footprints as an indexed geometry collection.
    pub(crate) fn geometries(&self) -> Geometries {
        Geometries::new(self.buildings.iter().map(|b| b.footprint.clone()).collect(), self.epsg)
    }

    /// Values of a numeric column, e.g. `|b| b.height`.
    pub fn column(&self, f: impl Fn(&Building) -> Option<f64>) -> Vec<Option<f64>> {
        self.buildings.iter().map(f).collect()
    }
}

impl<'a> IntoIterator for &'a Buildings {
    type Item = &'a Building;
    type IntoIter = std::slice::Iter<'a, Building>;

    fn into_iter(self) -> Self::IntoIter { self.buildings.iter() }
}

impl FromIterator<Building> for Buildings {
    fn from_iter<I: IntoIterator<Item = Building>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
