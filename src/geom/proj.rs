use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::error::{Error, Result};

/// Transform from geographic lon/lat into the UTM zone around a given center,
/// so that Euclidean distances and areas come out in meters.
pub(crate) struct MetricProjection {
    from: Proj4,
    to: Proj4,
    zone: u32,
    north: bool,
}

impl MetricProjection {
    /// Build the projection for the UTM zone containing `center` (lon, lat in degrees).
    pub(crate) fn around(center: Coord<f64>, epsg: u32) -> Result<Self> {
        let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
        let north = center.y >= 0.0;

        let from = {
            let proj_string = source_geog_proj4(epsg);
            Proj4::from_proj_string(proj_string)
                .map_err(|e| Error::Projection(format!("failed to build source PROJ.4 {proj_string}: {e}")))?
        };

        let to = {
            let proj_string = utm_proj4(zone, north, epsg);
            Proj4::from_proj_string(&proj_string)
                .map_err(|e| Error::Projection(format!("failed to build target PROJ.4 {proj_string}: {e}")))?
        };

        Ok(Self { from, to, zone, north })
    }

    /// UTM zone number (1-60).
    #[inline] pub(crate) fn zone(&self) -> u32 { self.zone }

    /// Whether the northern-hemisphere variant of the zone is used.
    #[inline] pub(crate) fn is_north(&self) -> bool { self.north }

    /// Project a single lon/lat coordinate into meters.
    pub(crate) fn project(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        // Degrees → radians in, meters out.
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| Error::Projection(format!("CRS transform failed at ({}, {}): {e}", coord.x, coord.y)))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Project every vertex of a shape into meters.
    pub(crate) fn project_shape(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        shape.try_map_coords(|coord| self.project(coord))
    }
}

/// PROJ.4 string for the source geographic CRS.
#[inline]
fn source_geog_proj4(epsg: u32) -> &'static str {
    match epsg {
        4269 | 4937 => "+proj=longlat +datum=NAD83 +no_defs +type=crs",
        _            => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
    }
}

/// PROJ.4 string for the target UTM CRS.
/// - WGS84: 326zz (north) / 327zz (south)
/// - NAD83: 269zz (north only; south falls back to WGS84 UTM-S)
#[inline]
fn utm_proj4(zone: u32, north: bool, epsg: u32) -> String {
    let is_nad83 = matches!(epsg, 4269 | 4937);
    let datum = if is_nad83 && north { "NAD83" } else { "WGS84" };
    let south = if north { "" } else { " +south" };

    format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs")
}
