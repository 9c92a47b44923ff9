//! File formats for buildings, tracts and results.

mod csv;
mod geojson;
mod tiger;

pub use csv::{buildings_to_dataframe, write_buildings as write_buildings_csv};
pub use geojson::{
    buildings_to_geojson, parse_buildings, parse_tracts, read_buildings, read_tracts as read_tracts_geojson,
    write_buildings as write_buildings_geojson,
};
pub use tiger::{epsg_from_prj, read_tracts as read_tracts_shapefile};
