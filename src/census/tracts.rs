use geo::MultiPolygon;
use polars::prelude::*;

use crate::{
    census::ACS_VARIABLES,
    error::{Error, Result},
    geom::Geometries,
};

/// Census tract layer: geo ids, R-tree indexed geometries and a table of numeric columns,
/// all aligned by row. Tracts are assumed not to overlap.
#[derive(Debug, Clone)]
pub struct CensusTracts {
    geo_ids: Vec<String>,
    geoms: Geometries,
    data: DataFrame, // One row per tract
}

/// Column types treated as numeric census data.
pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32
    )
}

impl CensusTracts {
    /// Assemble a tract layer; `data` must have one row per geometry.
    pub fn new(geo_ids: Vec<String>, shapes: Vec<MultiPolygon<f64>>, data: DataFrame, epsg: Option<u32>) -> Result<Self> {
        if geo_ids.len() != shapes.len() || data.height() != shapes.len() {
            return Err(Error::config(
                "census",
                format!("{} geo ids, {} shapes and {} data rows do not line up", geo_ids.len(), shapes.len(), data.height()),
            ));
        }
        Ok(Self { geo_ids, geoms: Geometries::new(shapes, epsg), data })
    }

    /// Assemble a tract layer from named numeric columns; a `geo_id` column is added.
    pub fn from_columns(
        geo_ids: Vec<String>,
        shapes: Vec<MultiPolygon<f64>>,
        columns: Vec<(String, Vec<Option<f64>>)>,
        epsg: Option<u32>,
    ) -> Result<Self> {
        let data = DataFrame::new(
            std::iter::once(Column::new("geo_id".into(), geo_ids.clone()))
                .chain(columns.into_iter().map(|(name, values)| Column::new(name.into(), values)))
                .collect()
        )?;
        Self::new(geo_ids, shapes, data, epsg)
    }

    #[inline] pub fn len(&self) -> usize { self.geo_ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geo_ids.is_empty() }

    #[inline] pub fn geo_ids(&self) -> &[String] { &self.geo_ids }

    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { self.geoms.shapes() }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn epsg(&self) -> u32 { self.geoms.epsg() }

    #[inline] pub(crate) fn geometries(&self) -> &Geometries { &self.geoms }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.get_column_index(name).is_some()
    }

    /// Names of the columns with a numeric type.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.data.get_columns().iter()
            .filter(|col| is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Values of a numeric column as f64; unparseable cells become null.
    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.data.column(name)
            .map_err(|_| Error::config("census", format!("tract data has no column '{name}'")))?
            .cast(&DataType::Float64)?;
        Ok(col.f64()?.into_iter().collect())
    }

    /// Rename raw ACS variable codes (e.g. `B01003_001E`) to their column names.
    pub fn rename_acs_columns(&mut self) -> Result<()> {
        for (code, name) in ACS_VARIABLES {
            if self.has_column(code) && !self.has_column(name) {
                self.data.rename(code, name.into())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;
    use crate::census::{MEDIAN_INCOME, TOTAL_POPULATION};

    fn square(x: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]])
    }

    #[test]
    fn columns_are_read_as_f64() {
        let tracts = CensusTracts::from_columns(
            vec!["a".into(), "b".into()],
            vec![square(0.0), square(1.0)],
            vec![(TOTAL_POPULATION.into(), vec![Some(100.0), None])],
            None,
        ).unwrap();
        assert_eq!(tracts.len(), 2);
        assert_eq!(tracts.column(TOTAL_POPULATION).unwrap(), vec![Some(100.0), None]);
        assert_eq!(tracts.numeric_columns(), vec![TOTAL_POPULATION.to_string()]);
        assert!(matches!(tracts.column("nope"), Err(Error::Configuration { .. })));
    }

    #[test]
    fn integer_columns_are_cast() {
        let data = DataFrame::new(vec![Column::new("pop".into(), vec![3i64, 4])]).unwrap();
        let tracts = CensusTracts::new(vec!["a".into(), "b".into()], vec![square(0.0), square(1.0)], data, None).unwrap();
        assert_eq!(tracts.column("pop").unwrap(), vec![Some(3.0), Some(4.0)]);
    }

    #[test]
    fn misaligned_rows_are_rejected() {
        let result = CensusTracts::from_columns(
            vec!["a".into()],
            vec![square(0.0), square(1.0)],
            vec![],
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn acs_codes_are_renamed() {
        let mut tracts = CensusTracts::from_columns(
            vec!["a".into()],
            vec![square(0.0)],
            vec![("B19013_001E".into(), vec![Some(61000.0)])],
            None,
        ).unwrap();
        tracts.rename_acs_columns().unwrap();
        assert_eq!(tracts.column(MEDIAN_INCOME).unwrap(), vec![Some(61000.0)]);
    }
}
