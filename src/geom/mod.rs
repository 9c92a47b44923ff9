mod bbox;
mod crosswalk;
mod geom;
mod proj;

pub(crate) use bbox::ShapeEnvelope;
pub(crate) use geom::{mean_coord, Geometries};
pub(crate) use proj::MetricProjection;
