#![doc = "Drone delivery demand estimation: building heights, delivery roles, population and demand hotspots"]
mod allocate;
mod building;
mod census;
mod classify;
mod config;
mod demand;
mod error;
mod geom;
mod height;
mod pipeline;

pub mod io;

#[doc(inline)]
pub use building::{Building, Buildings, DeliveryClass, HeightSource, NeighborInfo};

#[doc(inline)]
pub use height::{estimate_heights, HeightEstimator, DEFAULT_HEIGHT_M, FLOOR_HEIGHT_M};

#[doc(inline)]
pub use classify::{classification_stats, classify, classify_all, CategoryRule, ClassificationStats, RuleSet};

#[doc(inline)]
pub use census::{
    CensusTracts, ColumnSummary, ACS_VARIABLES, HOUSING_UNITS, MEDIAN_INCOME, STRUCTURE_UNITS, TOTAL_POPULATION,
    WORKERS,
};

#[doc(inline)]
pub use allocate::{allocate, allocate_with_report, attach_income, AllocationReport};

#[doc(inline)]
pub use demand::{
    flag_hotspots, is_hotspot, percentile, score, score_all, simulate_deliveries, summary_statistics,
    DemandComponents, DemandConfig, DemandParams, DemandSummary, IncomeCurve, PeakHours, DEFAULT_INCOME,
    DEFAULT_POPULATION,
};

#[doc(inline)]
pub use config::PipelineConfig;

#[doc(inline)]
pub use pipeline::{run, PipelineOutput, RunReport};

#[doc(inline)]
pub use error::{Error, Result};
