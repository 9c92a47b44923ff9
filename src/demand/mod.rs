//! Multiplicative demand model, hotspot detection and delivery simulation.

mod config;
mod hotspot;
mod score;
mod simulate;

pub use config::{DemandComponents, DemandConfig, DemandParams, IncomeCurve, PeakHours};
pub use hotspot::{flag_hotspots, is_hotspot, percentile, summary_statistics, DemandSummary};
pub use score::{score, score_all, DEFAULT_INCOME, DEFAULT_POPULATION};
pub use simulate::simulate_deliveries;
