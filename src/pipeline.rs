//! Runs the stages in order, threading a fresh building collection through each.

use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::{
    allocate::{allocate_with_report, attach_income, AllocationReport},
    building::Buildings,
    census::CensusTracts,
    classify::{classification_stats, classify_all, ClassificationStats, RuleSet},
    config::PipelineConfig,
    demand::{flag_hotspots, score_all, summary_statistics, DemandSummary},
    error::Result,
};

/// Result of a full pipeline pass.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub buildings: Buildings,
    pub classification: ClassificationStats,
    /// Present when tracts were supplied.
    pub allocation: Option<AllocationReport>,
    pub summary: DemandSummary,
}

/// Serializable digest of a run for reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub classification: &'a ClassificationStats,
    pub allocation: Option<&'a AllocationReport>,
    pub summary: &'a DemandSummary,
}

impl PipelineOutput {
    pub fn report(&self) -> RunReport<'_> {
        RunReport {
            classification: &self.classification,
            allocation: self.allocation.as_ref(),
            summary: &self.summary,
        }
    }
}

/// Height → classification → population → demand → hotspots.
///
/// Without tracts, no population or income is attached and the demand factors fall back
/// to their defaults.
pub fn run(
    buildings: &Buildings,
    tracts: Option<&CensusTracts>,
    rules: &RuleSet,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    config.validate()?;
    info!("[pipeline] {} buildings, {} tracts", buildings.len(), tracts.map_or(0, |t| t.len()));

    let buildings = info_span!("height").in_scope(|| config.height.estimate(buildings))?;
    let buildings = info_span!("classify").in_scope(|| classify_all(&buildings, rules))?;

    let (buildings, allocation) = match tracts {
        Some(tracts) => {
            let _span = info_span!("allocate").entered();
            let (buildings, report) = allocate_with_report(&buildings, tracts, &config.population_column)?;
            let buildings = if tracts.has_column(&config.income_column) {
                attach_income(&buildings, tracts, &config.income_column)?
            } else {
                warn!("[pipeline] tracts have no '{}' column; using default income", config.income_column);
                buildings
            };
            (buildings, Some(report))
        }
        None => {
            warn!("[pipeline] no census tracts supplied; population and income use defaults");
            (buildings, None)
        }
    };

    let buildings = info_span!("demand").in_scope(|| {
        let scored = score_all(&buildings, &config.demand)?;
        flag_hotspots(&scored, config.hotspot_percentile)
    })?;

    let classification = classification_stats(&buildings);
    let summary = summary_statistics(&buildings);
    info!(
        "[pipeline] total demand {:.3}, {} hotspots",
        summary.total_demand, summary.hotspot_count
    );

    Ok(PipelineOutput { buildings, classification, allocation, summary })
}
