use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::{
    building::{Buildings, DeliveryClass},
    classify::RuleSet,
    error::Result,
};

/// Classify one building's tags. Unmatched buildings are `UD`; among matches the lowest
/// priority number wins, and equal priorities go to the category listed first.
pub fn classify(tags: &BTreeMap<String, String>, rules: &RuleSet) -> DeliveryClass {
    let mut best: Option<(DeliveryClass, i64)> = None;
    for rule in rules.categories() {
        if rule.matches(tags) && best.is_none_or(|(_, priority)| rule.priority < priority) {
            best = Some((rule.category, rule.priority));
        }
    }
    best.map_or(DeliveryClass::UD, |(category, _)| category)
}

/// Return a copy of `buildings` with `delivery_class` set on every building.
pub fn classify_all(buildings: &Buildings, rules: &RuleSet) -> Result<Buildings> {
    rules.validate()?;

    let out: Vec<_> = buildings.as_slice().par_iter()
        .map(|building| {
            let mut building = building.clone();
            building.delivery_class = Some(classify(&building.tags, rules));
            building
        })
        .collect();

    let out = buildings.replace(out);
    let stats = classification_stats(&out);
    info!(
        "[classify] {} buildings: DO={} DD={} UD={}",
        stats.total, stats.count(DeliveryClass::DO), stats.count(DeliveryClass::DD), stats.count(DeliveryClass::UD)
    );
    Ok(out)
}

/// Building counts per delivery class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationStats {
    pub total: usize,
    pub by_class: BTreeMap<DeliveryClass, usize>,
}

impl ClassificationStats {
    #[inline]
    pub fn count(&self, class: DeliveryClass) -> usize {
        self.by_class.get(&class).copied().unwrap_or(0)
    }

    /// Share of classified buildings in `class`, in percent.
    pub fn percentage(&self, class: DeliveryClass) -> f64 {
        if self.total == 0 { 0.0 } else { 100.0 * self.count(class) as f64 / self.total as f64 }
    }
}

/// Count classified buildings per class (unclassified buildings are not counted).
pub fn classification_stats(buildings: &Buildings) -> ClassificationStats {
    let mut by_class = BTreeMap::new();
    for class in buildings.iter().filter_map(|b| b.delivery_class) {
        *by_class.entry(class).or_insert(0) += 1;
    }
    ClassificationStats { total: by_class.values().sum(), by_class }
}
