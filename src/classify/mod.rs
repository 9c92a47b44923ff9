mod classify;
mod rules;

pub use classify::{classification_stats, classify, classify_all, ClassificationStats};
pub use rules::{CategoryRule, RuleSet};
