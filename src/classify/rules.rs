use std::{fs, path::Path};

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{building::DeliveryClass, error::{Error, Result}};

/// Accepted tag values for one delivery class, plus its priority (lower wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: DeliveryClass,
    /// Tag key → accepted values, in document order.
    pub tags: Vec<(String, Vec<String>)>,
    pub priority: i64,
}

impl CategoryRule {
    pub fn new(category: DeliveryClass, priority: i64) -> Self {
        Self { category, tags: Vec::new(), priority }
    }

    /// Builder-style: accept `values` for tag `key`.
    pub fn with_tag(mut self, key: &str, values: &[&str]) -> Self {
        self.tags.push((key.to_string(), values.iter().map(|v| v.to_string()).collect()));
        self
    }

    /// True if any configured tag key on the building carries an accepted value.
    pub fn matches(&self, tags: &std::collections::BTreeMap<String, String>) -> bool {
        self.tags.iter().any(|(key, accepted)| {
            tags.get(key).is_some_and(|value| accepted.iter().any(|a| a == value))
        })
    }
}

/// Ordered, priority-tagged classification rules. Iteration order is document order
/// and decides ties between equal priorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    categories: Vec<CategoryRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryRule::new(DeliveryClass::DO, 1)
                    .with_tag("shop", &["supermarket", "convenience", "mall"])
                    .with_tag("amenity", &["restaurant", "cafe", "fast_food"])
                    .with_tag("building", &["retail", "commercial", "warehouse"]),
                CategoryRule::new(DeliveryClass::DD, 2)
                    .with_tag("building", &["residential", "house", "apartments", "dormitory"])
                    .with_tag("residential", &["yes"]),
                CategoryRule::new(DeliveryClass::UD, 3)
                    .with_tag("building", &["industrial", "garage", "parking", "shed", "construction"])
                    .with_tag("amenity", &["school", "hospital", "police", "fire_station"])
                    .with_tag("landuse", &["industrial"]),
            ],
        }
    }
}

impl RuleSet {
    /// Build a rule set, rejecting inconsistent ones.
    pub fn new(categories: Vec<CategoryRule>) -> Result<Self> {
        let rules = Self { categories };
        rules.validate()?;
        Ok(rules)
    }

    #[inline] pub fn categories(&self) -> &[CategoryRule] { &self.categories }

    /// Mutable access for configuration-time edits.
    pub fn category_mut(&mut self, category: DeliveryClass) -> Option<&mut CategoryRule> {
        self.categories.iter_mut().find(|rule| rule.category == category)
    }

    /// A rule set must name at least one category, each category at most once, and each tag
    /// key at most once per category.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::config("rules", "rule set has no categories"));
        }
        for (i, rule) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|other| other.category == rule.category) {
                return Err(Error::config("rules", format!("category {} is defined twice", rule.category)));
            }
            for (j, (key, _)) in rule.tags.iter().enumerate() {
                if rule.tags[..j].iter().any(|(other, _)| other == key) {
                    return Err(Error::config("rules", format!("tag '{key}' is listed twice in category {}", rule.category)));
                }
            }
        }
        Ok(())
    }

    /// Parse the structured document form:
    /// `{ "DO": { "tags": { "shop": ["supermarket"] }, "priority": 1 }, ... }`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let doc = value.as_object()
            .ok_or_else(|| Error::config("rules", "rule document must be a JSON object"))?;

        let categories = doc.iter()
            .map(|(name, body)| parse_category(name, body))
            .collect::<Result<Vec<_>>>()?;

        Self::new(categories)
    }

    /// Document form of the rule set, preserving category and tag order.
    pub fn to_value(&self) -> Value {
        let mut doc = Map::new();
        for rule in &self.categories {
            let tags: Map<String, Value> = rule.tags.iter()
                .map(|(key, values)| (key.clone(), json!(values)))
                .collect();
            doc.insert(rule.category.to_string(), json!({ "tags": tags, "priority": rule.priority }));
        }
        Value::Object(doc)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::config("rules", format!("rule document is not valid JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Document text for a valid rule set; an invalid one would not read back the same.
    pub fn to_json(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    /// Load rules from `path`, or the defaults if no path is given or the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                info!("[rules] loading classification rules from {}", path.display());
                Self::from_json(&fs::read_to_string(path)?)
            }
            Some(path) => {
                debug!("[rules] {} not found, using default rules", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn parse_category(name: &str, body: &Value) -> Result<CategoryRule> {
    let category: DeliveryClass = name.parse()
        .map_err(|e: String| Error::config("rules", e))?;
    let body = body.as_object()
        .ok_or_else(|| Error::config("rules", format!("category {name} must be an object")))?;

    if let Some(key) = body.keys().find(|k| *k != "tags" && *k != "priority") {
        return Err(Error::config("rules", format!("category {name} has unknown field '{key}'")));
    }

    let priority = body.get("priority")
        .ok_or_else(|| Error::config("rules", format!("category {name} is missing a priority")))?
        .as_i64()
        .ok_or_else(|| Error::config("rules", format!("priority of category {name} must be an integer")))?;

    let tags = body.get("tags")
        .ok_or_else(|| Error::config("rules", format!("category {name} is missing its tags")))?
        .as_object()
        .ok_or_else(|| Error::config("rules", format!("tags of category {name} must be an object")))?
        .iter()
        .map(|(key, values)| {
            let values = values.as_array()
                .ok_or_else(|| Error::config("rules", format!("{name}.{key} must be a list of values")))?
                .iter()
                .map(|v| v.as_str().map(str::to_string)
                    .ok_or_else(|| Error::config("rules", format!("{name}.{key} values must be strings"))))
                .collect::<Result<Vec<_>>>()?;
            Ok((key.clone(), values))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CategoryRule { category, tags, priority })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_round_trip_exactly() {
        let rules = RuleSet::default();
        let text = rules.to_json().unwrap();
        let parsed = RuleSet::from_json(&text).unwrap();
        assert_eq!(parsed, rules);
        assert_eq!(parsed.to_json().unwrap(), text);
    }

    #[test]
    fn document_order_is_preserved() {
        let text = r#"{"UD": {"tags": {"landuse": ["industrial"]}, "priority": 1},
                       "DO": {"tags": {"shop": ["mall"], "amenity": ["cafe"]}, "priority": 1}}"#;
        let rules = RuleSet::from_json(text).unwrap();
        let order: Vec<_> = rules.categories().iter().map(|r| r.category).collect();
        assert_eq!(order, vec![DeliveryClass::UD, DeliveryClass::DO]);
        assert_eq!(rules.categories()[1].tags[0].0, "shop");
    }

    #[test]
    fn missing_priority_is_a_configuration_error() {
        let err = RuleSet::from_json(r#"{"DO": {"tags": {"shop": ["mall"]}}}"#).unwrap_err();
        assert!(matches!(err, Error::Configuration { stage: "rules", .. }));
        assert!(err.to_string().contains("missing a priority"));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        for text in [
            "[]",
            r#"{}"#,
            r#"{"XX": {"tags": {}, "priority": 1}}"#,
            r#"{"DO": {"tags": {"shop": "mall"}, "priority": 1}}"#,
            r#"{"DO": {"tags": {}, "priority": "high"}}"#,
            r#"{"DO": {"tags": {}, "priority": 1, "colour": "red"}}"#,
            "not json",
        ] {
            assert!(RuleSet::from_json(text).is_err(), "accepted {text}");
        }
    }

    #[test]
    fn duplicate_categories_are_rejected() {
        let err = RuleSet::new(vec![
            CategoryRule::new(DeliveryClass::DD, 1),
            CategoryRule::new(DeliveryClass::DD, 2),
        ]).unwrap_err();
        assert!(err.to_string().contains("defined twice"));

        // The document form holds one value list per key, so a repeated key cannot be saved.
        let repeated = RuleSet::new(vec![
            CategoryRule::new(DeliveryClass::DO, 1)
                .with_tag("shop", &["mall"])
                .with_tag("shop", &["bakery"]),
        ]).unwrap_err();
        assert!(matches!(repeated, Error::Configuration { stage: "rules", .. }));
        assert!(repeated.to_string().contains("tag 'shop' is listed twice"));

        let mut edited = RuleSet::default();
        edited.category_mut(DeliveryClass::DO).unwrap().tags.push(("shop".into(), vec!["bakery".into()]));
        let dir = tempfile::tempdir().unwrap();
        assert!(edited.save(&dir.path().join("rules.json")).is_err());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("rules.json");
        assert_eq!(RuleSet::load(Some(&missing)).unwrap(), RuleSet::default());

        let mut rules = RuleSet::default();
        rules.category_mut(DeliveryClass::DD).unwrap().priority = 0;
        rules.save(&missing).unwrap();
        assert_eq!(RuleSet::load(Some(&missing)).unwrap(), rules);
    }
}
