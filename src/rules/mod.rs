//! Domain rule tables
//!
//! Static data the checkers interpret: compatibility tables, distance
//! rules, decision tables. Tables are validated once when built and are
//! read-only afterwards.
//!
//! # Submodules
//! - `names` - Layer, group and attribute names
//! - `cps` - Duct CPS → chamber type compatibility, trench category matching
//! - `duct_type` - Duct category decision table
//! - `support` - Support type requirements
//! - `chamber` - Chamber function thresholds

pub mod chamber;
pub mod cps;
pub mod duct_type;
pub mod names;
pub mod support;

use crate::config::QaConfig;
use crate::error::{QaError, QaResult};
use serde::{Deserialize, Serialize};

pub use cps::CpsTable;

/// Minimum geodesic spacing between features of one layer, optionally
/// restricted to features whose TYPE equals `type_value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRule {
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_value: Option<String>,
    pub min_distance_m: f64,
}

impl DistanceRule {
    pub fn new(layer: &str, type_value: Option<&str>, min_distance_m: f64) -> Self {
        Self {
            layer: layer.to_string(),
            type_value: type_value.map(str::to_string),
            min_distance_m,
        }
    }
}

pub fn default_distance_rules() -> Vec<DistanceRule> {
    use names::{CHAMBRE, POINT_TECHNIQUE, POTEAU};
    vec![
        DistanceRule::new(CHAMBRE, None, 1.0),
        DistanceRule::new(POTEAU, None, 1.0),
        DistanceRule::new(POINT_TECHNIQUE, Some("point immeuble"), 5.0),
        DistanceRule::new(POINT_TECHNIQUE, Some("point façade"), 0.4),
        DistanceRule::new(POINT_TECHNIQUE, Some("adduction armoire"), 1.0),
        DistanceRule::new(POINT_TECHNIQUE, Some("adduction façade"), 0.3),
        DistanceRule::new(POINT_TECHNIQUE, Some("adduction site"), 0.3),
        DistanceRule::new(POINT_TECHNIQUE, Some("adduction immeuble"), 5.0),
    ]
}

/// Layer pairs allowed to share point positions
pub fn default_overlap_exceptions() -> Vec<(String, String)> {
    use names::{BATIMENT, CANALISATION, POINT_TECHNIQUE, TRANCHEE};
    vec![
        (CANALISATION.to_string(), TRANCHEE.to_string()),
        (BATIMENT.to_string(), POINT_TECHNIQUE.to_string()),
    ]
}

/// Validated rule tables for one run
#[derive(Debug, Clone)]
pub struct RuleTables {
    pub cps: CpsTable,
    pub distance_rules: Vec<DistanceRule>,
    pub overlap_exceptions: Vec<(String, String)>,
}

impl RuleTables {
    pub fn from_config(config: &QaConfig) -> QaResult<Self> {
        let tables = Self {
            cps: config
                .cps_table
                .clone()
                .unwrap_or_else(cps::default_cps_table),
            distance_rules: config.distance_rules.clone(),
            overlap_exceptions: config.overlap_exceptions.clone(),
        };
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> QaResult<()> {
        if self.cps.is_empty() {
            return Err(QaError::InvalidRuleTable("CPS table is empty".into()));
        }
        for (code, chambers) in &self.cps {
            if code.trim().is_empty() || code.trim() != code {
                return Err(QaError::InvalidRuleTable(format!(
                    "CPS code '{}' is blank or has surrounding spaces",
                    code
                )));
            }
            if chambers.is_empty() {
                return Err(QaError::InvalidRuleTable(format!(
                    "CPS code '{}' allows no chamber type",
                    code
                )));
            }
            if chambers.iter().any(|c| c.trim().is_empty()) {
                return Err(QaError::InvalidRuleTable(format!(
                    "CPS code '{}' lists a blank chamber type",
                    code
                )));
            }
        }
        for rule in &self.distance_rules {
            if rule.layer.trim().is_empty() {
                return Err(QaError::InvalidRuleTable("distance rule without layer".into()));
            }
            if !(rule.min_distance_m.is_finite() && rule.min_distance_m > 0.0) {
                return Err(QaError::InvalidRuleTable(format!(
                    "distance rule on '{}' has non-positive minimum {}",
                    rule.layer, rule.min_distance_m
                )));
            }
        }
        for (a, b) in &self.overlap_exceptions {
            if a == b {
                return Err(QaError::InvalidRuleTable(format!(
                    "overlap exception pairs '{}' with itself",
                    a
                )));
            }
        }
        Ok(())
    }

    /// Whether two layers may share point positions (order-insensitive)
    pub fn overlap_allowed(&self, a: &str, b: &str) -> bool {
        self.overlap_exceptions
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Allowed chamber types for a CPS code, `None` for unknown codes
    pub fn allowed_chambers(&self, cps_code: &str) -> Option<&std::collections::BTreeSet<String>> {
        self.cps.get(cps_code)
    }
}
