//! Run configuration
//!
//! Every tunable constant of the checkers lives here with its field
//! default. Configs load from JSON; missing keys keep their defaults.

use crate::error::{QaError, QaResult};
use crate::rules::names::{
    BATIMENT, CANALISATION, CHAMBRE, INFRASTRUCTURE, POINT_GC, POINT_TECHNIQUE, POTEAU, SITE,
    SUPPORT, TRANCHEE,
};
use crate::rules::{default_distance_rules, default_overlap_exceptions, CpsTable, DistanceRule};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Line overlap classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapConfig {
    pub total_ratio: f64,
    pub partial_ratio: f64,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            total_ratio: 0.99,
            partial_ratio: 0.10,
        }
    }
}

/// Endpoint connectivity settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnappingConfig {
    /// Group checked when the caller doesn't name one
    pub group: String,
    /// Maximum endpoint-to-point distance, in layer units
    pub tolerance: f64,
    /// Tolerance multiplier applied to trench layers
    pub trench_tolerance_factor: f64,
}

impl Default for SnappingConfig {
    fn default() -> Self {
        Self {
            group: INFRASTRUCTURE.to_string(),
            tolerance: 0.0,
            trench_tolerance_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullValuesConfig {
    /// Layer (case-insensitive) whose `exempt_fields` may stay empty
    pub exempt_layer: String,
    pub exempt_fields: Vec<String>,
    /// Fields the fill action imputes with the most frequent value
    pub fillable: Vec<String>,
}

impl Default for NullValuesConfig {
    fn default() -> Self {
        Self {
            exempt_layer: BATIMENT.to_string(),
            exempt_fields: ["MENAGE", "COMMERCE", "ENTREPRISE", "ADMINISTRA", "TOTAL PH"]
                .into_iter()
                .map(String::from)
                .collect(),
            fillable: ["REP", "NOM_SR", "PROJET"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    pub infrastructure_group: String,
    /// Decimal places kept when comparing coordinates for duplicates
    pub coordinate_precision: u32,
    pub overlap: OverlapConfig,
    pub distance_rules: Vec<DistanceRule>,
    pub overlap_exceptions: Vec<(String, String)>,
    pub snapping: SnappingConfig,
    pub null_values: NullValuesConfig,
    pub phantom_layers: Vec<String>,
    /// Search distance around a chamber when counting ducts, layer units
    pub chamber_function_buffer: f64,
    /// Replaces the built-in CPS table when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cps_table: Option<CpsTable>,
    /// Items between cancellation/progress checkpoints
    pub progress_chunk: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            infrastructure_group: INFRASTRUCTURE.to_string(),
            coordinate_precision: 5,
            overlap: OverlapConfig::default(),
            distance_rules: default_distance_rules(),
            overlap_exceptions: default_overlap_exceptions(),
            snapping: SnappingConfig::default(),
            null_values: NullValuesConfig::default(),
            phantom_layers: [
                CHAMBRE,
                CANALISATION,
                SUPPORT,
                TRANCHEE,
                POTEAU,
                POINT_TECHNIQUE,
                POINT_GC,
                SITE,
                BATIMENT,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            chamber_function_buffer: 0.5,
            cps_table: None,
            progress_chunk: 256,
        }
    }
}

impl QaConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> QaResult<Self> {
        let file = File::open(path.as_ref())?;
        let config: QaConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay a partial JSON object onto this config
    pub fn merged(&self, patch: &serde_json::Value) -> QaResult<Self> {
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, patch);
        let config: QaConfig = serde_json::from_value(base)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> QaResult<()> {
        let ratio_ok = |r: f64| (0.0..=1.0).contains(&r);
        if !ratio_ok(self.overlap.total_ratio) || !ratio_ok(self.overlap.partial_ratio) {
            return Err(QaError::InvalidConfig(
                "overlap ratios must lie in [0, 1]".into(),
            ));
        }
        if self.overlap.partial_ratio > self.overlap.total_ratio {
            return Err(QaError::InvalidConfig(
                "partial overlap ratio exceeds total overlap ratio".into(),
            ));
        }
        if !(self.snapping.tolerance >= 0.0 && self.snapping.trench_tolerance_factor >= 0.0) {
            return Err(QaError::InvalidConfig(
                "snapping tolerance and trench factor must be non-negative".into(),
            ));
        }
        if !(self.chamber_function_buffer >= 0.0) {
            return Err(QaError::InvalidConfig(
                "chamber function buffer must be non-negative".into(),
            ));
        }
        if self.coordinate_precision > 12 {
            return Err(QaError::InvalidConfig(
                "coordinate precision above 12 decimals".into(),
            ));
        }
        if self.progress_chunk == 0 {
            return Err(QaError::InvalidConfig("progress chunk must be positive".into()));
        }
        Ok(())
    }
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(b), serde_json::Value::Object(p)) => {
            for (key, value) in p {
                match b.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        b.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (b, p) => *b = p.clone(),
    }
}
