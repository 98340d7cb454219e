//! Features: an id, an optional geometry and named attributes

use super::value::AttrValue;
use geo::Geometry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-layer feature identifier
pub type FeatureId = u64;

static NULL: AttrValue = AttrValue::Null;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    #[serde(default)]
    pub geometry: Option<Geometry<f64>>,
    #[serde(default)]
    pub attributes: IndexMap<String, AttrValue>,
}

impl Feature {
    pub fn new(id: FeatureId, geometry: Option<Geometry<f64>>) -> Self {
        Self {
            id,
            geometry,
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Attribute value, `Null` when absent
    pub fn attr(&self, name: &str) -> &AttrValue {
        self.attributes.get(name).unwrap_or(&NULL)
    }

    /// Attribute as raw text, `None` when null or absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.attr(name).as_text()
    }

    /// NOM when present and non-empty
    pub fn name(&self) -> Option<String> {
        match self.attr("NOM") {
            AttrValue::Null => None,
            v => {
                let s = v.to_string();
                if s.is_empty() {
                    None
                } else {
                    Some(s)
                }
            }
        }
    }

    /// Display label: NOM, or `ID <fid>`
    pub fn label(&self) -> String {
        self.name().unwrap_or_else(|| format!("ID {}", self.id))
    }
}
