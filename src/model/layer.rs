//! Layers: id-ordered feature collections sharing a geometry class and schema

use super::feature::{Feature, FeatureId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Geometry class declared by a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryClass {
    Point,
    Line,
    Polygon,
}

/// The set of attribute names a layer exposes, resolved once per layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSchema {
    fields: Vec<String>,
}

impl LayerSchema {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub group: Option<String>,
    pub geometry_class: GeometryClass,
    pub schema: LayerSchema,
    features: Vec<Feature>,
    selection: BTreeSet<FeatureId>,
}

impl Layer {
    pub fn new(
        name: &str,
        group: Option<&str>,
        geometry_class: GeometryClass,
        schema: LayerSchema,
        mut features: Vec<Feature>,
    ) -> Self {
        features.sort_by_key(|f| f.id);
        features.dedup_by_key(|f| f.id);
        Self {
            name: name.to_string(),
            group: group.map(str::to_string),
            geometry_class,
            schema,
            features,
            selection: BTreeSet::new(),
        }
    }

    /// Features in ascending id order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features
            .binary_search_by_key(&id, |f| f.id)
            .ok()
            .map(|i| &self.features[i])
    }

    pub(crate) fn feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        match self.features.binary_search_by_key(&id, |f| f.id) {
            Ok(i) => Some(&mut self.features[i]),
            Err(_) => None,
        }
    }

    pub(crate) fn remove_feature(&mut self, id: FeatureId) -> bool {
        match self.features.binary_search_by_key(&id, |f| f.id) {
            Ok(i) => {
                self.features.remove(i);
                self.selection.remove(&id);
                true
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }

    pub fn selection(&self) -> &BTreeSet<FeatureId> {
        &self.selection
    }

    /// Replace the current selection, dropping ids the layer doesn't hold
    pub fn select(&mut self, ids: impl IntoIterator<Item = FeatureId>) {
        let valid: BTreeSet<FeatureId> = ids
            .into_iter()
            .filter(|id| self.feature(*id).is_some())
            .collect();
        self.selection = valid;
    }
}
