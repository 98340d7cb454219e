//! In-memory project: the feature store the checkers read from
//!
//! Layers are resolved by name (first match wins, like a GIS project) and
//! optionally scoped to a group. Projects load from and save to JSON.

use super::edit::EditSession;
use super::feature::Feature;
use super::layer::{GeometryClass, Layer, LayerSchema};
use crate::error::{QaError, QaResult};
use crate::report::Selection;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// On-disk layer representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub geometry_class: GeometryClass,
    #[serde(default)]
    pub fields: LayerSchema,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// On-disk project representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub layers: Vec<LayerFile>,
}

#[derive(Debug, Clone, Default)]
pub struct Project {
    layers: Vec<Layer>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.add_layer(layer);
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Layer lookup that treats absence as a missing prerequisite
    pub fn require_layer(&self, name: &str) -> QaResult<&Layer> {
        self.layer(name)
            .ok_or_else(|| QaError::MissingLayer(name.to_string()))
    }

    /// Layers of a group, in project order
    pub fn group_layers(&self, group: &str) -> QaResult<Vec<&Layer>> {
        let layers: Vec<&Layer> = self.layers.iter().filter(|l| l.in_group(group)).collect();
        if layers.is_empty() {
            return Err(QaError::MissingGroup(group.to_string()));
        }
        Ok(layers)
    }

    /// Open an edit session on a layer
    pub fn edit(&mut self, name: &str) -> QaResult<EditSession<'_>> {
        let layer = self
            .layer_mut(name)
            .ok_or_else(|| QaError::MissingLayer(name.to_string()))?;
        Ok(EditSession::begin(layer))
    }

    /// Replace the selection of every layer the selection touches
    pub fn apply_selection(&mut self, selection: &Selection) {
        for (name, ids) in selection.iter() {
            if let Some(layer) = self.layer_mut(name) {
                layer.select(ids.iter().copied());
            }
        }
    }

    pub fn from_file_data(file: ProjectFile) -> Self {
        let layers = file
            .layers
            .into_iter()
            .map(|l| {
                Layer::new(
                    &l.name,
                    l.group.as_deref(),
                    l.geometry_class,
                    l.fields,
                    l.features,
                )
            })
            .collect();
        Self { layers }
    }

    pub fn to_file_data(&self) -> ProjectFile {
        ProjectFile {
            layers: self
                .layers
                .iter()
                .map(|l| LayerFile {
                    name: l.name.clone(),
                    group: l.group.clone(),
                    geometry_class: l.geometry_class,
                    fields: l.schema.clone(),
                    features: l.features().to_vec(),
                })
                .collect(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> QaResult<Self> {
        let file = File::open(path.as_ref())?;
        let data: ProjectFile = serde_json::from_reader(BufReader::new(file))?;
        let project = Self::from_file_data(data);
        info!(
            "[Project] Loaded {} layers from {}",
            project.layers.len(),
            path.as_ref().display()
        );
        Ok(project)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> QaResult<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.to_file_data())?;
        info!("[Project] Saved to {}", path.as_ref().display());
        Ok(())
    }
}
