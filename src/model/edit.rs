//! Per-layer edit sessions
//!
//! Changes are staged against a single layer and only become visible on
//! `commit`. Dropping a session without committing discards it.

use super::feature::FeatureId;
use super::layer::Layer;
use super::value::AttrValue;
use crate::error::{QaError, QaResult};
use tracing::debug;

#[derive(Debug, Clone)]
enum Edit {
    SetAttribute {
        id: FeatureId,
        field: String,
        value: AttrValue,
    },
    Delete(FeatureId),
}

pub struct EditSession<'a> {
    layer: &'a mut Layer,
    pending: Vec<Edit>,
}

impl<'a> EditSession<'a> {
    pub(crate) fn begin(layer: &'a mut Layer) -> Self {
        debug!("[Edit] begin on '{}'", layer.name);
        Self {
            layer,
            pending: Vec::new(),
        }
    }

    /// Read access to the committed state of the layer
    pub fn layer(&self) -> &Layer {
        self.layer
    }

    fn require_feature(&self, id: FeatureId) -> QaResult<()> {
        if self.layer.feature(id).is_none() {
            return Err(QaError::MissingFeature {
                layer: self.layer.name.clone(),
                id,
            });
        }
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        id: FeatureId,
        field: &str,
        value: impl Into<AttrValue>,
    ) -> QaResult<()> {
        if !self.layer.schema.has(field) {
            return Err(QaError::MissingField {
                layer: self.layer.name.clone(),
                field: field.to_string(),
            });
        }
        self.require_feature(id)?;
        self.pending.push(Edit::SetAttribute {
            id,
            field: field.to_string(),
            value: value.into(),
        });
        Ok(())
    }

    pub fn delete_feature(&mut self, id: FeatureId) -> QaResult<()> {
        self.require_feature(id)?;
        self.pending.push(Edit::Delete(id));
        Ok(())
    }

    /// Apply every staged edit in order; returns the number applied
    pub fn commit(self) -> usize {
        let EditSession { layer, pending } = self;
        let mut applied = 0;
        for edit in pending {
            let done = match edit {
                Edit::SetAttribute { id, field, value } => match layer.feature_mut(id) {
                    Some(feature) => {
                        feature.attributes.insert(field, value);
                        true
                    }
                    None => false,
                },
                Edit::Delete(id) => layer.remove_feature(id),
            };
            if done {
                applied += 1;
            }
        }
        debug!("[Edit] commit on '{}': {} edits applied", layer.name, applied);
        applied
    }

    pub fn discard(self) {
        debug!(
            "[Edit] discard on '{}': {} edits dropped",
            self.layer.name,
            self.pending.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Feature, GeometryClass, LayerSchema};

    fn layer() -> Layer {
        Layer::new(
            "Chambre",
            None,
            GeometryClass::Point,
            LayerSchema::new(["NOM"]),
            vec![Feature::new(1, None), Feature::new(2, None)],
        )
    }

    #[test]
    fn test_commit_applies_staged_edits() {
        let mut layer = layer();
        let mut session = EditSession::begin(&mut layer);
        session.set_attribute(1, "NOM", "C1").unwrap();
        session.delete_feature(2).unwrap();
        assert_eq!(session.commit(), 2);
        assert_eq!(layer.feature(1).unwrap().text("NOM").as_deref(), Some("C1"));
        assert!(layer.feature(2).is_none());
    }

    #[test]
    fn test_discard_leaves_layer_untouched() {
        let mut layer = layer();
        let mut session = EditSession::begin(&mut layer);
        session.set_attribute(1, "NOM", "C1").unwrap();
        session.discard();
        assert!(layer.feature(1).unwrap().attr("NOM").is_null());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut layer = layer();
        let mut session = EditSession::begin(&mut layer);
        let err = session.set_attribute(1, "TYPE", "x").unwrap_err();
        assert!(matches!(err, QaError::MissingField { .. }));
    }
}
