//! Feature store model
//!
//! # Submodules
//! - `value` - Loosely typed attribute values
//! - `feature` - Identified records with geometry and attributes
//! - `layer` - Id-ordered feature collections and their schema
//! - `project` - Named layers organised in groups, JSON persistence
//! - `edit` - Per-layer staged edit sessions

mod edit;
mod feature;
mod layer;
mod project;
mod value;

pub use edit::EditSession;
pub use feature::{Feature, FeatureId};
pub use layer::{GeometryClass, Layer, LayerSchema};
pub use project::{LayerFile, Project, ProjectFile};
pub use value::AttrValue;
