//! Rename-all: zone-based point names, endpoint-based line names
//!
//! Points are renamed first and committed, so line names are built from
//! the new point names.

use super::RemediationReport;
use crate::error::{QaError, QaResult};
use crate::geometry::{contains, endpoints, point_geometry, usable, SpatialIndex};
use crate::model::{FeatureId, Project};
use crate::report::Remediation;
use crate::rules::names::{
    BATIMENT, CANALISATION, CHAMBRE, ID, NOM, POINT_GC, POINT_TECHNIQUE, POTEAU, SITE, SUPPORT,
    TRANCHEE,
};
use geo::{Coord, Geometry, Rect};
use tracing::{debug, info};

pub const POINT_PREFIXES: &[(&str, &str)] = &[
    (CHAMBRE, "Cham_"),
    (POINT_TECHNIQUE, "PT_"),
    (POTEAU, "Pot_"),
    (BATIMENT, "Bati_"),
];

pub const LINE_PREFIXES: &[(&str, &str)] = &[
    (TRANCHEE, "Tran_"),
    (CANALISATION, "Canal_"),
    (SUPPORT, "Supp_"),
];

/// Layers a line end can be attached to, in lookup priority, with the
/// field holding the name to use
pub const CONNECTION_FIELDS: &[(&str, &str)] = &[
    (CHAMBRE, NOM),
    (POINT_TECHNIQUE, NOM),
    (POTEAU, NOM),
    (SITE, NOM),
    (POINT_GC, ID),
];

fn zero_pad(num: u64) -> String {
    format!("{:05}", num)
}

pub fn rename_all(project: &mut Project, zone: &str) -> QaResult<RemediationReport> {
    let zone = zone.trim();
    if zone.is_empty() {
        return Err(QaError::InvalidArgument("zone name must not be empty".to_string()));
    }
    let mut report = RemediationReport::new(Remediation::RenameAll);

    for &(name, prefix) in POINT_PREFIXES {
        if project.layer(name).is_none() {
            report.warn(format!("layer '{}' not found", name));
            continue;
        }
        rename_points(project, name, prefix, zone, &mut report)?;
    }

    // Point names are committed by now; line renames never touch these layers
    let connections = load_connections(project, &mut report);
    for &(name, prefix) in LINE_PREFIXES {
        if project.layer(name).is_none() {
            report.warn(format!("layer '{}' not found", name));
            continue;
        }
        rename_lines(project, name, prefix, &connections, &mut report)?;
    }

    info!(
        "[Remediation] rename_all '{}': {} edit(s), {} failure(s)",
        zone,
        report.total_applied(),
        report.errors.len()
    );
    Ok(report)
}

/// Renumber `id` from 1 in feature order, when the layer has it
fn renumber_ids(project: &mut Project, name: &str, report: &mut RemediationReport) -> QaResult<()> {
    let mut session = project.edit(name)?;
    if !session.layer().schema.has(ID) {
        session.discard();
        return Ok(());
    }
    let ids: Vec<FeatureId> = session.layer().features().iter().map(|f| f.id).collect();
    for (i, fid) in ids.into_iter().enumerate() {
        session.set_attribute(fid, ID, (i + 1) as i64)?;
    }
    let applied = session.commit();
    report.record_applied(name, applied);
    Ok(())
}

fn rename_points(
    project: &mut Project,
    name: &str,
    prefix: &str,
    zone: &str,
    report: &mut RemediationReport,
) -> QaResult<()> {
    renumber_ids(project, name, report)?;

    let mut session = project.edit(name)?;
    if !session.layer().schema.has(NOM) {
        report.warn(format!("layer '{}' has no {} field, names left as is", name, NOM));
        session.discard();
        return Ok(());
    }
    let has_id = session.layer().schema.has(ID);
    let names: Vec<(FeatureId, String)> = session
        .layer()
        .features()
        .iter()
        .map(|f| {
            let num = if has_id {
                f.text(ID)
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(f.id + 1)
            } else {
                f.id + 1
            };
            (f.id, format!("{}-{}{}", zone, prefix, zero_pad(num)))
        })
        .collect();
    for (fid, new_name) in names {
        session.set_attribute(fid, NOM, new_name)?;
    }
    let applied = session.commit();
    report.record_applied(name, applied);
    debug!("[Remediation] {}: {} point name(s) written", name, applied);
    Ok(())
}

/// Snapshot of a connection layer: id, geometry and trimmed name value of
/// each usable feature, indexed by position
struct Connection {
    layer: String,
    features: Vec<(FeatureId, Geometry<f64>, Option<String>)>,
    index: SpatialIndex,
}

fn load_connections(project: &Project, report: &mut RemediationReport) -> Vec<Connection> {
    let mut connections = Vec::new();
    for &(name, field) in CONNECTION_FIELDS {
        let Some(layer) = project.layer(name) else {
            report.warn(format!("connection layer '{}' not found", name));
            continue;
        };
        let features: Vec<(FeatureId, Geometry<f64>, Option<String>)> = layer
            .features()
            .iter()
            .filter_map(|f| {
                let g = usable(f.geometry.as_ref())?;
                let value = f.attr(field).as_trimmed().filter(|v| !v.is_empty());
                Some((f.id, g.clone(), value))
            })
            .collect();
        let mut index = SpatialIndex::new();
        for (pos, (_, g, _)) in features.iter().enumerate() {
            index.insert(pos as u64, g);
        }
        connections.push(Connection {
            layer: layer.name.clone(),
            features,
            index,
        });
    }
    connections
}

enum Lookup {
    Found(String),
    /// A feature contains the point but has no value in its name field
    Blank { layer: String, id: FeatureId },
    NotFound,
}

/// First feature, in connection priority, whose geometry contains `c`
fn connection_name(c: Coord<f64>, connections: &[Connection]) -> Lookup {
    let point = point_geometry(c);
    let rect = Rect::new(c, c);
    for conn in connections {
        for pos in conn.index.query(&rect) {
            let Some((id, g, value)) = conn.features.get(pos as usize) else {
                continue;
            };
            if !contains(g, &point) {
                continue;
            }
            return match value {
                Some(value) => Lookup::Found(value.clone()),
                None => Lookup::Blank {
                    layer: conn.layer.clone(),
                    id: *id,
                },
            };
        }
    }
    Lookup::NotFound
}

fn rename_lines(
    project: &mut Project,
    name: &str,
    prefix: &str,
    connections: &[Connection],
    report: &mut RemediationReport,
) -> QaResult<()> {
    renumber_ids(project, name, report)?;

    // Read pass over the connection layers, then a write pass on the line layer
    let mut renames: Vec<(FeatureId, String)> = Vec::new();
    let mut unresolved: Vec<FeatureId> = Vec::new();
    {
        let lines = project.require_layer(name)?;
        for f in lines.features() {
            let Some((a, b)) = f.geometry.as_ref().and_then(endpoints) else {
                continue;
            };
            let mut resolve = |c: Coord<f64>| match connection_name(c, connections) {
                Lookup::Found(value) => Some(value),
                Lookup::Blank { layer, id } => {
                    report.fail(
                        &layer,
                        id,
                        format!("a feature of '{}' has no value in its connection field", layer),
                    );
                    None
                }
                Lookup::NotFound => None,
            };
            let start = resolve(a);
            let end = resolve(b);
            match (start, end) {
                (Some(s), Some(e)) if s != e => {
                    renames.push((f.id, format!("{}{}-{}", prefix, s, e)));
                }
                (Some(_), Some(_)) => {}
                _ => unresolved.push(f.id),
            }
        }
    }

    let mut session = project.edit(name)?;
    if session.layer().schema.has(NOM) {
        for (fid, new_name) in renames {
            session.set_attribute(fid, NOM, new_name)?;
        }
    } else if !renames.is_empty() {
        report.warn(format!("layer '{}' has no {} field, names left as is", name, NOM));
    }
    let applied = session.commit();
    report.record_applied(name, applied);

    if !unresolved.is_empty() {
        let count = unresolved.len();
        for fid in unresolved {
            report.failed.flag(name, fid);
        }
        report
            .errors
            .push(format!("{} badly connected feature(s) in '{}'", count, name));
    }
    Ok(())
}
