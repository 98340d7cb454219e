//! Consistency checkers
//!
//! Each checker reads the project and returns a `CheckReport`. Checkers
//! never mutate the project: applying the report's selection and running
//! remediation is up to the caller.
//!
//! # Submodules
//! - `geometry_duplicates` - Exact duplicates, forbidden overlaps, line overlaps, minimum spacing
//! - `name_duplicates` - Repeated NOM / business id values
//! - `null_values` - Empty attribute values in the infrastructure group
//! - `phantom` - Null, empty or invalid geometries
//! - `snapping` - Line endpoints on authorised points, isolated points
//! - `containment` - Ducts inside trenches and trenches under ducts
//! - `duct_type` - TYPE CANAL against the entities at both duct ends
//! - `support_type` - Support TYPE against its end points
//! - `chamber_duct` - Duct CPS code against touching chamber types
//! - `cps_trench` - Duct CPS code against overlapping trench categories
//! - `chamber_function` - Chamber FONCTION from its distribution duct count

mod chamber_duct;
mod chamber_function;
mod containment;
mod cps_trench;
mod duct_type;
mod geometry_duplicates;
mod name_duplicates;
mod null_values;
mod phantom;
mod snapping;
mod support_type;

pub use chamber_duct::ChamberDuctChecker;
pub use chamber_function::ChamberFunctionChecker;
pub use containment::ContainmentChecker;
pub use cps_trench::CpsTrenchChecker;
pub use duct_type::DuctTypeChecker;
pub use geometry_duplicates::GeometryDuplicatesChecker;
pub use name_duplicates::NameDuplicatesChecker;
pub use null_values::NullValuesChecker;
pub use phantom::PhantomChecker;
pub use snapping::SnappingChecker;
pub use support_type::SupportTypeChecker;

pub(crate) use phantom::is_phantom;

use crate::config::QaConfig;
use crate::error::{QaError, QaResult};
use crate::geometry::usable;
use crate::model::{Feature, Project};
use crate::report::CheckReport;
use crate::rules::RuleTables;
use geo::Geometry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single consistency rule over one or more layers
pub trait Checker {
    fn name(&self) -> &'static str;

    /// Run the rule. `Err` means a prerequisite is missing or the run was
    /// cancelled; data problems are findings in the returned report.
    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport>;
}

/// Shared cancellation flag, cloned into whoever may cancel a run
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub checker: &'static str,
    pub done: usize,
    pub total: usize,
}

/// Everything a checker reads during a run
pub struct CheckContext<'a> {
    pub project: &'a Project,
    pub config: &'a QaConfig,
    pub rules: &'a RuleTables,
    cancel: Option<&'a CancelToken>,
    progress: Option<&'a dyn Fn(Progress)>,
}

impl<'a> CheckContext<'a> {
    pub fn new(project: &'a Project, config: &'a QaConfig, rules: &'a RuleTables) -> Self {
        Self {
            project,
            config,
            rules,
            cancel: None,
            progress: None,
        }
    }

    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Fn(Progress)) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    /// Called once per processed item. Every `progress_chunk` items (and on
    /// the last one) checks for cancellation and reports progress.
    pub fn checkpoint(&self, checker: &'static str, done: usize, total: usize) -> QaResult<()> {
        if done % self.config.progress_chunk != 0 && done != total {
            return Ok(());
        }
        if self.is_cancelled() {
            return Err(QaError::Cancelled);
        }
        if let Some(progress) = self.progress {
            progress(Progress {
                checker,
                done,
                total,
            });
        }
        Ok(())
    }
}

/// Geometry of a feature when it can go through topological predicates
pub(crate) fn geometry_of(feature: &Feature) -> Option<&Geometry<f64>> {
    usable(feature.geometry.as_ref())
}

/// The checkers, in run-all order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    GeometryDuplicates,
    NameDuplicates,
    NullValues,
    PhantomGeometry,
    Snapping,
    DuctTrenchContainment,
    DuctType,
    SupportType,
    ChamberDuctCps,
    DuctTrenchCps,
    ChamberFunction,
}

impl CheckKind {
    pub const ALL: [CheckKind; 11] = [
        CheckKind::GeometryDuplicates,
        CheckKind::NameDuplicates,
        CheckKind::NullValues,
        CheckKind::PhantomGeometry,
        CheckKind::Snapping,
        CheckKind::DuctTrenchContainment,
        CheckKind::DuctType,
        CheckKind::SupportType,
        CheckKind::ChamberDuctCps,
        CheckKind::DuctTrenchCps,
        CheckKind::ChamberFunction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::GeometryDuplicates => "geometry_duplicates",
            CheckKind::NameDuplicates => "name_duplicates",
            CheckKind::NullValues => "null_values",
            CheckKind::PhantomGeometry => "phantom_geometry",
            CheckKind::Snapping => "snapping",
            CheckKind::DuctTrenchContainment => "duct_trench_containment",
            CheckKind::DuctType => "duct_type",
            CheckKind::SupportType => "support_type",
            CheckKind::ChamberDuctCps => "chamber_duct_cps",
            CheckKind::DuctTrenchCps => "duct_trench_cps",
            CheckKind::ChamberFunction => "chamber_function",
        }
    }

    /// Build the checker. `group` only matters for snapping.
    pub fn checker(self, group: Option<&str>) -> Box<dyn Checker> {
        match self {
            CheckKind::GeometryDuplicates => Box::new(GeometryDuplicatesChecker),
            CheckKind::NameDuplicates => Box::new(NameDuplicatesChecker),
            CheckKind::NullValues => Box::new(NullValuesChecker),
            CheckKind::PhantomGeometry => Box::new(PhantomChecker),
            CheckKind::Snapping => Box::new(SnappingChecker::new(group)),
            CheckKind::DuctTrenchContainment => Box::new(ContainmentChecker),
            CheckKind::DuctType => Box::new(DuctTypeChecker),
            CheckKind::SupportType => Box::new(SupportTypeChecker),
            CheckKind::ChamberDuctCps => Box::new(ChamberDuctChecker),
            CheckKind::DuctTrenchCps => Box::new(CpsTrenchChecker),
            CheckKind::ChamberFunction => Box::new(ChamberFunctionChecker),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| QaError::InvalidArgument(format!("unknown check '{}'", s)))
    }
}

/// All eleven checkers in run-all order; snapping uses the configured group
pub fn all_checkers() -> Vec<Box<dyn Checker>> {
    CheckKind::ALL.into_iter().map(|k| k.checker(None)).collect()
}
