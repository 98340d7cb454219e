//! Quality checks for telecom infrastructure layers
//!
//! Eleven read-only checkers over an in-memory project (ducts, trenches,
//! chambers, poles, technical points...), three confirmed remediations, a
//! run-all orchestrator and a feature-count report. The `qa_server` binary
//! exposes all of it over line-delimited JSON-RPC.
//!
//! ```ignore
//! let project = Project::load("zone.json")?;
//! let config = QaConfig::default();
//! let rules = RuleTables::from_config(&config)?;
//! let ctx = CheckContext::new(&project, &config, &rules);
//! let run = run_all(&ctx);
//! println!("{}", run.summary());
//! ```

pub mod checks;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod remediation;
pub mod report;
pub mod rules;
pub mod runner;
pub mod server;

pub use checks::{all_checkers, CancelToken, CheckContext, CheckKind, Checker, Progress};
pub use config::QaConfig;
pub use error::{QaError, QaResult};
pub use model::{AttrValue, Feature, FeatureId, GeometryClass, Layer, LayerSchema, Project};
pub use remediation::RemediationReport;
pub use report::{CheckReport, Finding, FindingKind, Remediation, Selection, Severity};
pub use rules::RuleTables;
pub use runner::{layer_counts, run_all, CheckOutcome, RunReport};
