//! Server state management for the QA server

use crate::config::QaConfig;
use crate::error::QaResult;
use crate::model::Project;
use crate::rules::RuleTables;
use std::path::PathBuf;

/// In-memory state: the loaded project and the active configuration
pub struct ServerState {
    pub file_path: Option<PathBuf>,
    pub project: Option<Project>,
    pub config: QaConfig,
    pub rules: RuleTables,
    /// Set by remediations, cleared on save
    pub modified: bool,
}

impl ServerState {
    pub fn new() -> QaResult<Self> {
        Self::with_config(QaConfig::default())
    }

    pub fn with_config(config: QaConfig) -> QaResult<Self> {
        let rules = RuleTables::from_config(&config)?;
        Ok(Self {
            file_path: None,
            project: None,
            config,
            rules,
            modified: false,
        })
    }

    pub fn is_file_loaded(&self) -> bool {
        self.project.is_some()
    }

    /// Swap in a new configuration; the rule tables are rebuilt first so a
    /// bad configuration leaves the current one in place
    pub fn reconfigure(&mut self, config: QaConfig) -> QaResult<()> {
        let rules = RuleTables::from_config(&config)?;
        self.config = config;
        self.rules = rules;
        Ok(())
    }

    pub fn close(&mut self) {
        self.file_path = None;
        self.project = None;
        self.modified = false;
    }
}
