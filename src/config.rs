// Run configuration.
use std::path::PathBuf;

use crate::timing::RoundFormats;

/// What the orchestrator does when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log, record the failure and keep going without that stage's columns.
    #[default]
    Continue,
    /// Stop the run at the first failing stage.
    Abort,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Semicolon-delimited raw fight table.
    pub fights_path: PathBuf,
    /// Comma-delimited fighter table indexed by `fighter_name`.
    pub fighters_path: PathBuf,
    pub compiled_path: PathBuf,
    pub preprocessed_path: PathBuf,
    pub formats: RoundFormats,
    pub policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fights_path: PathBuf::from("data/total_fight_data.csv"),
            fighters_path: PathBuf::from("data/fighter_details.csv"),
            compiled_path: PathBuf::from("data/data.csv"),
            preprocessed_path: PathBuf::from("data/preprocessed_data.csv"),
            formats: RoundFormats::default(),
            policy: FailurePolicy::Continue,
        }
    }
}
