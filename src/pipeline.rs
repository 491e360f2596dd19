// Stage orchestration: contracts checked at assembly, typed outcomes per stage,
// checkpoint writes between stages.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use polars::prelude::DataFrame;
use serde::Serialize;

use crate::age::FighterAge;
use crate::config::{FailurePolicy, PipelineConfig};
use crate::encode::{DropDraws, OneHotEncode};
use crate::error::{PipelineError, StageError};
use crate::impute::Impute;
use crate::io::{load_fighters, load_fights, save_table};
use crate::join::{FighterIndex, ReferenceJoin};
use crate::preprocess::{
    ControlTimeSeconds, DropColumns, FillMissingWinner, FractionPairs, LastRoundSeconds,
    NormalizeMeasurements, Percentages, TitleBout, TotalFightTime, WeightClassLabel, WinnerSide,
};
use crate::schema::FIGHT_COLUMNS;
use crate::timing::TimeArithmetic;

/// Columns a stage reads, adds and removes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contract {
    pub requires: Vec<String>,
    pub produces: Vec<String>,
    pub removes: Vec<String>,
}

impl Contract {
    pub fn requires(mut self, columns: Vec<String>) -> Self {
        self.requires = columns;
        self
    }

    pub fn produces(mut self, columns: Vec<String>) -> Self {
        self.produces = columns;
        self
    }

    pub fn removes(mut self, columns: Vec<String>) -> Self {
        self.removes = columns;
        self
    }
}

/// One whole-table transform. Stages never add rows and never mutate their input.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn contract(&self) -> Contract;
    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError>;
}

pub enum Step {
    Transform(Box<dyn Stage>),
    /// Write the current table to disk.
    Checkpoint { label: &'static str, path: PathBuf },
}

impl Step {
    pub fn stage(stage: impl Stage + 'static) -> Self {
        Step::Transform(Box::new(stage))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageStatus {
    Applied,
    Skipped,
    Written,
}

/// One line of the run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome {
    pub stage: String,
    pub status: StageStatus,
    pub reason: Option<String>,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub outcomes: Vec<StageOutcome>,
}

impl PipelineReport {
    fn record(&mut self, stage: &str, status: StageStatus, reason: Option<String>, frame: &DataFrame) {
        self.outcomes.push(StageOutcome {
            stage: stage.to_string(),
            status,
            reason,
            rows: frame.height(),
            columns: frame.width(),
        });
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StageOutcome> {
        self.outcomes.iter().filter(|o| o.status == StageStatus::Skipped)
    }

    pub fn is_degraded(&self) -> bool {
        self.skipped().next().is_some()
    }

    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let report_err = |source| PipelineError::Report { path: path.to_path_buf(), source };
        let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
        for outcome in &self.outcomes {
            wtr.serialize(outcome).map_err(report_err)?;
        }
        wtr.flush().map_err(|e| report_err(csv::Error::from(e)))?;
        Ok(())
    }
}

/// An ordered list of steps whose column contracts have been checked.
pub struct Pipeline {
    steps: Vec<Step>,
    policy: FailurePolicy,
}

impl Pipeline {
    /// Walk the declared contracts from `initial` and refuse an order in which
    /// a stage requires a column nothing before it provides.
    pub fn assemble(
        initial: &[&str],
        steps: Vec<Step>,
        policy: FailurePolicy,
    ) -> Result<Self, PipelineError> {
        let mut available: HashSet<String> = initial.iter().map(|c| c.to_string()).collect();
        for step in &steps {
            let Step::Transform(stage) = step else { continue };
            let contract = stage.contract();
            if let Some(column) = contract.requires.iter().find(|c| !available.contains(*c)) {
                return Err(PipelineError::BrokenStageOrder {
                    stage: stage.name(),
                    column: column.clone(),
                });
            }
            for column in &contract.removes {
                available.remove(column);
            }
            available.extend(contract.produces);
        }
        Ok(Self { steps, policy })
    }

    pub fn run(&self, mut table: DataFrame) -> Result<(DataFrame, PipelineReport), PipelineError> {
        let mut report = PipelineReport::default();
        for step in &self.steps {
            match step {
                Step::Transform(stage) => match stage.apply(&table) {
                    Ok(next) => {
                        log::debug!(
                            "{}: {} rows x {} columns",
                            stage.name(),
                            next.height(),
                            next.width()
                        );
                        debug_assert!(next.height() <= table.height());
                        table = next;
                        report.record(stage.name(), StageStatus::Applied, None, &table);
                    }
                    Err(err) if self.policy == FailurePolicy::Continue => {
                        log::warn!("stage `{}` skipped: {err}", stage.name());
                        report.record(stage.name(), StageStatus::Skipped, Some(err.to_string()), &table);
                    }
                    Err(source) => {
                        return Err(PipelineError::StageAborted { stage: stage.name(), source });
                    }
                },
                Step::Checkpoint { label, path } => {
                    save_table(&table, path)?;
                    log::info!("{label} checkpoint written to {}", path.display());
                    report.record(label, StageStatus::Written, None, &table);
                }
            }
        }
        Ok((table, report))
    }
}

/// Cleanup applied to the fighter table before it is indexed for the join.
pub fn reference_steps() -> Vec<Step> {
    vec![
        Step::stage(DropColumns::future_fighter_stats()),
        Step::stage(NormalizeMeasurements),
    ]
}

/// The fight-table stage order. Later stages read columns earlier ones create.
pub fn fight_steps(config: &PipelineConfig, index: Rc<FighterIndex>) -> Vec<Step> {
    vec![
        Step::stage(FractionPairs),
        Step::stage(FillMissingWinner),
        Step::stage(Percentages),
        Step::stage(TitleBout),
        Step::stage(WeightClassLabel),
        Step::stage(LastRoundSeconds),
        Step::stage(ControlTimeSeconds),
        Step::stage(TotalFightTime::new(TimeArithmetic::new(config.formats.clone()))),
        Step::stage(DropColumns::fight_details()),
        Step::stage(WinnerSide),
        Step::stage(ReferenceJoin::red(index.clone())),
        Step::stage(ReferenceJoin::blue(index)),
        Step::stage(FighterAge),
        Step::Checkpoint { label: "compiled", path: config.compiled_path.clone() },
        Step::stage(Impute),
        Step::stage(DropDraws),
        Step::stage(OneHotEncode),
        Step::Checkpoint { label: "preprocessed", path: config.preprocessed_path.clone() },
    ]
}

/// Load both tables, run every stage and write both checkpoints.
pub fn preprocess_files(config: &PipelineConfig) -> Result<(DataFrame, PipelineReport), PipelineError> {
    let fights = load_fights(&config.fights_path)?;
    let fighters = load_fighters(&config.fighters_path)?;

    let reference = Pipeline::assemble(&[], reference_steps(), config.policy)?;
    let (fighters, mut report) = reference.run(fighters)?;
    let index = FighterIndex::build(&fighters)
        .map_err(|source| PipelineError::StageAborted { stage: "index_fighters", source })?;
    log::info!("indexed {} fighters ({})", index.len(), index.attribute_names().join(", "));

    let pipeline = Pipeline::assemble(&FIGHT_COLUMNS, fight_steps(config, Rc::new(index)), config.policy)?;
    let (table, fight_report) = pipeline.run(fights)?;
    report.outcomes.extend(fight_report.outcomes);

    if report.is_degraded() {
        log::warn!("finished in degraded mode: {} stage(s) skipped", report.skipped().count());
    }
    Ok((table, report))
}
