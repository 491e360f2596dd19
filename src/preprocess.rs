// Column-level transform stages over the fight table, plus the fighter-table cleanup stages.
use polars::prelude::{DataFrame, DataType, NamedFrom, Series};

use crate::error::StageError;
use crate::frame::{
    drop_existing, float_cells, has_column, int_cells, is_numeric, require, require_all, text_cells,
};
use crate::parse::{
    clamp_fraction, parse_clock, parse_fraction_pair, parse_height_cms, parse_percentage,
    parse_reach_cms, parse_title_bout, parse_weight_class, parse_weight_lbs,
};
use crate::pipeline::{Contract, Stage};
use crate::schema::*;
use crate::timing::TimeArithmetic;

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Removes whichever of a fixed list of columns are present.
pub struct DropColumns {
    name: &'static str,
    columns: Vec<String>,
}

impl DropColumns {
    pub fn new(name: &'static str, columns: Vec<String>) -> Self {
        Self { name, columns }
    }

    /// Career statistics that leak results of later fights.
    pub fn future_fighter_stats() -> Self {
        Self::new("drop_future_fighter_stats", owned(&FUTURE_FIGHTER_STATS))
    }

    /// Per-fight strike and time breakdown, pruned from the compiled table.
    pub fn fight_details() -> Self {
        Self::new("prune_fight_details", detail_columns())
    }
}

impl Stage for DropColumns {
    fn name(&self) -> &'static str {
        self.name
    }

    fn contract(&self) -> Contract {
        Contract::default().removes(self.columns.clone())
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let names: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        drop_existing(frame, &names)
    }
}

/// Converts scraped imperial measurement strings into the numeric fighter columns.
pub struct NormalizeMeasurements;

type MeasureParser = fn(Option<&str>) -> Option<f64>;

const MEASUREMENTS: [(&str, &str, MeasureParser); 3] = [
    ("Height", HEIGHT, parse_height_cms),
    ("Reach", REACH, parse_reach_cms),
    ("Weight", WEIGHT, parse_weight_lbs),
];

impl Stage for NormalizeMeasurements {
    fn name(&self) -> &'static str {
        "normalize_measurements"
    }

    fn contract(&self) -> Contract {
        Contract::default()
            .produces(MEASUREMENTS.iter().map(|(_, to, _)| to.to_string()).collect())
            .removes(MEASUREMENTS.iter().map(|(from, _, _)| from.to_string()).collect())
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let mut out = frame.clone();
        for (raw, target, parser) in MEASUREMENTS {
            if !has_column(frame, raw) {
                continue;
            }
            let values: Vec<Option<f64>> = if is_numeric(require(frame, raw)?.dtype()) {
                float_cells(frame, raw)?
            } else {
                text_cells(frame, raw)?
                    .iter()
                    .map(|cell| parser(cell.as_deref()))
                    .collect()
            };
            out.with_column(Series::new(target.into(), values))?;
            out = out.drop(raw)?;
        }
        Ok(out)
    }
}

/// `"L of A"` counters -> `<col>_att` and `<col>_landed`; drops the raw strings.
pub struct FractionPairs;

impl Stage for FractionPairs {
    fn name(&self) -> &'static str {
        "split_fraction_pairs"
    }

    fn contract(&self) -> Contract {
        let produces = FRACTION_COLUMNS
            .iter()
            .flat_map(|c| [format!("{c}{ATTEMPT_SUFFIX}"), format!("{c}{LANDED_SUFFIX}")])
            .collect();
        Contract::default()
            .requires(owned(&FRACTION_COLUMNS))
            .produces(produces)
            .removes(owned(&FRACTION_COLUMNS))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        require_all(frame, &FRACTION_COLUMNS)?;
        let mut out = frame.clone();
        for column in FRACTION_COLUMNS {
            let (attempted, landed): (Vec<i64>, Vec<i64>) = text_cells(frame, column)?
                .iter()
                .map(|cell| parse_fraction_pair(cell.as_deref(), column))
                .unzip();
            out.with_column(Series::new(format!("{column}{ATTEMPT_SUFFIX}").into(), attempted))?;
            out.with_column(Series::new(format!("{column}{LANDED_SUFFIX}").into(), landed))?;
        }
        drop_existing(&out, &FRACTION_COLUMNS)
    }
}

/// A fight with no recorded winner is a draw.
pub struct FillMissingWinner;

impl Stage for FillMissingWinner {
    fn name(&self) -> &'static str {
        "fill_missing_winner"
    }

    fn contract(&self) -> Contract {
        Contract::default().requires(owned(&[WINNER]))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let winners: Vec<String> = text_cells(frame, WINNER)?
            .into_iter()
            .map(|w| w.unwrap_or_else(|| "Draw".to_string()))
            .collect();
        let mut out = frame.clone();
        out.with_column(Series::new(WINNER.into(), winners))?;
        Ok(out)
    }
}

/// Percentage strings -> fractions in [0, 1]. Cells already numeric pass
/// through unscaled, clamped to the same range.
pub struct Percentages;

impl Stage for Percentages {
    fn name(&self) -> &'static str {
        "percentages_to_fractions"
    }

    fn contract(&self) -> Contract {
        Contract::default().requires(owned(&PERCENT_COLUMNS))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        require_all(frame, &PERCENT_COLUMNS)?;
        let mut out = frame.clone();
        for column in PERCENT_COLUMNS {
            let dtype = require(frame, column)?.dtype().clone();
            let values: Vec<f64> = if is_numeric(&dtype) || dtype == DataType::Boolean {
                float_cells(frame, column)?
                    .into_iter()
                    .map(|v| v.map_or(0.0, clamp_fraction))
                    .collect()
            } else {
                text_cells(frame, column)?
                    .iter()
                    .map(|cell| parse_percentage(cell.as_deref()))
                    .collect()
            };
            out.with_column(Series::new(column.into(), values))?;
        }
        Ok(out)
    }
}

pub struct TitleBout;

impl Stage for TitleBout {
    fn name(&self) -> &'static str {
        "title_bout"
    }

    fn contract(&self) -> Contract {
        Contract::default()
            .requires(owned(&[FIGHT_TYPE]))
            .produces(owned(&[TITLE_BOUT]))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let flags: Vec<bool> = text_cells(frame, FIGHT_TYPE)?
            .iter()
            .map(|cell| parse_title_bout(cell.as_deref()))
            .collect();
        let mut out = frame.clone();
        out.with_column(Series::new(TITLE_BOUT.into(), flags))?;
        Ok(out)
    }
}

/// Fight type -> identifier-safe weight-class label.
pub struct WeightClassLabel;

impl Stage for WeightClassLabel {
    fn name(&self) -> &'static str {
        "weight_class"
    }

    fn contract(&self) -> Contract {
        Contract::default()
            .requires(owned(&[FIGHT_TYPE]))
            .produces(owned(&[WEIGHT_CLASS]))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let labels: Vec<&str> = text_cells(frame, FIGHT_TYPE)?
            .iter()
            .map(|cell| parse_weight_class(cell.as_deref()).label())
            .collect();
        let mut out = frame.clone();
        out.with_column(Series::new(WEIGHT_CLASS.into(), labels))?;
        Ok(out)
    }
}

/// Last-round clock string -> seconds, in place.
pub struct LastRoundSeconds;

impl Stage for LastRoundSeconds {
    fn name(&self) -> &'static str {
        "last_round_seconds"
    }

    fn contract(&self) -> Contract {
        Contract::default().requires(owned(&[LAST_ROUND_TIME]))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let seconds: Vec<i64> = text_cells(frame, LAST_ROUND_TIME)?
            .iter()
            .map(|cell| parse_clock(cell.as_deref()))
            .collect();
        let mut out = frame.clone();
        out.with_column(Series::new(LAST_ROUND_TIME.into(), seconds))?;
        Ok(out)
    }
}

/// Control time per corner -> `<col>_time(seconds)`; drops the raw strings.
pub struct ControlTimeSeconds;

impl Stage for ControlTimeSeconds {
    fn name(&self) -> &'static str {
        "control_time_seconds"
    }

    fn contract(&self) -> Contract {
        Contract::default()
            .requires(owned(&CTRL_COLUMNS))
            .produces(CTRL_COLUMNS.iter().map(|c| format!("{c}{CTRL_SUFFIX}")).collect())
            .removes(owned(&CTRL_COLUMNS))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        require_all(frame, &CTRL_COLUMNS)?;
        let mut out = frame.clone();
        for column in CTRL_COLUMNS {
            let seconds: Vec<i64> = text_cells(frame, column)?
                .iter()
                .map(|cell| parse_clock(cell.as_deref()))
                .collect();
            out.with_column(Series::new(format!("{column}{CTRL_SUFFIX}").into(), seconds))?;
        }
        drop_existing(&out, &CTRL_COLUMNS)
    }
}

/// Total seconds fought. Consumes the format, fight type and last-round clock.
pub struct TotalFightTime {
    arithmetic: TimeArithmetic,
}

impl TotalFightTime {
    pub fn new(arithmetic: TimeArithmetic) -> Self {
        Self { arithmetic }
    }
}

impl Stage for TotalFightTime {
    fn name(&self) -> &'static str {
        "total_fight_time"
    }

    fn contract(&self) -> Contract {
        Contract::default()
            .requires(owned(&[FORMAT, LAST_ROUND, LAST_ROUND_TIME]))
            .produces(owned(&[TOTAL_TIME]))
            .removes(owned(&[FORMAT, FIGHT_TYPE, LAST_ROUND_TIME]))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let formats = text_cells(frame, FORMAT)?;
        let rounds = int_cells(frame, LAST_ROUND)?;
        let clocks = int_cells(frame, LAST_ROUND_TIME)?;
        let totals: Vec<i64> = formats
            .iter()
            .zip(rounds)
            .zip(clocks)
            .map(|((format, round), clock)| {
                self.arithmetic.total_fight_seconds(format.as_deref(), round, clock)
            })
            .collect();
        let mut out = frame.clone();
        out.with_column(Series::new(TOTAL_TIME.into(), totals))?;
        drop_existing(&out, &[FORMAT, FIGHT_TYPE, LAST_ROUND_TIME])
    }
}

/// Winner name -> `Red` / `Blue` / `Draw` / `Unknown`.
pub struct WinnerSide;

impl WinnerSide {
    fn resolve(red: Option<&str>, blue: Option<&str>, winner: Option<&str>) -> &'static str {
        let (Some(red), Some(blue), Some(winner)) = (red, blue, winner) else {
            return "Unknown";
        };
        let winner = winner.trim();
        if red.trim() == winner {
            "Red"
        } else if blue.trim() == winner {
            "Blue"
        } else if winner.eq_ignore_ascii_case("draw") {
            "Draw"
        } else {
            "Unknown"
        }
    }
}

impl Stage for WinnerSide {
    fn name(&self) -> &'static str {
        "winner_side"
    }

    fn contract(&self) -> Contract {
        Contract::default().requires(owned(&[R_FIGHTER, B_FIGHTER, WINNER]))
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let red = text_cells(frame, R_FIGHTER)?;
        let blue = text_cells(frame, B_FIGHTER)?;
        let winner = text_cells(frame, WINNER)?;
        let sides: Vec<&str> = red
            .iter()
            .zip(&blue)
            .zip(&winner)
            .map(|((r, b), w)| Self::resolve(r.as_deref(), b.as_deref(), w.as_deref()))
            .collect();
        let mut out = frame.clone();
        out.with_column(Series::new(WINNER.into(), sides))?;
        Ok(out)
    }
}
