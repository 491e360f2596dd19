// Fighter age in whole years on fight night.
use chrono::NaiveDate;

use polars::prelude::*;

use crate::error::StageError;
use crate::frame::{drop_existing, text_cells};
use crate::parse::parse_date;
use crate::pipeline::{Contract, Stage};
use crate::schema::{sided, BLUE, DATE, DOB, RED};

const DAYS_PER_YEAR: f64 = 365.25;

/// Whole years between birth and fight. `None` when either date is unknown or
/// the birth date comes after the fight.
pub fn age_at(fight: Option<NaiveDate>, birth: Option<NaiveDate>) -> Option<i64> {
    let days = (fight? - birth?).num_days();
    if days < 0 {
        return None;
    }
    Some((days as f64 / DAYS_PER_YEAR).floor() as i64)
}

/// Normalises `date` to ISO text, adds `B_age`/`R_age` and drops both birth dates.
pub struct FighterAge;

const ISO_DATE: &str = "%Y-%m-%d";

fn dates(frame: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>, StageError> {
    Ok(text_cells(frame, name)?
        .iter()
        .map(|cell| parse_date(cell.as_deref()))
        .collect())
}

impl Stage for FighterAge {
    fn name(&self) -> &'static str {
        "fighter_age"
    }

    fn contract(&self) -> Contract {
        Contract::default()
            .requires(vec![DATE.to_string(), sided(RED, DOB), sided(BLUE, DOB)])
            .produces(vec![sided(BLUE, "age"), sided(RED, "age")])
            .removes(vec![sided(RED, DOB), sided(BLUE, DOB)])
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let fight_dates = dates(frame, DATE)?;
        let mut out = frame.clone();

        for side in [BLUE, RED] {
            let births = dates(frame, &sided(side, DOB))?;
            let ages: Vec<Option<i64>> = fight_dates
                .iter()
                .zip(births)
                .map(|(fight, birth)| age_at(*fight, birth))
                .collect();
            out.with_column(Series::new(sided(side, "age").into(), ages))?;
        }

        let normalised: Vec<Option<String>> = fight_dates
            .iter()
            .map(|d| d.map(|d| d.format(ISO_DATE).to_string()))
            .collect();
        out.with_column(Series::new(DATE.into(), normalised))?;
        drop_existing(&out, &[sided(RED, DOB).as_str(), sided(BLUE, DOB).as_str()])
    }
}
