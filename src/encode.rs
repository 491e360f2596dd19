// Final shaping: binary outcomes only, one-hot categoricals, no identifying columns.
use polars::prelude::*;

use crate::error::StageError;
use crate::frame::{drop_existing, has_column, require, text_cells};
use crate::pipeline::{Contract, Stage};
use crate::schema::{encoded_columns, IDENTIFYING_COLUMNS, WINNER};

/// Removes drawn fights. A table without a winner column passes through.
pub struct DropDraws;

impl Stage for DropDraws {
    fn name(&self) -> &'static str {
        "drop_draws"
    }

    fn contract(&self) -> Contract {
        Contract::default()
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        if !has_column(frame, WINNER) {
            return Ok(frame.clone());
        }
        let keep: BooleanChunked = text_cells(frame, WINNER)?
            .iter()
            .map(|w| w.as_deref() != Some("Draw"))
            .collect();
        Ok(frame.filter(&keep)?)
    }
}

/// One-hot encodes the categorical columns that are still present into
/// `column_value` indicators, then drops them together with the identifying
/// columns. Running it again is a no-op.
pub struct OneHotEncode;

impl Stage for OneHotEncode {
    fn name(&self) -> &'static str {
        "one_hot_encode"
    }

    fn contract(&self) -> Contract {
        let mut removes: Vec<String> = encoded_columns().to_vec();
        removes.extend(IDENTIFYING_COLUMNS.iter().map(|c| c.to_string()));
        Contract::default().removes(removes)
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let mut out = frame.clone();
        let sources: Vec<String> = encoded_columns()
            .into_iter()
            .filter(|c| has_column(frame, c))
            .collect();

        for source in &sources {
            let dummies = require(frame, source)?.to_dummies(Some("_"), false)?;
            for indicator in dummies.get_columns() {
                out.with_column(indicator.as_materialized_series().cast(&DataType::Boolean)?)?;
            }
        }

        let mut dropped: Vec<&str> = sources.iter().map(String::as_str).collect();
        dropped.extend(IDENTIFYING_COLUMNS);
        drop_existing(&out, &dropped)
    }
}
