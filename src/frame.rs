// Column access over polars frames, in the shapes the stages need.
use polars::prelude::*;

use crate::error::StageError;

pub fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.column(name).is_ok()
}

pub fn column_names(frame: &DataFrame) -> Vec<String> {
    frame.get_column_names().iter().map(|n| n.to_string()).collect()
}

/// A missing column is a stage error, not a polars one.
pub fn require<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Series, StageError> {
    frame
        .column(name)
        .map(Column::as_materialized_series)
        .map_err(|_| StageError::MissingColumn(name.to_string()))
}

pub fn require_all(frame: &DataFrame, names: &[&str]) -> Result<(), StageError> {
    match names.iter().find(|n| !has_column(frame, n)) {
        Some(name) => Err(StageError::MissingColumn(name.to_string())),
        None => Ok(()),
    }
}

/// Cells as owned strings. Non-text columns are cast first.
pub fn text_cells(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>, StageError> {
    let series = require(frame, name)?.cast(&DataType::String)?;
    let cells = series.str()?.into_iter().map(|c| c.map(str::to_string)).collect();
    Ok(cells)
}

/// Cells as floats; booleans read as 1/0 and unparseable text as missing.
pub fn float_cells(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, StageError> {
    let series = require(frame, name)?.cast(&DataType::Float64)?;
    let cells = series.f64()?.into_iter().collect();
    Ok(cells)
}

pub fn int_cells(frame: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, StageError> {
    let series = require(frame, name)?.cast(&DataType::Int64)?;
    let cells = series.i64()?.into_iter().collect();
    Ok(cells)
}

/// Drop whichever of `names` are present.
pub fn drop_existing(frame: &DataFrame, names: &[&str]) -> Result<DataFrame, StageError> {
    let mut out = frame.clone();
    for name in names {
        if has_column(&out, name) {
            out = out.drop(name)?;
        }
    }
    Ok(out)
}

pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
