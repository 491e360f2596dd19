//! Linear baseline over the preprocessed table: which features move the red-corner win rate.
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::{DataFrame, DataType};
use std::error::Error;

use crate::frame::{float_cells, is_numeric, text_cells};
use crate::schema::{encoded_columns, WINNER};

/// Relative residual below which a column counts as a combination of earlier ones.
const RANK_TOLERANCE: f64 = 1e-8;

/// Fully populated numeric or indicator columns, other than the label. The
/// first level of each one-hot group is left out as the reference level.
fn feature_columns(frame: &DataFrame) -> Vec<String> {
    let mut names: Vec<String> = frame
        .get_columns()
        .iter()
        .filter(|c| {
            c.name().as_str() != WINNER
                && c.null_count() == 0
                && (is_numeric(c.dtype()) || c.dtype() == &DataType::Boolean)
        })
        .map(|c| c.name().to_string())
        .collect();

    for source in encoded_columns() {
        let prefix = format!("{source}_");
        let reference = names.iter().filter(|n| n.starts_with(&prefix)).min().cloned();
        if let Some(reference) = reference {
            names.retain(|n| *n != reference);
        }
    }
    names
}

/// Indices of the columns that add rank once centred. The normal equations
/// are singular otherwise, and the centred design has rank at most `n - 1`.
fn independent_columns(x: &Array2<f64>) -> Vec<usize> {
    let limit = x.nrows().saturating_sub(1);
    let mut basis: Vec<Array1<f64>> = Vec::new();
    let mut kept = Vec::new();
    for (j, column) in x.axis_iter(Axis(1)).enumerate() {
        if basis.len() >= limit {
            break;
        }
        let mean = column.mean().unwrap_or(0.0);
        let mut residual = column.mapv(|v| v - mean);
        let scale = residual.dot(&residual).sqrt();
        if scale < RANK_TOLERANCE {
            continue;
        }
        for q in &basis {
            let projection = residual.dot(q);
            residual.scaled_add(-projection, q);
        }
        let norm = residual.dot(&residual).sqrt();
        if norm > RANK_TOLERANCE * scale {
            residual /= norm;
            basis.push(residual);
            kept.push(j);
        }
    }
    kept
}

/// Fit `1.0 if Winner == "Red" else 0.0` on the independent features;
/// coefficients sorted by magnitude.
pub fn feature_importances(frame: &DataFrame) -> Result<Vec<(String, f64)>, Box<dyn Error>> {
    let winners = text_cells(frame, WINNER).map_err(|_| "no Winner column to fit against")?;
    let candidates = feature_columns(frame);
    let n = frame.height();

    let mut x = Array2::<f64>::zeros((n, candidates.len()));
    for (j, name) in candidates.iter().enumerate() {
        for (i, value) in float_cells(frame, name)?.into_iter().enumerate() {
            x[(i, j)] = value.unwrap_or_default();
        }
    }
    let y: Array1<f64> = winners
        .iter()
        .map(|w| if w.as_deref() == Some("Red") { 1.0 } else { 0.0 })
        .collect();

    let kept = independent_columns(&x);
    if kept.is_empty() {
        return Err(format!("not enough data to fit: {n} rows, {} features", candidates.len()).into());
    }
    if kept.len() < candidates.len() {
        log::debug!(
            "fitting {} of {} features; the rest are constant or collinear",
            kept.len(),
            candidates.len()
        );
    }

    let ds = Dataset::new(x.select(Axis(1), &kept), y);
    let model = LinearRegression::new().fit(&ds)?;
    let mut ranked: Vec<(String, f64)> = kept
        .iter()
        .zip(model.params().iter())
        .map(|(&j, &coef)| (candidates[j].clone(), coef))
        .collect();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    Ok(ranked)
}
