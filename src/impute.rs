// Missing-value fill after the reference join.
use polars::prelude::*;

use crate::error::StageError;
use crate::frame::{has_column, is_numeric};
use crate::pipeline::{Contract, Stage};
use crate::schema::{sided, HEIGHT, REACH, SIDES, STANCE, TOTAL_TIME};

pub const DEFAULT_STANCE: &str = "Orthodox";

/// Reach from height, then per-column medians for numeric columns, then the
/// default stance. Medians come from the whole table as it stands.
pub struct Impute;

impl Impute {
    fn reach_from_height(frame: &DataFrame) -> Vec<Expr> {
        SIDES
            .iter()
            .map(|side| (sided(side, REACH), sided(side, HEIGHT)))
            .filter(|(reach, height)| has_column(frame, reach) && has_column(frame, height))
            .map(|(reach, height)| col(reach.as_str()).fill_null(col(height.as_str())).alias(reach))
            .collect()
    }

    /// Numeric columns with gaps; an all-missing column has no median and stays as is.
    fn medians(frame: &DataFrame) -> Vec<Expr> {
        frame
            .get_columns()
            .iter()
            .filter(|c| c.name().as_str() != TOTAL_TIME && is_numeric(c.dtype()) && c.null_count() > 0)
            .map(|c| {
                let name = c.name().clone();
                col(name.clone()).fill_null(col(name.clone()).median()).alias(name)
            })
            .collect()
    }

    fn stances(frame: &DataFrame) -> Vec<Expr> {
        SIDES
            .iter()
            .map(|side| sided(side, STANCE))
            .filter(|stance| has_column(frame, stance))
            .map(|stance| col(stance.as_str()).fill_null(lit(DEFAULT_STANCE)).alias(stance))
            .collect()
    }
}

impl Stage for Impute {
    fn name(&self) -> &'static str {
        "impute_missing"
    }

    fn contract(&self) -> Contract {
        Contract::default()
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        let reached = with_exprs(frame.clone(), Self::reach_from_height(frame))?;
        let medians = Self::medians(&reached);
        let stances = Self::stances(&reached);
        let filled = with_exprs(reached, medians)?;
        with_exprs(filled, stances)
    }
}

fn with_exprs(frame: DataFrame, exprs: Vec<Expr>) -> Result<DataFrame, StageError> {
    if exprs.is_empty() {
        return Ok(frame);
    }
    Ok(frame.lazy().with_columns(exprs).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{float_cells, int_cells, require, text_cells};

    #[test]
    fn reach_falls_back_to_height_before_medians() {
        let frame = df!(
            "R_Height_cms" => &[Some(170.0), Some(190.0), None],
            "R_Reach_cms" => &[Some(175.0), None, None],
        )
        .unwrap();
        let out = Impute.apply(&frame).unwrap();
        assert_eq!(
            float_cells(&out, "R_Reach_cms").unwrap(),
            vec![Some(175.0), Some(190.0), Some(182.5)]
        );
        assert_eq!(float_cells(&out, "R_Height_cms").unwrap()[2], Some(180.0));
    }

    #[test]
    fn integer_columns_take_the_median() {
        let frame = df!(
            "R_age" => &[Some(30i64), None, Some(20), Some(40)],
            "B_age" => &[Some(30i64), None, Some(21), Some(40)],
            "R_KD" => &[1i64, 0, 2, 0],
        )
        .unwrap();
        let out = Impute.apply(&frame).unwrap();
        assert_eq!(float_cells(&out, "R_age").unwrap()[1], Some(30.0));
        assert_eq!(float_cells(&out, "B_age").unwrap()[1], Some(30.0));
        assert_eq!(require(&out, "R_age").unwrap().null_count(), 0);
        // complete columns keep their type
        assert_eq!(require(&out, "R_KD").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn stance_defaults_and_text_columns_are_untouched() {
        let frame = df!(
            "B_Stance" => &[Some("Southpaw"), None],
            "Referee" => &[None, Some("Herb Dean")],
            TOTAL_TIME => &[None, Some(5i64)],
        )
        .unwrap();
        let out = Impute.apply(&frame).unwrap();
        assert_eq!(text_cells(&out, "B_Stance").unwrap()[1].as_deref(), Some(DEFAULT_STANCE));
        assert!(text_cells(&out, "Referee").unwrap()[0].is_none());
        assert_eq!(int_cells(&out, TOTAL_TIME).unwrap()[0], None);
    }
}
