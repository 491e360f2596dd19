// Left join of fighter attributes onto the fight table, once per corner.
use std::rc::Rc;

use polars::prelude::*;

use crate::error::StageError;
use crate::frame::{column_names, require};
use crate::pipeline::{Contract, Stage};
use crate::schema::{sided, B_FIGHTER, BLUE, FIGHTER_ATTRIBUTES, FIGHTER_NAME, RED, R_FIGHTER};

/// Fighter reference table with one row per name. Read-only once built.
#[derive(Debug)]
pub struct FighterIndex {
    frame: DataFrame,
}

impl FighterIndex {
    /// Drops unnamed rows and keeps the first row of a duplicated name.
    pub fn build(reference: &DataFrame) -> Result<Self, StageError> {
        let named = reference.height() - require(reference, FIGHTER_NAME)?.null_count();
        let frame = reference
            .clone()
            .lazy()
            .filter(col(FIGHTER_NAME).is_not_null())
            .unique_stable(Some(vec![FIGHTER_NAME.into()]), UniqueKeepStrategy::First)
            .collect()?;
        let duplicates = named - frame.height();
        if duplicates > 0 {
            log::warn!("{duplicates} duplicate fighter row(s) in reference table, keeping the first of each");
        }
        Ok(Self { frame })
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        column_names(&self.frame)
            .into_iter()
            .filter(|name| name != FIGHTER_NAME)
            .collect()
    }
}

/// Scratch column that pins fight order across the join.
const ROW_ORDER: &str = "__fight_row";

/// Prefixes every reference attribute with the corner marker and pulls it in
/// by that corner's fighter name. Unmatched names get missing attributes.
pub struct ReferenceJoin {
    side: &'static str,
    key: &'static str,
    index: Rc<FighterIndex>,
}

impl ReferenceJoin {
    pub fn red(index: Rc<FighterIndex>) -> Self {
        Self { side: RED, key: R_FIGHTER, index }
    }

    pub fn blue(index: Rc<FighterIndex>) -> Self {
        Self { side: BLUE, key: B_FIGHTER, index }
    }
}

impl Stage for ReferenceJoin {
    fn name(&self) -> &'static str {
        if self.side == RED {
            "join_red_fighter"
        } else {
            "join_blue_fighter"
        }
    }

    fn contract(&self) -> Contract {
        Contract::default()
            .requires(vec![self.key.to_string()])
            .produces(FIGHTER_ATTRIBUTES.iter().map(|a| sided(self.side, a)).collect())
    }

    fn apply(&self, frame: &DataFrame) -> Result<DataFrame, StageError> {
        require(frame, self.key)?;

        // The reference key takes the fight-side name so the join keeps a single key column.
        let mut selection = vec![col(FIGHTER_NAME).alias(self.key)];
        selection.extend(
            self.index
                .attribute_names()
                .iter()
                .map(|a| col(a.as_str()).alias(sided(self.side, a))),
        );
        let attributes = self.index.frame.clone().lazy().select(selection);

        let joined = frame
            .clone()
            .lazy()
            .with_row_index(ROW_ORDER, None)
            .join(
                attributes,
                [col(self.key)],
                [col(self.key)],
                JoinArgs::new(JoinType::Left),
            )
            .sort([ROW_ORDER], SortMultipleOptions::default())
            .collect()?
            .drop(ROW_ORDER)?;
        log::debug!("{}: joined {} reference attributes", self.key, joined.width() - frame.width());
        Ok(joined)
    }
}
