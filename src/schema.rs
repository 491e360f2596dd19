// Fixed column names of the fight and fighter tables.

pub const RED: &str = "R_";
pub const BLUE: &str = "B_";
pub const SIDES: [&str; 2] = [RED, BLUE];

pub const R_FIGHTER: &str = "R_fighter";
pub const B_FIGHTER: &str = "B_fighter";
pub const WINNER: &str = "Winner";
pub const FIGHT_TYPE: &str = "Fight_type";
pub const FORMAT: &str = "Format";
pub const LAST_ROUND: &str = "last_round";
pub const LAST_ROUND_TIME: &str = "last_round_time";
pub const DATE: &str = "date";
pub const LOCATION: &str = "location";
pub const REFEREE: &str = "Referee";
pub const WIN_BY: &str = "win_by";

pub const TITLE_BOUT: &str = "title_bout";
pub const WEIGHT_CLASS: &str = "weight_class";
pub const TOTAL_TIME: &str = "total_time_fought(seconds)";
pub const CTRL_SUFFIX: &str = "_time(seconds)";
pub const ATTEMPT_SUFFIX: &str = "_att";
pub const LANDED_SUFFIX: &str = "_landed";

/// Index column of the fighter reference table.
pub const FIGHTER_NAME: &str = "fighter_name";

pub const HEIGHT: &str = "Height_cms";
pub const WEIGHT: &str = "Weight_lbs";
pub const REACH: &str = "Reach_cms";
pub const STANCE: &str = "Stance";
pub const DOB: &str = "DOB";

/// Attribute columns of a normalised fighter reference table.
pub const FIGHTER_ATTRIBUTES: [&str; 5] = [HEIGHT, WEIGHT, REACH, STANCE, DOB];

/// Career statistics that describe a fighter's whole record, including fights
/// after the one being modelled.
pub const FUTURE_FIGHTER_STATS: [&str; 8] = [
    "SLpM", "Str_Acc", "SApM", "Str_Def", "TD_Avg", "TD_Acc", "TD_Def", "Sub_Avg",
];

/// `"L of A"` strike and grapple counters, both corners.
pub const FRACTION_COLUMNS: [&str; 18] = [
    "R_SIG_STR.",
    "B_SIG_STR.",
    "R_TOTAL_STR.",
    "B_TOTAL_STR.",
    "R_TD",
    "B_TD",
    "R_HEAD",
    "B_HEAD",
    "R_BODY",
    "B_BODY",
    "R_LEG",
    "B_LEG",
    "R_DISTANCE",
    "B_DISTANCE",
    "R_CLINCH",
    "B_CLINCH",
    "R_GROUND",
    "B_GROUND",
];

pub const PERCENT_COLUMNS: [&str; 4] = ["R_SIG_STR_pct", "B_SIG_STR_pct", "R_TD_pct", "B_TD_pct"];

pub const CTRL_COLUMNS: [&str; 2] = ["R_CTRL", "B_CTRL"];

/// Raw fight-event schema as scraped.
pub const FIGHT_COLUMNS: [&str; 41] = [
    R_FIGHTER,
    B_FIGHTER,
    "R_KD",
    "B_KD",
    "R_SIG_STR.",
    "B_SIG_STR.",
    "R_SIG_STR_pct",
    "B_SIG_STR_pct",
    "R_TOTAL_STR.",
    "B_TOTAL_STR.",
    "R_TD",
    "B_TD",
    "R_TD_pct",
    "B_TD_pct",
    "R_SUB_ATT",
    "B_SUB_ATT",
    "R_REV",
    "B_REV",
    "R_CTRL",
    "B_CTRL",
    "R_HEAD",
    "B_HEAD",
    "R_BODY",
    "B_BODY",
    "R_LEG",
    "B_LEG",
    "R_DISTANCE",
    "B_DISTANCE",
    "R_CLINCH",
    "B_CLINCH",
    "R_GROUND",
    "B_GROUND",
    WIN_BY,
    LAST_ROUND,
    LAST_ROUND_TIME,
    FORMAT,
    REFEREE,
    DATE,
    LOCATION,
    FIGHT_TYPE,
    WINNER,
];

/// Per-fight detail columns left out of the compiled table.
pub fn detail_columns() -> Vec<String> {
    let mut cols: Vec<String> = [
        "R_KD",
        "B_KD",
        "R_SIG_STR_pct",
        "B_SIG_STR_pct",
        "R_TD_pct",
        "B_TD_pct",
        "R_SUB_ATT",
        "B_SUB_ATT",
        "R_REV",
        "B_REV",
        WIN_BY,
        LAST_ROUND,
        TOTAL_TIME,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    cols.extend(CTRL_COLUMNS.iter().map(|c| format!("{c}{CTRL_SUFFIX}")));
    for c in FRACTION_COLUMNS {
        cols.push(format!("{c}{ATTEMPT_SUFFIX}"));
        cols.push(format!("{c}{LANDED_SUFFIX}"));
    }
    cols
}

/// Categorical columns expanded into indicator columns, in expansion order.
pub fn encoded_columns() -> [String; 3] {
    [
        WEIGHT_CLASS.to_string(),
        format!("{BLUE}{STANCE}"),
        format!("{RED}{STANCE}"),
    ]
}

/// Identifying, non-feature columns removed from the final table.
pub const IDENTIFYING_COLUMNS: [&str; 5] = [REFEREE, LOCATION, DATE, R_FIGHTER, B_FIGHTER];

pub fn sided(side: &str, column: &str) -> String {
    format!("{side}{column}")
}

/// The other corner's version of a sided column name.
pub fn counterpart(column: &str) -> Option<String> {
    if let Some(rest) = column.strip_prefix(RED) {
        Some(sided(BLUE, rest))
    } else {
        column.strip_prefix(BLUE).map(|rest| sided(RED, rest))
    }
}
