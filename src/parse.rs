// Cell-level parsers. None of these fail: malformed input resolves to a fixed fallback.
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

/// Marker in the fight-type string for championship fights.
const TITLE_MARKER: &str = "Title Bout";
/// Token used by the source site when no percentage was recorded.
const NO_PERCENT: &str = "---";
/// Token used by the source site when no control time was recorded.
const NO_TIME: &str = "--";

/// `"L of A"` -> `(attempted, landed)`. Anything else is `(0, 0)`.
///
/// `column` only labels the debug message for malformed cells.
pub fn parse_fraction_pair(raw: Option<&str>, column: &str) -> (i64, i64) {
    let Some(raw) = raw else { return (0, 0) };
    if !raw.contains("of") {
        return (0, 0);
    }
    let mut parts = raw.split("of");
    let landed = parts.next().map(str::trim).and_then(|s| s.parse::<i64>().ok());
    let attempted = parts.next().map(str::trim).and_then(|s| s.parse::<i64>().ok());
    match (attempted, landed) {
        (Some(a), Some(l)) => (a, l),
        _ => {
            log::debug!("{column}: malformed counter {raw:?}, using 0 of 0");
            (0, 0)
        }
    }
}

/// Pin a fraction into [0, 1]; NaN and infinities give 0.
pub fn clamp_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `"45%"` -> 0.45. The no-data token, missing cells and garbage all give 0.
pub fn parse_percentage(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else { return 0.0 };
    if raw == NO_PERCENT {
        return 0.0;
    }
    raw.replace('%', "")
        .trim()
        .parse::<f64>()
        .map(|pct| clamp_fraction(pct / 100.0))
        .unwrap_or(0.0)
}

pub fn parse_title_bout(raw: Option<&str>) -> bool {
    raw.is_some_and(|s| s.contains(TITLE_MARKER))
}

/// `"M:SS"` -> seconds. Missing, `"--"` and anything not exactly two integer
/// fields give 0.
pub fn parse_clock(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else { return 0 };
    if raw == NO_TIME {
        return 0;
    }
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 2 {
        return 0;
    }
    match (parts[0].trim().parse::<i64>(), parts[1].trim().parse::<i64>()) {
        (Ok(m), Ok(s)) => m.checked_mul(60).and_then(|m| m.checked_add(s)).unwrap_or(0),
        _ => 0,
    }
}

/// Weight divisions, with identifier-safe labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightClass {
    WomenStrawweight,
    WomenBantamweight,
    WomenFeatherweight,
    WomenFlyweight,
    Lightweight,
    Welterweight,
    Middleweight,
    LightHeavyweight,
    Heavyweight,
    Featherweight,
    Bantamweight,
    Flyweight,
    CatchWeight,
    OpenWeight,
}

impl WeightClass {
    /// Search order for substrings of the fight-type string. Women's divisions
    /// and "Light Heavyweight" come before the names they contain.
    const SEARCH_ORDER: [(&'static str, WeightClass); 13] = [
        ("Women's Strawweight", WeightClass::WomenStrawweight),
        ("Women's Bantamweight", WeightClass::WomenBantamweight),
        ("Women's Featherweight", WeightClass::WomenFeatherweight),
        ("Women's Flyweight", WeightClass::WomenFlyweight),
        ("Lightweight", WeightClass::Lightweight),
        ("Welterweight", WeightClass::Welterweight),
        ("Middleweight", WeightClass::Middleweight),
        ("Light Heavyweight", WeightClass::LightHeavyweight),
        ("Heavyweight", WeightClass::Heavyweight),
        ("Featherweight", WeightClass::Featherweight),
        ("Bantamweight", WeightClass::Bantamweight),
        ("Flyweight", WeightClass::Flyweight),
        ("Open Weight", WeightClass::OpenWeight),
    ];

    const CATCH_WEIGHT_BOUTS: [&'static str; 2] = ["Catch Weight Bout", "Catchweight Bout"];

    pub fn label(self) -> &'static str {
        match self {
            WeightClass::WomenStrawweight => "WomenStrawweight",
            WeightClass::WomenBantamweight => "WomenBantamweight",
            WeightClass::WomenFeatherweight => "WomenFeatherweight",
            WeightClass::WomenFlyweight => "WomenFlyweight",
            WeightClass::Lightweight => "Lightweight",
            WeightClass::Welterweight => "Welterweight",
            WeightClass::Middleweight => "Middleweight",
            WeightClass::LightHeavyweight => "LightHeavyweight",
            WeightClass::Heavyweight => "Heavyweight",
            WeightClass::Featherweight => "Featherweight",
            WeightClass::Bantamweight => "Bantamweight",
            WeightClass::Flyweight => "Flyweight",
            WeightClass::CatchWeight => "CatchWeight",
            WeightClass::OpenWeight => "OpenWeight",
        }
    }
}

impl fmt::Display for WeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn parse_weight_class(raw: Option<&str>) -> WeightClass {
    let Some(raw) = raw else { return WeightClass::OpenWeight };
    if let Some((_, class)) = WeightClass::SEARCH_ORDER
        .iter()
        .find(|(name, _)| raw.contains(name))
    {
        return *class;
    }
    if WeightClass::CATCH_WEIGHT_BOUTS.contains(&raw) {
        WeightClass::CatchWeight
    } else {
        WeightClass::OpenWeight
    }
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Calendar date in any of the forms the scraped tables use; `None` otherwise.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

const CM_PER_INCH: f64 = 2.54;

/// `5' 11"` -> centimetres.
pub fn parse_height_cms(raw: Option<&str>) -> Option<f64> {
    let (feet, rest) = raw?.split_once('\'')?;
    let feet = feet.trim().parse::<f64>().ok()?;
    let inches = rest.trim().trim_end_matches('"').trim();
    let inches = if inches.is_empty() { 0.0 } else { inches.parse::<f64>().ok()? };
    Some((feet * 12.0 + inches) * CM_PER_INCH)
}

/// `72"` -> centimetres.
pub fn parse_reach_cms(raw: Option<&str>) -> Option<f64> {
    leading_number(raw?.trim_end_matches('"')).map(|inches| inches * CM_PER_INCH)
}

/// `155 lbs.` -> pounds.
pub fn parse_weight_lbs(raw: Option<&str>) -> Option<f64> {
    leading_number(raw?.trim().trim_end_matches("lbs.").trim_end_matches("lbs"))
}

fn leading_number(s: &str) -> Option<f64> {
    f64::from_str(s.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_pairs() {
        assert_eq!(parse_fraction_pair(Some("10 of 15"), "R_TD"), (15, 10));
        assert_eq!(parse_fraction_pair(None, "R_TD"), (0, 0));
        assert_eq!(parse_fraction_pair(Some("garbage"), "R_TD"), (0, 0));
        assert_eq!(parse_fraction_pair(Some("x of y"), "R_TD"), (0, 0));
        assert_eq!(parse_fraction_pair(Some("0 of 0"), "R_TD"), (0, 0));
    }

    #[test]
    fn percentages() {
        assert!((parse_percentage(Some("45%")) - 0.45).abs() < 1e-12);
        assert_eq!(parse_percentage(Some("---")), 0.0);
        assert_eq!(parse_percentage(None), 0.0);
        assert_eq!(parse_percentage(Some("n/a%x")), 0.0);
        assert_eq!(parse_percentage(Some("100%")), 1.0);
        assert_eq!(parse_percentage(Some("150%")), 1.0);
        assert_eq!(parse_percentage(Some("-5%")), 0.0);
        assert_eq!(parse_percentage(Some("inf%")), 0.0);
        assert_eq!(parse_percentage(Some("NaN%")), 0.0);
    }

    #[test]
    fn clocks() {
        assert_eq!(parse_clock(Some("3:45")), 225);
        assert_eq!(parse_clock(Some("--")), 0);
        assert_eq!(parse_clock(None), 0);
        assert_eq!(parse_clock(Some("5")), 0);
        assert_eq!(parse_clock(Some("a:b")), 0);
        assert_eq!(parse_clock(Some("0:07")), 7);
        assert_eq!(parse_clock(Some("153722867280912931:00")), 0);
        assert_eq!(parse_clock(Some("0:9223372036854775807")), i64::MAX);
        assert_eq!(parse_clock(Some("1:9223372036854775807")), 0);
    }

    #[test]
    fn women_division_wins_over_plain_name() {
        let fight_type = Some("UFC Women's Bantamweight Title Bout");
        assert_eq!(parse_weight_class(fight_type).label(), "WomenBantamweight");
        assert!(parse_title_bout(fight_type));
    }

    #[test]
    fn weight_class_fallbacks() {
        assert_eq!(parse_weight_class(Some("Light Heavyweight Bout")), WeightClass::LightHeavyweight);
        assert_eq!(parse_weight_class(Some("Catchweight Bout")), WeightClass::CatchWeight);
        assert_eq!(parse_weight_class(Some("Catch Weight Bout")), WeightClass::CatchWeight);
        assert_eq!(parse_weight_class(Some("UFC 2 Tournament Title Bout")), WeightClass::OpenWeight);
        assert_eq!(parse_weight_class(None), WeightClass::OpenWeight);
        assert!(!parse_title_bout(None));
        assert!(!parse_title_bout(Some("Lightweight Bout")));
    }

    #[test]
    fn dates_in_scraped_forms() {
        let d = NaiveDate::from_ymd_opt(1978, 7, 13).unwrap();
        assert_eq!(parse_date(Some("1978-07-13")), Some(d));
        assert_eq!(parse_date(Some("Jul 13, 1978")), Some(d));
        assert_eq!(parse_date(Some("July 13, 1978")), Some(d));
        assert_eq!(parse_date(Some("07/13/1978")), Some(d));
        assert_eq!(parse_date(Some("1978-07-13 00:00:00")), Some(d));
        assert_eq!(parse_date(Some("--")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn measurements() {
        assert!((parse_height_cms(Some("5' 11\"")).unwrap() - 180.34).abs() < 1e-9);
        assert!((parse_reach_cms(Some("72\"")).unwrap() - 182.88).abs() < 1e-9);
        assert_eq!(parse_weight_lbs(Some("155 lbs.")), Some(155.0));
        assert_eq!(parse_height_cms(Some("--")), None);
        assert_eq!(parse_reach_cms(Some("--")), None);
        assert_eq!(parse_weight_lbs(None), None);
    }
}
