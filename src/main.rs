//! Turn raw fight records plus the fighter table into a model-ready feature table,
//! and optionally chart a linear baseline over the result.
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use plotters::prelude::*;

mod age;
mod config;
mod encode;
mod error;
mod frame;
mod impute;
mod io;
mod join;
mod model;
mod parse;
mod pipeline;
mod preprocess;
mod schema;
mod timing;

use config::{FailurePolicy, PipelineConfig};
use model::feature_importances;
use pipeline::preprocess_files;

#[derive(Parser, Debug)]
#[command(about = "Preprocess raw fight and fighter tables into a feature dataset")]
struct Args {
    /// Semicolon-delimited fight table.
    #[arg(long, default_value = "data/total_fight_data.csv")]
    fights: PathBuf,

    /// Comma-delimited fighter table with a `fighter_name` column.
    #[arg(long, default_value = "data/fighter_details.csv")]
    fighters: PathBuf,

    /// Where to write the compiled checkpoint (before imputation and encoding).
    #[arg(long, default_value = "data/data.csv")]
    compiled_out: PathBuf,

    /// Where to write the final feature table.
    #[arg(long, default_value = "data/preprocessed_data.csv")]
    preprocessed_out: PathBuf,

    /// Write per-stage outcomes as CSV.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Fit a linear baseline on the output and save a coefficient chart here.
    #[arg(long)]
    importances: Option<PathBuf>,

    /// Stop at the first failing stage instead of continuing without it.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            fights_path: self.fights,
            fighters_path: self.fighters,
            compiled_path: self.compiled_out,
            preprocessed_path: self.preprocessed_out,
            policy: if self.strict { FailurePolicy::Abort } else { FailurePolicy::Continue },
            ..PipelineConfig::default()
        }
    }
}

/// Horizontal bar chart of coefficients, one bar per feature.
fn plot_importances(results: &[(String, f64)], path: &Path) -> Result<(), Box<dyn Error>> {
    let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
    let coefs: Vec<f64> = results.iter().map(|(_, c)| *c).collect();
    let count = results.len();

    let min_x = coefs.iter().cloned().fold(0.0_f64, f64::min);
    let max_x = coefs.iter().cloned().fold(0.0_f64, f64::max);
    let pad = ((max_x - min_x) * 0.1).max(1e-6);
    let x_range = (min_x - pad)..(max_x + pad);

    let height = (40 + 18 * count).max(600) as u32;
    let root = BitMapBackend::new(path, (1000, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Feature Importances (red corner win)", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(260)
        .build_cartesian_2d(x_range, 0..count)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(count)
        .y_label_formatter(&|idx| names.get(*idx).map_or_else(String::new, |n| n.to_string()))
        .x_desc("Coefficient")
        .y_desc("Feature")
        .draw()?;

    chart.draw_series(coefs.iter().enumerate().map(|(i, &coef)| {
        let start = 0.0_f64.min(coef);
        let end = 0.0_f64.max(coef);
        Rectangle::new([(start, i), (end, i + 1)], BLUE.mix(0.5).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = Args::parse();
    let report_path = args.report.take();
    let importances_path = args.importances.take();
    let config = args.into_config();

    let (table, report) = match preprocess_files(&config) {
        Ok(done) => done,
        Err(e) => {
            if e.is_not_found() {
                log::error!("input tables must be scraped before preprocessing");
            }
            return Err(e.into());
        }
    };
    log::info!(
        "preprocessed {} fights into {} columns",
        table.height(),
        table.width()
    );

    if let Some(path) = report_path {
        report.save(&path)?;
        log::info!("stage report written to {}", path.display());
    }

    if let Some(path) = importances_path {
        match feature_importances(&table) {
            Ok(results) => {
                println!("\nFeature importances:");
                for (name, coef) in &results {
                    println!("{:<40} {:>10.4}", name, coef);
                }
                plot_importances(&results, &path)?;
                log::info!("wrote {}", path.display());
            }
            Err(e) => log::warn!("could not fit the linear baseline: {e}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;

    use crate::frame::{float_cells, has_column, int_cells, is_numeric, require, text_cells};
    use crate::pipeline::StageStatus;
    use crate::schema::{encoded_columns, FIGHT_COLUMNS};

    const FIGHTER_HEADER: &str =
        "fighter_name,Height,Weight,Reach,Stance,DOB,SLpM,Str_Acc,SApM,Str_Def,TD_Avg,TD_Acc,TD_Def,Sub_Avg";

    /// One fight row in raw column order.
    fn fight_row(
        red: &str,
        blue: &str,
        winner: &str,
        fight_type: &str,
        format: &str,
        last_round: &str,
        clock: &str,
    ) -> String {
        FIGHT_COLUMNS
            .iter()
            .map(|col| match *col {
                "R_fighter" => red.to_string(),
                "B_fighter" => blue.to_string(),
                "Winner" => winner.to_string(),
                "Fight_type" => fight_type.to_string(),
                "Format" => format.to_string(),
                "last_round" => last_round.to_string(),
                "last_round_time" => clock.to_string(),
                "R_KD" | "B_KD" | "R_SUB_ATT" | "B_SUB_ATT" | "R_REV" | "B_REV" => "0".to_string(),
                "R_SIG_STR_pct" | "B_SIG_STR_pct" | "R_TD_pct" | "B_TD_pct" => "50%".to_string(),
                "R_CTRL" | "B_CTRL" => "1:00".to_string(),
                "win_by" => "KO/TKO".to_string(),
                "Referee" => "Herb Dean".to_string(),
                "date" => "July 13, 2019".to_string(),
                "location" => "Sacramento, California, USA".to_string(),
                _ => "10 of 20".to_string(),
            })
            .collect::<Vec<_>>()
            .join(";")
    }

    fn write_fixtures(dir: &std::path::Path) -> Result<PipelineConfig, Box<dyn Error>> {
        let fights = [
            FIGHT_COLUMNS.join(";"),
            fight_row("Alpha", "Bravo", "Alpha", "Lightweight Bout", "3 Rnd (5-5-5)", "2", "1:30"),
            fight_row("Charlie", "Delta", "Delta", "UFC Women's Bantamweight Title Bout", "5 Rnd (5-5-5-5-5)", "5", "5:00"),
            fight_row("Alpha", "Delta", "", "Catchweight Bout", "3 Rnd (5-5-5)", "3", "5:00"),
            fight_row("Echo", "Bravo", "Bravo", "Heavyweight Bout", "1 Rnd + 2OT (15-3-3)", "3", "0:30"),
        ]
        .join("\n");
        let fighters = [
            FIGHTER_HEADER.to_string(),
            r#"Alpha,"5' 10""",155 lbs.,"70""",Orthodox,"Jan 01, 1990",1,1,1,1,1,1,1,1"#.to_string(),
            r#"Bravo,"6' 0""",155 lbs.,--,Southpaw,"Jul 12, 1989",1,1,1,1,1,1,1,1"#.to_string(),
            r#"Charlie,"5' 6""",135 lbs.,"66""",,"Mar 03, 1995",1,1,1,1,1,1,1,1"#.to_string(),
            r#"Delta,"5' 7""",135 lbs.,"68""",Switch,--,1,1,1,1,1,1,1,1"#.to_string(),
        ]
        .join("\n");

        let config = PipelineConfig {
            fights_path: dir.join("total_fight_data.csv"),
            fighters_path: dir.join("fighter_details.csv"),
            compiled_path: dir.join("data.csv"),
            preprocessed_path: dir.join("preprocessed_data.csv"),
            ..PipelineConfig::default()
        };
        fs::write(&config.fights_path, fights + "\n")?;
        fs::write(&config.fighters_path, fighters + "\n")?;
        Ok(config)
    }

    fn strings(cells: &[&str]) -> Vec<Option<String>> {
        cells.iter().map(|c| Some(c.to_string())).collect()
    }

    #[test]
    fn end_to_end_produces_clean_feature_table() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let config = write_fixtures(dir.path())?;

        let (table, report) = preprocess_files(&config)?;
        assert!(!report.is_degraded(), "{:?}", report.skipped().collect::<Vec<_>>());
        assert!(config.compiled_path.exists());
        assert!(config.preprocessed_path.exists());
        assert_eq!(
            report.outcomes.iter().filter(|o| o.status == StageStatus::Written).count(),
            2
        );

        // the draw is gone, the rest keep their order
        assert_eq!(table.height(), 3);
        assert_eq!(text_cells(&table, "Winner")?, strings(&["Red", "Blue", "Blue"]));

        // categoricals replaced by indicators, identifying columns gone
        for col in encoded_columns() {
            assert!(!has_column(&table, &col));
        }
        for col in ["R_fighter", "B_fighter", "date", "location", "Referee"] {
            assert!(!has_column(&table, col));
        }
        assert!(has_column(&table, "weight_class_WomenBantamweight"));
        assert!(has_column(&table, "R_Stance_Orthodox"));

        // every numeric column is fully populated
        for column in table.get_columns().iter().filter(|c| is_numeric(c.dtype())) {
            assert_eq!(column.null_count(), 0, "{} has gaps", column.name());
        }

        // Charlie had no stance -> Orthodox; Bravo had no reach -> height
        let orthodox = require(&table, "R_Stance_Orthodox")?.bool()?.get(1);
        assert_eq!(orthodox, Some(true));
        let b_reach = float_cells(&table, "B_Reach_cms")?[2].unwrap_or_default();
        assert!((b_reach - 182.88).abs() < 1e-9);
        assert_eq!(require(&table, "title_bout")?.bool()?.get(1), Some(true));
        assert!(!has_column(&table, "SLpM") && !has_column(&table, "R_SLpM"));
        Ok(())
    }

    #[test]
    fn baseline_fits_the_preprocessed_table() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let config = write_fixtures(dir.path())?;
        let (table, _) = preprocess_files(&config)?;

        let coefs = feature_importances(&table)?;
        assert!(!coefs.is_empty());
        assert!(coefs.len() < table.height());
        assert!(coefs.iter().all(|(_, c)| c.is_finite()));
        Ok(())
    }

    #[test]
    fn compiled_checkpoint_keeps_identifiers_and_ages() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let config = write_fixtures(dir.path())?;
        preprocess_files(&config)?;

        let compiled = io::load_table(&config.compiled_path, b',', "compiled")?;
        assert_eq!(compiled.height(), 4);
        assert!(has_column(&compiled, "R_fighter"));
        assert!(!has_column(&compiled, "R_SIG_STR._att"));
        assert!(!has_column(&compiled, "R_DOB"));
        assert_eq!(text_cells(&compiled, "Winner")?, strings(&["Red", "Blue", "Draw", "Blue"]));
        assert_eq!(text_cells(&compiled, "date")?[0].as_deref(), Some("2019-07-13"));
        // Alpha: born 1990-01-01, fought 2019-07-13
        assert_eq!(int_cells(&compiled, "R_age")?[0], Some(29));
        // Delta has no usable birth date
        assert_eq!(int_cells(&compiled, "B_age")?[1], None);
        Ok(())
    }

    #[test]
    fn missing_input_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            fights_path: dir.path().join("nope.csv"),
            compiled_path: dir.path().join("data.csv"),
            ..PipelineConfig::default()
        };
        let err = preprocess_files(&config).unwrap_err();
        assert!(err.is_not_found());
        assert!(!config.compiled_path.exists());
    }

    #[test]
    fn cli_flags_map_onto_config() {
        let args = Args::parse_from(["fight_features", "--fights", "f.csv", "--strict"]);
        let config = args.into_config();
        assert_eq!(config.fights_path, PathBuf::from("f.csv"));
        assert_eq!(config.policy, FailurePolicy::Abort);
        assert_eq!(config.preprocessed_path, PathBuf::from("data/preprocessed_data.csv"));
    }
}
