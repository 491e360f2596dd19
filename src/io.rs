// Loading the two input tables and writing checkpoint files.
use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;

use crate::error::PipelineError;
use crate::frame::{column_names, has_column};
use crate::schema::{counterpart, FIGHTER_NAME};

/// Cells that load as missing. Empty fields already do.
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read a delimited file with a header row. Column types are inferred over
/// the whole file; ragged rows are truncated to the header width.
pub fn load_table(path: &Path, separator: u8, table: &'static str) -> Result<DataFrame, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Open {
        table,
        path: path.to_path_buf(),
        source,
    })?;

    let null_values = NullValues::AllColumns(NA_TOKENS.iter().map(|t| (*t).into()).collect());
    let loaded = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_null_values(Some(null_values))
                .with_truncate_ragged_lines(true),
        )
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|source| PipelineError::Load { table, path: path.to_path_buf(), source })?;

    log::info!(
        "loaded {table} table: {} rows x {} columns from {}",
        loaded.height(),
        loaded.width(),
        path.display()
    );
    Ok(loaded)
}

/// Every corner-specific column needs its other-corner twin.
pub fn check_pairs(frame: &DataFrame) -> Result<(), PipelineError> {
    for name in column_names(frame) {
        if let Some(expected) = counterpart(&name) {
            if !has_column(frame, &expected) {
                return Err(PipelineError::UnpairedColumn { column: name, expected });
            }
        }
    }
    Ok(())
}

pub fn load_fights(path: &Path) -> Result<DataFrame, PipelineError> {
    let fights = load_table(path, b';', "fight")?;
    check_pairs(&fights)?;
    Ok(fights)
}

pub fn load_fighters(path: &Path) -> Result<DataFrame, PipelineError> {
    let fighters = load_table(path, b',', "fighter")?;
    if !has_column(&fighters, FIGHTER_NAME) {
        return Err(PipelineError::MissingIndex {
            table: "fighter",
            path: path.to_path_buf(),
            column: FIGHTER_NAME,
        });
    }
    Ok(fighters)
}

/// Comma-delimited, header row, no index column.
pub fn save_table(frame: &DataFrame, path: &Path) -> Result<(), PipelineError> {
    let save_err = |source| PipelineError::Save { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| save_err(e.into()))?;
    }

    let mut file = File::create(path).map_err(|e| save_err(e.into()))?;
    let mut out = frame.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut out)
        .map_err(save_err)?;
    log::info!("saved {} rows to {}", frame.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{float_cells, int_cells, text_cells};
    use std::error::Error;
    use std::io::Write;

    #[test]
    fn load_infers_column_types() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fighters.csv");
        let mut f = File::create(&path)?;
        writeln!(f, "fighter_name,Height_cms,Reach_cms,Stance")?;
        writeln!(f, "A,180.34,,Orthodox")?;
        writeln!(f, "B,175,182,NaN")?;
        writeln!(f, "C,170,180,Switch,extra")?;

        let t = load_fighters(&path)?;
        assert_eq!(t.height(), 3);
        assert_eq!(t.column("Height_cms")?.dtype(), &DataType::Float64);
        assert_eq!(float_cells(&t, "Height_cms")?, vec![Some(180.34), Some(175.0), Some(170.0)]);
        assert_eq!(int_cells(&t, "Reach_cms")?, vec![None, Some(182), Some(180)]);
        assert_eq!(
            text_cells(&t, "Stance")?,
            vec![Some("Orthodox".to_string()), None, Some("Switch".to_string())]
        );
        Ok(())
    }

    #[test]
    fn missing_file_is_a_named_not_found_error() {
        let err = load_fights(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("fight table"));
    }

    #[test]
    fn fighter_table_needs_index() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fighters.csv");
        fs::write(&path, "name,Height_cms\nA,180\n")?;
        assert!(matches!(load_fighters(&path), Err(PipelineError::MissingIndex { .. })));
        Ok(())
    }

    #[test]
    fn unpaired_side_column_is_rejected() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fights.csv");
        fs::write(&path, "R_fighter;B_fighter;R_KD\nA;B;1\n")?;
        match load_fights(&path) {
            Err(PipelineError::UnpairedColumn { column, expected }) => {
                assert_eq!(column, "R_KD");
                assert_eq!(expected, "B_KD");
            }
            other => panic!("expected unpaired column, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn save_writes_header_and_blank_missing() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out").join("t.csv");
        let t = df!(
            "a" => &[Some(1i64), None],
            "b" => &["y", "x,y"],
        )?;
        save_table(&t, &path)?;
        assert_eq!(fs::read_to_string(&path)?, "a,b\n1,y\n,\"x,y\"\n");
        Ok(())
    }
}
