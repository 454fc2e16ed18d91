// src/convert/mod.rs
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

/// CSV export filter for the headless office suite: comma separator, double
/// quote, UTF-8, and sheet selection `-1`, which writes every sheet to its own
/// `<stem>-<SheetName>.csv` file.
const CSV_ALL_SHEETS_FILTER: &str =
    "csv:Text - txt - csv (StarCalc):44,34,76,1,,0,false,true,true,false,false,-1";

/// Handle to a workbook that has been converted into per-sheet CSV files.
#[derive(Debug, Clone)]
pub struct ConvertedWorkbook {
    dir: PathBuf,
    stem: String,
}

impl ConvertedWorkbook {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Path of the CSV file holding the named sheet.
    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}-{}.csv", self.stem, sheet))
    }
}

/// Boundary to the external format converter. The transform core only ever
/// consumes the converted CSV files; it never spawns the conversion process.
pub trait SheetConverter {
    fn convert(&self, source: &Path, out_dir: &Path) -> Result<ConvertedWorkbook>;
}

/// Converter backed by a headless LibreOffice install.
#[derive(Debug, Clone)]
pub struct LibreOffice {
    binary: PathBuf,
}

impl LibreOffice {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for LibreOffice {
    fn default() -> Self {
        Self::new("libreoffice")
    }
}

impl SheetConverter for LibreOffice {
    fn convert(&self, source: &Path, out_dir: &Path) -> Result<ConvertedWorkbook> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating conversion directory {:?}", out_dir))?;

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("source {:?} has no usable file stem", source))?
            .to_string();

        info!(
            source = %source.display(),
            out_dir = %out_dir.display(),
            "converting workbook to per-sheet CSV"
        );
        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg(CSV_ALL_SHEETS_FILTER)
            .arg("--outdir")
            .arg(out_dir)
            .arg(source)
            .output()
            .with_context(|| format!("spawning converter {:?}", self.binary))?;

        if !output.status.success() {
            bail!(
                "converting {:?} failed with {}: {}",
                source,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(ConvertedWorkbook::new(out_dir, stem))
    }
}
