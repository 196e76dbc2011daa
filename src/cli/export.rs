use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::cli::{open_store, ExportFormat};
use crate::error::Result;
use crate::export::{
    backup_json, html_report, write_csv, write_tsv, BACKUP_FILE_NAME, CSV_FILE_NAME,
    REPORT_FILE_NAME, TSV_FILE_NAME,
};
use crate::settings::{get_data_dir, shellexpand_path};
use crate::store::today;

fn default_path(format: ExportFormat) -> PathBuf {
    let name = match format {
        ExportFormat::Csv => CSV_FILE_NAME,
        ExportFormat::Tsv => TSV_FILE_NAME,
        ExportFormat::Html => REPORT_FILE_NAME,
        ExportFormat::Json => BACKUP_FILE_NAME,
    };
    get_data_dir().join("exports").join(name)
}

fn write_export(format: ExportFormat, path: &PathBuf) -> Result<()> {
    let store = open_store()?;
    let state = store.state();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match format {
        ExportFormat::Csv => write_csv(&state.transactions, BufWriter::new(File::create(path)?))?,
        ExportFormat::Tsv => write_tsv(&state.transactions, BufWriter::new(File::create(path)?))?,
        ExportFormat::Html => std::fs::write(path, html_report(state, today()))?,
        ExportFormat::Json => std::fs::write(path, format!("{}\n", backup_json(state)?))?,
    }
    debug!(path = %path.display(), rows = state.transactions.len(), "export written");
    Ok(())
}

/// Write the export and return the path written.
pub fn run(format: ExportFormat, output: Option<String>) -> Result<String> {
    let path = output
        .map(|o| PathBuf::from(shellexpand_path(&o)))
        .unwrap_or_else(|| default_path(format));

    if let Err(e) = write_export(format, &path) {
        warn!(error = %e, path = %path.display(), "export failed");
        return Err(e);
    }
    let display = path.display().to_string();
    println!("Wrote {display}");
    Ok(display)
}
