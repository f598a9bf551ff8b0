//! Export dispatch: which renderers run for a format, how files are named,
//! and the all-or-nothing write of each rendered file.

use crate::console::print_thread;
use crate::csv_export::{render_combined_csv, render_thread_csv};
use crate::error::{Result, ScrapeError};
use crate::json_export::{render_combined_json, render_thread_json};
use crate::records::ScrapedThread;
use crate::util::write_file_atomic;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output selection. `Both` is console + JSON + CSV.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Console,
    Json,
    Csv,
    Both,
}

impl ExportFormat {
    pub fn wants_console(self) -> bool {
        matches!(self, ExportFormat::Console | ExportFormat::Both)
    }
    pub fn wants_json(self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }
    pub fn wants_csv(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }
    /// True when the format produces at least one file.
    pub fn writes_files(self) -> bool {
        self.wants_json() || self.wants_csv()
    }
}

/// `reddit_data_<label>_<YYYYMMDD_HHMMSS>.<ext>`, `label` being an index or `combined`.
pub fn output_file_name(label: &str, stamp: &str, ext: &str) -> String {
    format!("reddit_data_{label}_{stamp}.{ext}")
}

/// Files for a single thread. Each entry succeeds or fails on its own.
pub fn export_thread_files(thread: &ScrapedThread, format: ExportFormat, dir: &Path, stamp: &str) -> Vec<Result<PathBuf>> {
    let label = thread.index.to_string();
    let mut out = Vec::new();
    if format.wants_json() {
        let path = dir.join(output_file_name(&label, stamp, "json"));
        out.push(render_thread_json(&thread.result).and_then(|bytes| write_output(&path, &bytes)));
    }
    if format.wants_csv() {
        let path = dir.join(output_file_name(&label, stamp, "csv"));
        out.push(render_thread_csv(&thread.result).and_then(|bytes| write_output(&path, &bytes)));
    }
    out
}

/// Combined files across all threads of a run.
pub fn export_combined_files(threads: &[ScrapedThread], format: ExportFormat, dir: &Path, stamp: &str) -> Vec<Result<PathBuf>> {
    let mut out = Vec::new();
    if format.wants_json() {
        let path = dir.join(output_file_name("combined", stamp, "json"));
        out.push(render_combined_json(threads).and_then(|bytes| write_output(&path, &bytes)));
    }
    if format.wants_csv() {
        let path = dir.join(output_file_name("combined", stamp, "csv"));
        out.push(render_combined_csv(threads).and_then(|bytes| write_output(&path, &bytes)));
    }
    out
}

/// Console output for one thread; a no-op for file-only formats.
pub fn export_console<W: Write>(out: &mut W, thread: &ScrapedThread, format: ExportFormat, preview_chars: usize) -> Result<()> {
    if !format.wants_console() {
        return Ok(());
    }
    print_thread(out, &thread.result, preview_chars)
        .map_err(|e| ScrapeError::Export { path: "<stdout>".to_string(), message: e.to_string() })
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    write_file_atomic(path, bytes).map_err(|e| ScrapeError::export(path, format!("{e:#}")))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Data saved");
    Ok(path.to_path_buf())
}
