//! File persistence for tables and JSON documents.
//!
//! All paths are resolved against an explicit [`DataDirs`] value:
//!
//! ```text
//! <root>/
//! ├── data/
//! │   ├── exports/   FileType::Export
//! │   ├── batch/     FileType::Batch
//! │   └── cache/     FileType::Cache
//! └── logs/
//! ```
//!
//! Generated names follow `{file_type}_{summary}_{yyyyMMdd_HHmmss}.{ext}`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use rust_xlsxwriter::Workbook;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{cell_text, LocalDateTime, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// File sink failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("no data to save")]
    EmptyData,
    #[error("unsupported file format '{format}'")]
    UnsupportedFormat { format: String },
    #[error("failed to write {}: {message}", path.display())]
    WriteFailed { path: PathBuf, message: String },
}

impl SinkError {
    fn write_failed(path: &Path, error: impl std::fmt::Display) -> Self {
        Self::WriteFailed {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Where a generated file lands and which prefix its name carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Export,
    Batch,
    Cache,
}

impl FileType {
    /// Unknown names fall back to the cache directory.
    pub fn from_name(value: &str) -> Self {
        match value {
            "export" => Self::Export,
            "batch" => Self::Batch,
            _ => Self::Cache,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Batch => "batch",
            Self::Cache => "cache",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    #[default]
    Csv,
    Excel,
    Json,
}

impl FileFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(Self::Csv),
            "excel" => Some(Self::Excel),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Json => "json",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Json => "json",
        }
    }
}

impl FromStr for FileFormat {
    type Err = SinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| SinkError::UnsupportedFormat {
            format: value.to_owned(),
        })
    }
}

/// Directory selector for maintenance operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDir {
    Exports,
    Cache,
    Batch,
    /// Exports, cache and batch together.
    All,
}

impl DataDir {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exports" => Some(Self::Exports),
            "cache" => Some(Self::Cache),
            "batch" => Some(Self::Batch),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exports => "exports",
            Self::Cache => "cache",
            Self::Batch => "batch",
            Self::All => "all",
        }
    }
}

/// Directory layout rooted at a base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirs {
    base: PathBuf,
    exports: PathBuf,
    cache: PathBuf,
    batch: PathBuf,
    logs: PathBuf,
}

impl DataDirs {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let data = base.join("data");
        Self {
            exports: data.join("exports"),
            cache: data.join("cache"),
            batch: data.join("batch"),
            logs: base.join("logs"),
            base,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn exports(&self) -> &Path {
        &self.exports
    }

    pub fn cache(&self) -> &Path {
        &self.cache
    }

    pub fn batch(&self) -> &Path {
        &self.batch
    }

    pub fn logs(&self) -> &Path {
        &self.logs
    }

    /// Create every directory. Safe to call repeatedly.
    pub fn ensure(&self) -> Result<(), SinkError> {
        for dir in [&self.exports, &self.cache, &self.batch, &self.logs] {
            fs::create_dir_all(dir).map_err(|e| SinkError::write_failed(dir, e))?;
        }
        Ok(())
    }

    pub fn dir_for(&self, file_type: FileType) -> &Path {
        match file_type {
            FileType::Export => &self.exports,
            FileType::Batch => &self.batch,
            FileType::Cache => &self.cache,
        }
    }

    fn selected(&self, dir: DataDir) -> Vec<&Path> {
        match dir {
            DataDir::Exports => vec![&self.exports],
            DataDir::Cache => vec![&self.cache],
            DataDir::Batch => vec![&self.batch],
            DataDir::All => vec![&self.exports, &self.cache, &self.batch],
        }
    }
}

/// Metadata of a file just written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub record_count: usize,
    pub size_bytes: u64,
    pub size_mb: f64,
}

/// Metadata of a file found on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub modified: LocalDateTime,
}

/// Build `{file_type}_{summary}_{stamp}.{ext}`.
///
/// `summary` joins up to three symbols with `_`, collapses longer lists to
/// `{first}_and_{N-1}_more`, and is `data` when no symbol is given.
pub fn generate_filename<S: AsRef<str>>(
    file_type: FileType,
    symbols: &[S],
    format: FileFormat,
    stamp: LocalDateTime,
) -> String {
    let summary = match symbols {
        [] => String::from("data"),
        [first, rest @ ..] if rest.len() >= 3 => {
            format!("{}_and_{}_more", first.as_ref(), rest.len())
        }
        _ => symbols
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("_"),
    };
    format!(
        "{}_{}_{}.{}",
        file_type.as_str(),
        summary,
        stamp.file_stamp(),
        format.extension()
    )
}

fn size_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}

/// Writes tables and JSON documents under a [`DataDirs`] root.
#[derive(Debug, Clone)]
pub struct FileSink {
    dirs: DataDirs,
}

impl FileSink {
    pub fn new(dirs: DataDirs) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &DataDirs {
        &self.dirs
    }

    /// Like [`save_table`](Self::save_table) with the format given by name.
    pub fn save_table_as<S: AsRef<str>>(
        &self,
        table: &Table,
        file_type: FileType,
        symbols: &[S],
        format: &str,
        output_path: Option<&Path>,
    ) -> Result<ExportedFile, SinkError> {
        let format = format.parse::<FileFormat>()?;
        self.save_table(table, file_type, symbols, format, output_path)
    }

    /// Write `table` and return what was written.
    ///
    /// # Errors
    ///
    /// [`SinkError::EmptyData`] when the table has no rows, in which case
    /// nothing is created; [`SinkError::WriteFailed`] on any I/O failure.
    pub fn save_table<S: AsRef<str>>(
        &self,
        table: &Table,
        file_type: FileType,
        symbols: &[S],
        format: FileFormat,
        output_path: Option<&Path>,
    ) -> Result<ExportedFile, SinkError> {
        if table.is_empty() {
            return Err(SinkError::EmptyData);
        }

        let path = self.target_path(file_type, symbols, format, output_path)?;
        match format {
            FileFormat::Csv => write_csv(&path, table)?,
            FileFormat::Excel => write_xlsx(&path, table)?,
            FileFormat::Json => {
                let body = serde_json::to_string_pretty(&table.records())
                    .map_err(|e| SinkError::write_failed(&path, e))?;
                fs::write(&path, body).map_err(|e| SinkError::write_failed(&path, e))?;
            }
        }

        let exported = self.describe(path, table.len())?;
        tracing::info!(
            path = %exported.path.display(),
            records = exported.record_count,
            format = format.as_str(),
            "saved table"
        );
        Ok(exported)
    }

    /// Write an arbitrary JSON document, pretty-printed.
    pub fn save_json<S: AsRef<str>>(
        &self,
        value: &Value,
        file_type: FileType,
        symbols: &[S],
        output_path: Option<&Path>,
    ) -> Result<ExportedFile, SinkError> {
        let path = self.target_path(file_type, symbols, FileFormat::Json, output_path)?;
        let body =
            serde_json::to_string_pretty(value).map_err(|e| SinkError::write_failed(&path, e))?;
        fs::write(&path, body).map_err(|e| SinkError::write_failed(&path, e))?;

        let records = value.as_array().map_or(1, Vec::len);
        let exported = self.describe(path, records)?;
        tracing::info!(path = %exported.path.display(), "saved json document");
        Ok(exported)
    }

    /// Delete regular files older than `max_age_days` and return how many went.
    ///
    /// Missing directories count as empty. Files that cannot be inspected or
    /// removed are logged and skipped.
    pub fn cleanup_old(&self, max_age_days: u64, dir: DataDir) -> Result<usize, SinkError> {
        let max_age = Duration::from_secs(max_age_days.saturating_mul(SECONDS_PER_DAY));
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = 0;
        for root in self.dirs.selected(dir) {
            if !root.exists() {
                continue;
            }
            let entries = fs::read_dir(root).map_err(|e| SinkError::write_failed(root, e))?;
            for entry in entries.flatten() {
                let path = entry.path();
                let modified = match entry.metadata() {
                    Ok(meta) if meta.is_file() => meta.modified(),
                    Ok(_) => continue,
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "skipping unreadable file");
                        continue;
                    }
                };
                match modified {
                    Ok(modified) if modified < cutoff => match fs::remove_file(&path) {
                        Ok(()) => {
                            tracing::debug!(path = %path.display(), "removed expired file");
                            removed += 1;
                        }
                        Err(error) => {
                            tracing::warn!(path = %path.display(), %error, "failed to remove file");
                        }
                    },
                    Ok(_) => {}
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "no modification time");
                    }
                }
            }
        }

        tracing::info!(removed, dir = dir.as_str(), max_age_days, "cleaned up old files");
        Ok(removed)
    }

    /// Total size in bytes of every file below the selected directories.
    pub fn directory_size(&self, dir: DataDir) -> u64 {
        self.dirs
            .selected(dir)
            .into_iter()
            .map(tree_size)
            .sum()
    }

    /// Up to `limit` regular files, newest first.
    pub fn list_recent(&self, dir: DataDir, limit: usize) -> Result<Vec<StoredFile>, SinkError> {
        let mut files = Vec::new();
        for root in self.dirs.selected(dir) {
            if !root.exists() {
                continue;
            }
            let entries = fs::read_dir(root).map_err(|e| SinkError::write_failed(root, e))?;
            for entry in entries.flatten() {
                let Ok(meta) = entry.metadata() else {
                    continue;
                };
                if !meta.is_file() {
                    continue;
                }
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                files.push((modified, entry.path(), meta.len()));
            }
        }

        files.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(files
            .into_iter()
            .take(limit)
            .map(|(modified, path, size_bytes)| StoredFile {
                name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path,
                size_bytes,
                size_mb: size_mb(size_bytes),
                modified: LocalDateTime::from_system_time(modified),
            })
            .collect())
    }

    fn target_path<S: AsRef<str>>(
        &self,
        file_type: FileType,
        symbols: &[S],
        format: FileFormat,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, SinkError> {
        let path = match output_path {
            Some(path) => path.to_path_buf(),
            None => self.dirs.dir_for(file_type).join(generate_filename(
                file_type,
                symbols,
                format,
                LocalDateTime::now(),
            )),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SinkError::write_failed(parent, e))?;
        }
        Ok(path)
    }

    fn describe(&self, path: PathBuf, record_count: usize) -> Result<ExportedFile, SinkError> {
        let size_bytes = fs::metadata(&path)
            .map_err(|e| SinkError::write_failed(&path, e))?
            .len();
        Ok(ExportedFile {
            path,
            record_count,
            size_bytes,
            size_mb: size_mb(size_bytes),
        })
    }
}

fn tree_size(root: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| match entry.metadata() {
            Ok(meta) if meta.is_dir() => tree_size(&entry.path()),
            Ok(meta) => meta.len(),
            Err(_) => 0,
        })
        .sum()
}

fn write_csv(path: &Path, table: &Table) -> Result<(), SinkError> {
    let mut file = BufWriter::new(File::create(path).map_err(|e| SinkError::write_failed(path, e))?);
    file.write_all(UTF8_BOM)
        .map_err(|e| SinkError::write_failed(path, e))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(table.columns())
        .map_err(|e| SinkError::write_failed(path, e))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(cell_text))
            .map_err(|e| SinkError::write_failed(path, e))?;
    }
    writer.flush().map_err(|e| SinkError::write_failed(path, e))
}

fn write_xlsx(path: &Path, table: &Table) -> Result<(), SinkError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        let col = u16::try_from(col).map_err(|e| SinkError::write_failed(path, e))?;
        worksheet
            .write_string(0, col, name.as_str())
            .map_err(|e| SinkError::write_failed(path, e))?;
    }

    for (index, row) in table.rows().iter().enumerate() {
        let row_num = u32::try_from(index + 1).map_err(|e| SinkError::write_failed(path, e))?;
        for (col, cell) in row.iter().enumerate() {
            let col = u16::try_from(col).map_err(|e| SinkError::write_failed(path, e))?;
            let written = match cell {
                Value::Null => continue,
                Value::Bool(b) => worksheet.write_boolean(row_num, col, *b).map(|_| ()),
                Value::Number(n) => match n.as_f64() {
                    Some(number) => worksheet.write_number(row_num, col, number).map(|_| ()),
                    None => worksheet
                        .write_string(row_num, col, n.to_string())
                        .map(|_| ()),
                },
                other => worksheet
                    .write_string(row_num, col, cell_text(other))
                    .map(|_| ()),
            };
            written.map_err(|e| SinkError::write_failed(path, e))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| SinkError::write_failed(path, e))
}
