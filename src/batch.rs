//! Batch conversion of TGA files and directory trees, in place.
//!
//! Files are independent: each one is read, decoded, converted, encoded and
//! written back on a rayon worker, sharing nothing but the read-only
//! [`BatchConfig`]. A file's bytes are replaced only after its encode has
//! fully succeeded.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{Limits, TargetMode, TgaError, Unstoppable, convert, decode_with_limits, encode};

/// Settings shared by every file in a batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub mode: TargetMode,
    pub limits: Limits,
    /// Worker threads; `None` uses rayon's global pool.
    pub jobs: Option<usize>,
}

impl BatchConfig {
    pub fn new(mode: TargetMode) -> Self {
        Self {
            mode,
            limits: Limits::default(),
            jobs: None,
        }
    }
}

/// Why one file was not converted.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("couldn't open: {0}")]
    Open(#[source] io::Error),

    #[error("couldn't decode: {0}")]
    Decode(#[source] TgaError),

    #[error("couldn't convert: {0}")]
    Encode(#[source] TgaError),

    #[error("couldn't write: {0}")]
    Write(#[source] io::Error),
}

/// A successfully converted file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converted {
    /// Colors were merged to fit a 256-entry palette.
    pub quantized: bool,
    pub bytes_written: usize,
}

/// Result for one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<Converted, FileError>,
}

/// Results for a whole batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Errors that stop a batch before any file is processed.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("cannot list {path}: {source}")]
    Collect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Files to convert for `path`.
///
/// A file path yields itself. A directory is walked recursively: each
/// directory's matching files come before its subdirectories, both sorted by
/// name. A file matches when its name contains `.tga` (any case), except
/// leftover temp files from an interrupted conversion.
pub fn collect_files(path: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    if path.is_dir() {
        walk(path, &mut files).map_err(|source| BatchError::Collect {
            path: path.to_path_buf(),
            source,
        })?;
    } else {
        files.push(path.to_path_buf());
    }
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
        } else if is_tga_name(&entry.file_name()) {
            files.push(entry.path());
        }
    }
    for sub in subdirs {
        walk(&sub, files)?;
    }
    Ok(())
}

/// Suffix of the sibling file a conversion writes before renaming it over
/// the original.
const TEMP_SUFFIX: &str = ".zentga-tmp";

fn is_tga_name(name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy().to_ascii_lowercase();
    name.contains(".tga") && !name.ends_with(TEMP_SUFFIX)
}

/// Convert one file in place.
pub fn process_file(path: &Path, config: &BatchConfig) -> Result<Converted, FileError> {
    debug!(path = %path.display(), mode = config.mode.code(), "converting");

    let data = fs::read(path).map_err(FileError::Open)?;
    let image = decode_with_limits(&data, &config.limits, Unstoppable).map_err(FileError::Decode)?;
    let converted = convert(&image, config.mode).map_err(FileError::Encode)?;
    let bytes = encode(&converted, Unstoppable).map_err(FileError::Encode)?;
    write_replacing(path, &bytes).map_err(FileError::Write)?;

    Ok(Converted {
        quantized: converted.is_quantized(),
        bytes_written: bytes.len(),
    })
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn write_replacing(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(TEMP_SUFFIX);
    let tmp = path.with_file_name(tmp_name);

    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Convert every path in parallel and report per-file results.
pub fn run(paths: &[PathBuf], config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let work = || -> Vec<FileReport> {
        paths
            .par_iter()
            .map(|path| {
                let result = process_file(path, config);
                match &result {
                    Ok(done) if done.quantized => {
                        info!(path = %path.display(), "success (palette quantized)")
                    }
                    Ok(_) => info!(path = %path.display(), "success"),
                    Err(e) => warn!(path = %path.display(), error = %e, "failure"),
                }
                FileReport {
                    path: path.clone(),
                    result,
                }
            })
            .collect()
    };

    let files = match config.jobs {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()?
            .install(work),
        None => work(),
    };

    let report = BatchReport { files };
    info!(
        converted = report.succeeded(),
        failed = report.failed(),
        mode = config.mode.code(),
        "batch finished"
    );
    Ok(report)
}
