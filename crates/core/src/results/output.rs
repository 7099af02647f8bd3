//! Viewers and exporters for a finished result tree
//!
//! Both are consumers of a read-only tree. Their failures are
//! recoverable: they never invalidate results already computed.

use super::render::write_trec_format;
use super::ResultGroup;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Displays results to a user
pub trait ResultViewer {
    fn show(&self, results: &ResultGroup) -> Result<()>;
}

/// Persists results somewhere
pub trait ResultExporter {
    fn export(&self, results: &ResultGroup) -> Result<()>;
}

/// Prints trec_eval-style lines to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleViewer {
    pub per_topic: bool,
}

impl ConsoleViewer {
    pub fn new(per_topic: bool) -> Self {
        Self { per_topic }
    }
}

impl ResultViewer for ConsoleViewer {
    fn show(&self, results: &ResultGroup) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_trec_format(&mut out, results, self.per_topic)
            .and_then(|()| out.flush())
            .map_err(|e| Error::export(format!("failed to write results to stdout: {e}")))
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::export(format!("failed to create directory {}: {e}", parent.display()))
        })?;
    }
    let file = File::create(path)
        .map_err(|e| Error::export(format!("failed to create {}: {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

/// Writes trec_eval-style lines to a file
#[derive(Debug, Clone)]
pub struct TrecFileExporter {
    path: PathBuf,
    per_topic: bool,
}

impl TrecFileExporter {
    pub fn new(path: impl Into<PathBuf>, per_topic: bool) -> Self {
        Self {
            path: path.into(),
            per_topic,
        }
    }
}

impl ResultExporter for TrecFileExporter {
    fn export(&self, results: &ResultGroup) -> Result<()> {
        let mut out = create_output(&self.path)?;
        write_trec_format(&mut out, results, self.per_topic)
            .and_then(|()| out.flush())
            .map_err(|e| Error::export(format!("failed to write {}: {e}", self.path.display())))
    }
}

/// Writes the whole tree as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    path: PathBuf,
}

impl JsonFileExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultExporter for JsonFileExporter {
    fn export(&self, results: &ResultGroup) -> Result<()> {
        let mut out = create_output(&self.path)?;
        serde_json::to_writer_pretty(&mut out, results)
            .map_err(|e| Error::export(format!("failed to serialize results: {e}")))?;
        out.write_all(b"\n")
            .and_then(|()| out.flush())
            .map_err(|e| Error::export(format!("failed to write {}: {e}", self.path.display())))
    }
}
