//! TREC text formats
//!
//! - qrels: `topic iteration docno relevance`
//! - runs: `topic Q0 docno rank score tag`
//!
//! Fields are whitespace separated and blank lines are ignored.

use crate::collection::{Collection, CollectionProvider, RelevanceJudgment};
use crate::error::{Error, Result};
use crate::relevance::RelevanceType;
use crate::run::{RetrievedLine, Run, RunSetProvider, RunSource};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const QREL_FIELDS: usize = 4;
const RUN_FIELDS: usize = 6;

fn split_fields(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Judgments read from a qrels file
#[derive(Debug, Clone)]
pub struct QrelsFile {
    path: PathBuf,
    name: String,
    relevance: Arc<dyn RelevanceType>,
}

impl QrelsFile {
    pub fn new(path: impl Into<PathBuf>, relevance: Arc<dyn RelevanceType>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self {
            path,
            name,
            relevance,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses qrels text; `source_name` is used in error messages
    pub fn parse(
        text: &str,
        source_name: &str,
        relevance: &dyn RelevanceType,
    ) -> Result<Collection> {
        let mut collection = Collection::default();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let fields = split_fields(line);
            if fields.is_empty() {
                continue;
            }
            if fields.len() != QREL_FIELDS {
                return Err(Error::collection_import(
                    source_name,
                    Some(line_no),
                    format!("expected {QREL_FIELDS} fields, found {}", fields.len()),
                ));
            }
            let judged = relevance.judge(fields[3]).map_err(|e| {
                Error::collection_import(source_name, Some(line_no), e.to_string())
            })?;
            collection.insert(RelevanceJudgment::new(fields[0], fields[2], judged));
        }
        if collection.is_empty() {
            return Err(Error::collection_import(source_name, None, "no judgments found"));
        }
        Ok(collection)
    }
}

impl CollectionProvider for QrelsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_collection(&self) -> Result<Collection> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            Error::collection_import(&self.name, None, format!("failed to read file: {e}"))
        })?;
        let collection = Self::parse(&text, &self.name, self.relevance.as_ref())?;
        info!(
            path = %self.path.display(),
            topics = collection.num_topics(),
            judgments = collection.num_judgments(),
            "collection imported"
        );
        Ok(collection)
    }
}

/// Parsed contents of a run file
#[derive(Debug)]
struct ParsedRun {
    tag: Option<String>,
    lines: Vec<RetrievedLine>,
}

fn parse_run(text: &str, source_name: &str, scores: &dyn RelevanceType) -> Result<ParsedRun> {
    let mut tag = None;
    let mut lines = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let fields = split_fields(line);
        if fields.is_empty() {
            continue;
        }
        if fields.len() != RUN_FIELDS {
            return Err(Error::run_import(
                source_name,
                Some(line_no),
                format!("expected {RUN_FIELDS} fields, found {}", fields.len()),
            ));
        }
        if fields[3].parse::<u64>().is_err() {
            return Err(Error::run_import(
                source_name,
                Some(line_no),
                format!("invalid rank '{}'", fields[3]),
            ));
        }
        let score = scores
            .read_value(fields[4])
            .map_err(|e| Error::run_import(source_name, Some(line_no), e.to_string()))?;
        if tag.is_none() {
            tag = Some(fields[5].to_string());
        }
        lines.push(RetrievedLine::new(fields[0], fields[2], score));
    }
    Ok(ParsedRun { tag, lines })
}

/// One run file, read again each time the run is materialized
#[derive(Debug, Clone)]
pub struct TrecRunFile {
    path: PathBuf,
    name: String,
    size: usize,
    scores: Arc<dyn RelevanceType>,
}

impl TrecRunFile {
    /// Validates the file and records its name and line count
    pub fn open(path: impl Into<PathBuf>, scores: Arc<dyn RelevanceType>) -> Result<Self> {
        let path = path.into();
        let source_name = path.display().to_string();
        let parsed = parse_run(&read_run_text(&path)?, &source_name, scores.as_ref())?;
        let name = parsed.tag.unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| source_name.clone())
        });
        Ok(Self {
            path,
            name,
            size: parsed.lines.len(),
            scores,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_run_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::run_import(path.display().to_string(), None, format!("failed to read file: {e}"))
    })
}

impl RunSource for TrecRunFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn create_run(&self, collection: &Collection) -> Result<Run> {
        let source_name = self.path.display().to_string();
        let parsed = parse_run(&read_run_text(&self.path)?, &source_name, self.scores.as_ref())?;
        debug!(run = %self.name, lines = parsed.lines.len(), "run materialized");
        Ok(Run::merge(self.name.clone(), parsed.lines, collection))
    }
}

/// Runs read from a single file or from every file of a directory
#[derive(Debug, Clone)]
pub struct TrecRunSet {
    path: PathBuf,
    scores: Arc<dyn RelevanceType>,
}

impl TrecRunSet {
    pub fn new(path: impl Into<PathBuf>, scores: Arc<dyn RelevanceType>) -> Self {
        Self {
            path: path.into(),
            scores,
        }
    }

    /// Run files in name order; hidden files are skipped
    fn run_paths(&self) -> Result<Vec<PathBuf>> {
        let source_name = self.path.display().to_string();
        if !self.path.is_dir() {
            return Ok(vec![self.path.clone()]);
        }
        let entries = fs::read_dir(&self.path).map_err(|e| {
            Error::run_import(&source_name, None, format!("failed to list directory: {e}"))
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::run_import(&source_name, None, format!("failed to list directory: {e}"))
            })?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if path.is_file() && !hidden {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(Error::run_import(source_name, None, "no run files found"));
        }
        Ok(paths)
    }
}

impl RunSetProvider for TrecRunSet {
    fn create_run_set(&self, _collection: &Collection) -> Result<Vec<Box<dyn RunSource>>> {
        let mut sources: Vec<Box<dyn RunSource>> = Vec::new();
        for path in self.run_paths()? {
            let file = TrecRunFile::open(path, Arc::clone(&self.scores))?;
            debug!(run = %file.name(), lines = file.size(), "run file validated");
            sources.push(Box::new(file));
        }
        info!(path = %self.path.display(), runs = sources.len(), "run set imported");
        Ok(sources)
    }
}
