//! Ranked result lists produced by the systems under evaluation

use crate::collection::Collection;
use crate::error::Result;
use crate::relevance::Relevance;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// One raw retrieved line before it is merged with the judgments
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedLine {
    pub topic_id: String,
    pub doc_id: String,
    pub score: f64,
}

impl RetrievedLine {
    pub fn new(topic_id: impl Into<String>, doc_id: impl Into<String>, score: f64) -> Self {
        Self {
            topic_id: topic_id.into(),
            doc_id: doc_id.into(),
            score,
        }
    }
}

/// A retrieved document annotated with its judgment, if any
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument {
    pub doc_id: String,
    pub score: f64,
    pub judgment: Option<Relevance>,
}

impl RankedDocument {
    pub fn is_relevant(&self) -> bool {
        self.judgment.is_some_and(|r| r.relevant)
    }

    /// Judged and not relevant; the unjudged sentinel does not count
    pub fn is_judged_nonrelevant(&self) -> bool {
        self.judgment.is_some_and(|r| !r.relevant && !r.unjudged)
    }

    /// Present in the judgments for its topic
    pub fn is_judged(&self) -> bool {
        self.judgment.is_some()
    }

    pub fn gain(&self) -> f64 {
        self.judgment.map_or(0.0, |r| r.gain())
    }
}

/// Documents retrieved for one topic, rank 1 first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedList {
    documents: Vec<RankedDocument>,
}

impl RankedList {
    pub fn documents(&self) -> &[RankedDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Applies the judged-only filter, then the cutoff
    ///
    /// Filtering happens first so a cutoff of N keeps N judged documents
    /// whenever that many were retrieved. Borrows when nothing is removed
    /// from the middle of the list.
    pub fn scored_view(
        &self,
        judged_only: bool,
        cutoff: Option<usize>,
    ) -> Cow<'_, [RankedDocument]> {
        let limit = cutoff.unwrap_or(usize::MAX);
        if judged_only {
            Cow::Owned(
                self.documents
                    .iter()
                    .filter(|doc| doc.is_judged())
                    .take(limit)
                    .cloned()
                    .collect(),
            )
        } else {
            let end = self.documents.len().min(limit);
            Cow::Borrowed(&self.documents[..end])
        }
    }
}

/// All ranked lists of one system, merged with the collection
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    name: String,
    topics: BTreeMap<String, RankedList>,
    num_lines: usize,
}

impl Run {
    /// Merges raw lines with the collection judgments
    ///
    /// Line order is rank order. A document retrieved twice for the same
    /// topic keeps its first position; later occurrences are dropped.
    pub fn merge(
        name: impl Into<String>,
        lines: impl IntoIterator<Item = RetrievedLine>,
        collection: &Collection,
    ) -> Self {
        let name = name.into();
        let mut topics: BTreeMap<String, RankedList> = BTreeMap::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut num_lines = 0;

        for line in lines {
            num_lines += 1;
            if !seen.insert((line.topic_id.clone(), line.doc_id.clone())) {
                warn!(
                    run = %name,
                    topic = %line.topic_id,
                    doc = %line.doc_id,
                    "duplicate retrieved document ignored"
                );
                continue;
            }
            let judgment = collection
                .judgment(&line.topic_id, &line.doc_id)
                .map(|j| j.relevance());
            topics
                .entry(line.topic_id)
                .or_default()
                .documents
                .push(RankedDocument {
                    doc_id: line.doc_id,
                    score: line.score,
                    judgment,
                });
        }

        Self {
            name,
            topics,
            num_lines,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self, topic_id: &str) -> Option<&RankedList> {
        self.topics.get(topic_id)
    }

    pub fn topics(&self) -> impl Iterator<Item = (&str, &RankedList)> {
        self.topics.iter().map(|(id, list)| (id.as_str(), list))
    }

    /// Number of raw retrieved lines the run was built from
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }
}

/// Handle to one run that is materialized only while it is evaluated
pub trait RunSource {
    fn name(&self) -> &str;

    /// Retrieved-line count
    fn size(&self) -> usize;

    /// Reads the raw lines and merges them with the collection
    fn create_run(&self, collection: &Collection) -> Result<Run>;
}

/// Source of the ordered runs of one evaluation
pub trait RunSetProvider {
    /// Validates the input and returns one handle per run, in evaluation order
    fn create_run_set(&self, collection: &Collection) -> Result<Vec<Box<dyn RunSource>>>;
}

/// Raw run held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct RawRun {
    name: String,
    lines: Vec<RetrievedLine>,
}

impl RawRun {
    pub fn new(name: impl Into<String>, lines: Vec<RetrievedLine>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Builds a run from `(topic, [doc ids in rank order])` pairs with descending scores
    pub fn from_rankings<'a>(
        name: impl Into<String>,
        rankings: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    ) -> Self {
        let lines = rankings
            .into_iter()
            .flat_map(|(topic, docs)| {
                let total = docs.len();
                docs.into_iter()
                    .enumerate()
                    .map(move |(i, doc)| RetrievedLine::new(topic, doc, (total - i) as f64))
            })
            .collect();
        Self::new(name, lines)
    }

    pub fn lines(&self) -> &[RetrievedLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<RetrievedLine> {
        &mut self.lines
    }
}

impl RunSource for RawRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.lines.len()
    }

    fn create_run(&self, collection: &Collection) -> Result<Run> {
        Ok(Run::merge(self.name.clone(), self.lines.iter().cloned(), collection))
    }
}

/// Run set held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryRunSet {
    runs: Vec<RawRun>,
}

impl InMemoryRunSet {
    pub fn new(runs: Vec<RawRun>) -> Self {
        Self { runs }
    }

    pub fn runs_mut(&mut self) -> &mut Vec<RawRun> {
        &mut self.runs
    }
}

impl RunSetProvider for InMemoryRunSet {
    fn create_run_set(&self, _collection: &Collection) -> Result<Vec<Box<dyn RunSource>>> {
        Ok(self
            .runs
            .iter()
            .cloned()
            .map(|run| Box::new(run) as Box<dyn RunSource>)
            .collect())
    }
}
