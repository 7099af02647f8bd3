//! Evaluation pipeline
//!
//! An [`Evaluator`] imports a collection and a run set, then scores each
//! run in turn against the metric tree. Runs are strictly sequential: each
//! one gets a fresh [`MemoCache`] and is dropped as soon as its result
//! group is built, so at most one run is resident at a time.

use crate::collection::{Collection, CollectionProvider};
use crate::error::{Error, Result};
use crate::memo::MemoCache;
use crate::metrics::{self, LeafMetric, MetricNode, TopicView};
use crate::results::{Aggregation, Granularity, ResultExporter, ResultGroup, ResultViewer};
use crate::run::{Run, RunSetProvider, RunSource};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use strum_macros::Display;
use tracing::{debug, error, info, warn};

/// Filtering and averaging policy of an evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default)]
pub struct EvalOptions {
    /// Keep only the first N scored documents per topic
    #[builder(setter(strip_option))]
    pub document_cutoff: Option<usize>,

    /// Drop retrieved documents without a judgment before the cutoff applies
    pub judged_only: bool,

    /// Average over every collection topic, scoring absent topics as 0
    pub average_over_all_topics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EvalState {
    Idle,
    Importing,
    Computing,
    Done,
    Failed,
}

/// Totals of a successful evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationSummary {
    pub runs: usize,
    pub run_lines: usize,
    pub judgments: usize,
    pub elapsed: Duration,
}

pub struct Evaluator {
    collection: Box<dyn CollectionProvider>,
    run_set: Box<dyn RunSetProvider>,
    metrics: MetricNode,
    statistics: MetricNode,
    options: EvalOptions,
    state: EvalState,
    results: Option<ResultGroup>,
    summary: Option<EvaluationSummary>,
}

impl Evaluator {
    pub fn new(
        collection: impl CollectionProvider + 'static,
        run_set: impl RunSetProvider + 'static,
        metrics: MetricNode,
    ) -> Self {
        Self {
            collection: Box::new(collection),
            run_set: Box::new(run_set),
            metrics,
            statistics: metrics::statistics(),
            options: EvalOptions::default(),
            state: EvalState::Idle,
            results: None,
            summary: None,
        }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn set_document_cutoff(&mut self, cutoff: Option<usize>) {
        self.options.document_cutoff = cutoff;
    }

    pub fn set_judged_only(&mut self, judged_only: bool) {
        self.options.judged_only = judged_only;
    }

    pub fn set_average_over_all_topics(&mut self, average_over_all_topics: bool) {
        self.options.average_over_all_topics = average_over_all_topics;
    }

    pub fn state(&self) -> EvalState {
        self.state
    }

    /// Result tree of the last successful evaluation
    pub fn results(&self) -> Option<&ResultGroup> {
        self.results.as_ref()
    }

    pub fn summary(&self) -> Option<&EvaluationSummary> {
        self.summary.as_ref()
    }

    /// Imports the inputs and computes every run from scratch
    ///
    /// On failure the state becomes [`EvalState::Failed`] and no result tree
    /// is exposed, even if some runs had already been scored.
    pub fn evaluate(&mut self) -> Result<()> {
        let started = Instant::now();
        self.results = None;
        self.summary = None;

        self.state = EvalState::Importing;
        info!(collection = %self.collection.name(), "starting import");
        let (collection, sources) = match self.import() {
            Ok(imported) => imported,
            Err(e) => {
                self.state = EvalState::Failed;
                error!(error = %e, "import failed, computation not executed");
                return Err(e);
            }
        };
        info!(
            topics = collection.num_topics(),
            judgments = collection.num_judgments(),
            runs = sources.len(),
            "import done"
        );

        self.state = EvalState::Computing;
        let computed = compute_runs(
            &collection,
            &sources,
            &self.statistics,
            &self.metrics,
            &self.options,
        );
        match computed {
            Ok((results, run_lines)) => {
                let summary = EvaluationSummary {
                    runs: sources.len(),
                    run_lines,
                    judgments: collection.num_judgments(),
                    elapsed: started.elapsed(),
                };
                info!(
                    runs = summary.runs,
                    run_lines = summary.run_lines,
                    judgments = summary.judgments,
                    elapsed_secs = summary.elapsed.as_secs_f64(),
                    "computation successfully completed"
                );
                self.results = Some(results);
                self.summary = Some(summary);
                self.state = EvalState::Done;
                Ok(())
            }
            Err(e) => {
                self.state = EvalState::Failed;
                error!(error = %e, "run import failed, results discarded");
                Err(e)
            }
        }
    }

    fn import(&self) -> Result<(Collection, Vec<Box<dyn RunSource>>)> {
        let collection = self.collection.create_collection()?;
        let sources = self.run_set.create_run_set(&collection)?;
        Ok((collection, sources))
    }

    /// Hands the result tree to a viewer; a no-op before a successful evaluation
    pub fn show_results(&self, viewer: &dyn ResultViewer) -> Result<()> {
        let Some(results) = self.completed_results() else {
            return Ok(());
        };
        viewer.show(results).inspect_err(|e| {
            error!(error = %e, "failed to show results");
        })
    }

    /// Hands the result tree to an exporter; a no-op before a successful evaluation
    pub fn export_results(&self, exporter: &dyn ResultExporter) -> Result<()> {
        let Some(results) = self.completed_results() else {
            return Ok(());
        };
        exporter.export(results).inspect_err(|e| {
            error!(error = %e, "failed to export results");
        })
    }

    fn completed_results(&self) -> Option<&ResultGroup> {
        if self.state != EvalState::Done {
            debug!(state = %self.state, "no completed evaluation, nothing to output");
            return None;
        }
        self.results.as_ref()
    }
}

/// Scores every run and assembles the overall group
fn compute_runs(
    collection: &Collection,
    sources: &[Box<dyn RunSource>],
    statistics: &MetricNode,
    metrics: &MetricNode,
    options: &EvalOptions,
) -> Result<(ResultGroup, usize)> {
    let leaves = merged_leaves(statistics, metrics);
    let mut overall = ResultGroup::new("", Granularity::Overall);
    let mut run_lines = 0;

    for source in sources {
        let cache = MemoCache::new(source.name());
        let run_results = {
            let run = source.create_run(collection)?;
            run_lines += run.num_lines();
            evaluate_run(&run, collection, &leaves, options, &cache)
        };
        let stats = cache.stats();
        debug!(run = %source.name(), hits = stats.hits, misses = stats.misses, "memo cache usage");
        info!(run = %source.name(), "computation for run done");
        overall.push_group(run_results);
    }

    for leaf in &leaves {
        let values: Vec<f64> = overall
            .groups()
            .filter_map(|run| run.scalar(leaf.name()))
            .collect();
        // mean across runs, tagged with the leaf's policy so counts render as counts
        overall.push_scalar(
            leaf.name(),
            Aggregation::Mean.aggregate(&values),
            leaf.aggregation(),
        );
    }
    Ok((overall, run_lines))
}

/// Statistics first, then the caller's tree, each name once
///
/// The returned list is the single source of both per-topic values and
/// run aggregation policies.
fn merged_leaves<'a>(
    statistics: &'a MetricNode,
    metrics: &'a MetricNode,
) -> Vec<&'a LeafMetric> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for leaf in statistics.leaves().into_iter().chain(metrics.leaves()) {
        if seen.insert(leaf.name()) {
            merged.push(leaf);
        } else {
            warn!(
                metric = %leaf.name(),
                "metric shadowed by a statistics leaf of the same name"
            );
        }
    }
    merged
}

fn evaluate_run(
    run: &Run,
    collection: &Collection,
    leaves: &[&LeafMetric],
    options: &EvalOptions,
    cache: &MemoCache,
) -> ResultGroup {
    let mut topic_groups = Vec::new();
    for (topic_id, list) in run.topics() {
        let Some(judgments) = collection.topic(topic_id) else {
            debug!(run = %run.name(), topic = %topic_id, "topic has no judgments, skipped");
            continue;
        };
        let ranked = list.scored_view(options.judged_only, options.document_cutoff);
        let view = TopicView {
            topic_id,
            judgments,
            ranked: &ranked,
        };
        let mut group = ResultGroup::new(topic_id, Granularity::Topic);
        for leaf in leaves {
            leaf.compute(&view, cache, &mut group);
        }
        topic_groups.push(group);
    }

    // absent topics contribute a 0 to every metric
    let missing = if options.average_over_all_topics {
        collection.num_topics() - topic_groups.len()
    } else {
        0
    };

    let mut run_group = ResultGroup::new(run.name(), Granularity::Run);
    for leaf in leaves {
        let mut values: Vec<f64> = topic_groups
            .iter()
            .filter_map(|group| group.scalar(leaf.name()))
            .collect();
        values.extend(std::iter::repeat(0.0).take(missing));
        run_group.push_scalar(
            leaf.name(),
            leaf.aggregation().aggregate(&values),
            leaf.aggregation(),
        );
    }
    for group in topic_groups {
        run_group.push_group(group);
    }
    run_group
}

impl From<EvalOptionsBuilderError> for Error {
    fn from(err: EvalOptionsBuilderError) -> Self {
        Error::config(err.to_string())
    }
}
