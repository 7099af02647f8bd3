//! Metric definitions
//!
//! A metric tree is made of [`MetricNode`]s. Leaves score one topic at a
//! time; composites only group children under a name so callers can pick
//! bundles such as "all TREC metrics" or "statistics". Computation is a
//! fold over the leaves in definition order.

mod catalog;
pub mod quantities;

pub use catalog::{
    all_trec, bundle, ndcg_bundle, precision_bundle, recall_bundle, set_bundle, statistics,
    BUNDLE_NAMES, CUTOFFS,
};

use crate::collection::TopicJudgments;
use crate::memo::MemoCache;
use crate::results::{Aggregation, ResultGroup};
use crate::run::RankedDocument;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Everything a leaf sees of one topic
///
/// `ranked` has already been through the judged-only filter and cutoff.
#[derive(Debug, Clone, Copy)]
pub struct TopicView<'a> {
    pub topic_id: &'a str,
    pub judgments: &'a TopicJudgments,
    pub ranked: &'a [RankedDocument],
}

/// Per-topic scoring function of a leaf
pub type ScoreFn = Arc<dyn Fn(&TopicView<'_>, &MemoCache) -> f64 + Send + Sync>;

/// Metric computing one value per topic
#[derive(Clone)]
pub struct LeafMetric {
    name: String,
    aggregation: Aggregation,
    score: ScoreFn,
}

impl LeafMetric {
    pub fn new<F>(name: impl Into<String>, aggregation: Aggregation, score: F) -> Self
    where
        F: Fn(&TopicView<'_>, &MemoCache) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            aggregation,
            score: Arc::new(score),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn score(&self, topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
        (self.score)(topic, cache)
    }

    /// Scores one topic and attaches the value to `group` under this leaf's name
    pub fn compute(&self, topic: &TopicView<'_>, cache: &MemoCache, group: &mut ResultGroup) {
        group.push_scalar(self.name(), self.score(topic, cache), self.aggregation);
    }
}

impl fmt::Debug for LeafMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafMetric")
            .field("name", &self.name)
            .field("aggregation", &self.aggregation)
            .finish_non_exhaustive()
    }
}

/// Named group of metrics with no computation of its own
#[derive(Debug, Clone)]
pub struct CompositeMetric {
    name: String,
    children: Vec<MetricNode>,
}

impl CompositeMetric {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[MetricNode] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub enum MetricNode {
    Leaf(LeafMetric),
    Composite(CompositeMetric),
}

impl MetricNode {
    pub fn leaf<F>(name: impl Into<String>, aggregation: Aggregation, score: F) -> Self
    where
        F: Fn(&TopicView<'_>, &MemoCache) -> f64 + Send + Sync + 'static,
    {
        Self::Leaf(LeafMetric::new(name, aggregation, score))
    }

    pub fn composite(name: impl Into<String>, children: Vec<MetricNode>) -> Self {
        Self::Composite(CompositeMetric {
            name: name.into(),
            children,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(leaf) => leaf.name(),
            Self::Composite(composite) => composite.name(),
        }
    }

    /// Depth-first fold over the leaves in definition order
    pub fn fold_leaves<'a, T>(
        &'a self,
        init: T,
        f: &mut impl FnMut(T, &'a LeafMetric) -> T,
    ) -> T {
        match self {
            Self::Leaf(leaf) => f(init, leaf),
            Self::Composite(composite) => composite
                .children
                .iter()
                .fold(init, |acc, child| child.fold_leaves(acc, f)),
        }
    }

    /// Leaves in definition order, first occurrence of each name only
    pub fn leaves(&self) -> Vec<&LeafMetric> {
        let mut seen = HashSet::new();
        self.fold_leaves(Vec::new(), &mut |mut acc, leaf| {
            if seen.insert(leaf.name()) {
                acc.push(leaf);
            } else {
                warn!(
                    metric = %leaf.name(),
                    bundle = %self.name(),
                    "duplicate metric name skipped"
                );
            }
            acc
        })
    }

    /// Scores one topic and attaches a scalar per leaf to `group`
    ///
    /// A name already present in `group` is not scored again, so the first
    /// leaf carrying a name wins, as in [`MetricNode::leaves`].
    pub fn compute(&self, topic: &TopicView<'_>, cache: &MemoCache, group: &mut ResultGroup) {
        self.fold_leaves((), &mut |(), leaf| {
            if group.scalar(leaf.name()).is_none() {
                leaf.compute(topic, cache, group);
            }
        });
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves().len()
    }
}
