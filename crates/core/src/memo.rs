//! Per-run memoization of quantities shared between metrics
//!
//! Several metrics need the same intermediate counts for a topic (the
//! number of relevant documents retrieved within rank k is used by the
//! whole precision and recall family). A [`MemoCache`] computes each
//! `(topic, quantity)` pair at most once per run.
//!
//! The cache is created fresh for every run and dropped with it, so no
//! state leaks between runs. It uses interior mutability and is not
//! `Sync`: topics of a run are evaluated sequentially against it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a memoized per-topic quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Documents scored for the topic
    NumRet,
    /// Relevant documents in the judgments
    NumRel,
    /// Relevant documents retrieved
    NumRelRet,
    /// Judged non-relevant documents in the judgments
    NumJudgedNonRel,
    /// Relevant documents retrieved within the first k ranks
    RelRetAt(usize),
    /// Uninterpolated average precision
    AveragePrecision,
    /// Rank of the first relevant document, 0 when none was retrieved
    FirstRelevantRank,
    /// Discounted cumulative gain, optionally truncated at a rank
    Dcg(Option<usize>),
    /// Ideal discounted cumulative gain, optionally truncated at a rank
    IdealDcg(Option<usize>),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumRet => write!(f, "num_ret"),
            Self::NumRel => write!(f, "num_rel"),
            Self::NumRelRet => write!(f, "num_rel_ret"),
            Self::NumJudgedNonRel => write!(f, "num_judged_nonrel"),
            Self::RelRetAt(k) => write!(f, "rel_ret@{k}"),
            Self::AveragePrecision => write!(f, "average_precision"),
            Self::FirstRelevantRank => write!(f, "first_relevant_rank"),
            Self::Dcg(None) => write!(f, "dcg"),
            Self::Dcg(Some(k)) => write!(f, "dcg@{k}"),
            Self::IdealDcg(None) => write!(f, "idcg"),
            Self::IdealDcg(Some(k)) => write!(f, "idcg@{k}"),
        }
    }
}

/// Key of one cached value within a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub topic_id: String,
    pub quantity: Quantity,
}

/// Hit/miss counters of one cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: usize,
    pub misses: usize,
}

/// Cache of per-topic quantities scoped to one run
#[derive(Debug, Default)]
pub struct MemoCache {
    run_name: String,
    entries: RefCell<HashMap<MemoKey, f64>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl MemoCache {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            ..Self::default()
        }
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Clears every entry and rebinds the cache to another run
    pub fn reset(&mut self, run_name: impl Into<String>) {
        self.run_name = run_name.into();
        self.entries.get_mut().clear();
        self.hits.set(0);
        self.misses.set(0);
    }

    /// Returns the cached value or runs `producer` once and stores its result
    ///
    /// The producer may itself request other quantities from this cache.
    pub fn get_or_compute<F>(&self, topic_id: &str, quantity: Quantity, producer: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let key = MemoKey {
            topic_id: topic_id.to_string(),
            quantity,
        };
        if let Some(value) = self.entries.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return *value;
        }

        // the borrow is released while the producer runs so it can recurse
        let value = producer();
        self.misses.set(self.misses.get() + 1);
        *self.entries.borrow_mut().entry(key).or_insert(value)
    }

    pub fn get(&self, topic_id: &str, quantity: Quantity) -> Option<f64> {
        self.entries
            .borrow()
            .get(&MemoKey {
                topic_id: topic_id.to_string(),
                quantity,
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }
}
