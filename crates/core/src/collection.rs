//! Relevance judgment store

use crate::error::Result;
use crate::relevance::Relevance;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// One human judgment for a (topic, document) pair
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceJudgment {
    doc_id: String,
    topic_id: String,
    relevance: Relevance,
}

impl RelevanceJudgment {
    pub fn new(
        topic_id: impl Into<String>,
        doc_id: impl Into<String>,
        relevance: Relevance,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            topic_id: topic_id.into(),
            relevance,
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn relevance(&self) -> Relevance {
        self.relevance
    }

    pub fn value(&self) -> f64 {
        self.relevance.value
    }

    pub fn is_relevant(&self) -> bool {
        self.relevance.relevant
    }

    pub fn is_unjudged(&self) -> bool {
        self.relevance.unjudged
    }
}

/// Judgments of a single topic keyed by document id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicJudgments {
    judgments: HashMap<String, RelevanceJudgment>,
    num_relevant: usize,
}

impl TopicJudgments {
    fn insert(&mut self, judgment: RelevanceJudgment) -> bool {
        if self.judgments.contains_key(judgment.doc_id()) {
            return false;
        }
        if judgment.is_relevant() {
            self.num_relevant += 1;
        }
        self.judgments.insert(judgment.doc_id.clone(), judgment);
        true
    }

    pub fn get(&self, doc_id: &str) -> Option<&RelevanceJudgment> {
        self.judgments.get(doc_id)
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.judgments.contains_key(doc_id)
    }

    /// Number of judgment lines kept for this topic
    pub fn len(&self) -> usize {
        self.judgments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.judgments.is_empty()
    }

    pub fn num_relevant(&self) -> usize {
        self.num_relevant
    }

    /// Judged documents that are neither relevant nor marked unjudged
    pub fn num_judged_nonrelevant(&self) -> usize {
        self.judgments
            .values()
            .filter(|j| !j.is_relevant() && !j.is_unjudged())
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelevanceJudgment> {
        self.judgments.values()
    }
}

/// Per-topic judgments for a whole test collection
///
/// Built once during import and read-only afterwards. Every topic held
/// has at least one judgment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    topics: BTreeMap<String, TopicJudgments>,
    num_judgments: usize,
}

impl Collection {
    /// Builds a collection; repeated (topic, document) pairs keep the first judgment
    pub fn from_judgments(judgments: impl IntoIterator<Item = RelevanceJudgment>) -> Self {
        let mut collection = Self::default();
        for judgment in judgments {
            collection.insert(judgment);
        }
        collection
    }

    pub(crate) fn insert(&mut self, judgment: RelevanceJudgment) -> bool {
        let topic = self.topics.entry(judgment.topic_id.clone()).or_default();
        let (topic_id, doc_id) = (judgment.topic_id.clone(), judgment.doc_id.clone());
        if topic.insert(judgment) {
            self.num_judgments += 1;
            true
        } else {
            warn!(topic = %topic_id, doc = %doc_id, "duplicate judgment ignored");
            false
        }
    }

    pub fn topic(&self, topic_id: &str) -> Option<&TopicJudgments> {
        self.topics.get(topic_id)
    }

    /// Topic ids in ascending order
    pub fn topic_ids(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn judgment(&self, topic_id: &str, doc_id: &str) -> Option<&RelevanceJudgment> {
        self.topics.get(topic_id)?.get(doc_id)
    }

    pub fn num_topics(&self) -> usize {
        self.topics.len()
    }

    /// Total number of judgments across all topics
    pub fn num_judgments(&self) -> usize {
        self.num_judgments
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Source of a fully materialized collection
pub trait CollectionProvider {
    /// Human-readable name used in logs and errors
    fn name(&self) -> &str;

    /// Imports the judgments; fails with a collection import error on bad input
    fn create_collection(&self) -> Result<Collection>;
}

impl CollectionProvider for Collection {
    fn name(&self) -> &str {
        "in-memory collection"
    }

    fn create_collection(&self) -> Result<Collection> {
        Ok(self.clone())
    }
}
