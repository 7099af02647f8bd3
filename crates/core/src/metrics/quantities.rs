//! Memoized intermediate quantities shared by the metric catalog

use super::TopicView;
use crate::memo::{MemoCache, Quantity};

pub fn num_ret(topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::NumRet, || topic.ranked.len() as f64)
}

pub fn num_rel(topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::NumRel, || {
        topic.judgments.num_relevant() as f64
    })
}

pub fn num_rel_ret(topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::NumRelRet, || {
        topic.ranked.iter().filter(|doc| doc.is_relevant()).count() as f64
    })
}

pub fn num_judged_nonrel(topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::NumJudgedNonRel, || {
        topic.judgments.num_judged_nonrelevant() as f64
    })
}

/// Relevant documents within the first `k` ranks
pub fn rel_ret_at(topic: &TopicView<'_>, cache: &MemoCache, k: usize) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::RelRetAt(k), || {
        topic
            .ranked
            .iter()
            .take(k)
            .filter(|doc| doc.is_relevant())
            .count() as f64
    })
}

pub fn average_precision(topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::AveragePrecision, || {
        let rel = num_rel(topic, cache);
        if rel == 0.0 {
            return 0.0;
        }
        let mut rel_so_far = 0.0;
        let mut sum = 0.0;
        for (i, doc) in topic.ranked.iter().enumerate() {
            if doc.is_relevant() {
                rel_so_far += 1.0;
                sum += rel_so_far / (i + 1) as f64;
            }
        }
        sum / rel
    })
}

/// 1-based rank of the first relevant document, 0 when none was retrieved
pub fn first_relevant_rank(topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::FirstRelevantRank, || {
        topic
            .ranked
            .iter()
            .position(|doc| doc.is_relevant())
            .map_or(0.0, |i| (i + 1) as f64)
    })
}

fn discounted(gains: impl Iterator<Item = f64>) -> f64 {
    gains
        .enumerate()
        .map(|(i, gain)| gain / ((i + 2) as f64).log2())
        .sum()
}

pub fn dcg(topic: &TopicView<'_>, cache: &MemoCache, cutoff: Option<usize>) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::Dcg(cutoff), || {
        let depth = cutoff.unwrap_or(usize::MAX);
        discounted(topic.ranked.iter().take(depth).map(|doc| doc.gain()))
    })
}

/// DCG of the best possible ranking of the judged documents
pub fn ideal_dcg(topic: &TopicView<'_>, cache: &MemoCache, cutoff: Option<usize>) -> f64 {
    cache.get_or_compute(topic.topic_id, Quantity::IdealDcg(cutoff), || {
        let mut gains: Vec<f64> = topic
            .judgments
            .iter()
            .map(|j| j.relevance().gain())
            .filter(|gain| *gain > 0.0)
            .collect();
        gains.sort_by(|a, b| b.total_cmp(a));
        let depth = cutoff.unwrap_or(usize::MAX);
        discounted(gains.into_iter().take(depth))
    })
}

/// Safe division; any zero denominator scores 0
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
