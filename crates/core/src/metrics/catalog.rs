//! Standard TREC metrics and the bundles they are grouped into

use super::quantities::{
    average_precision, dcg, first_relevant_rank, ideal_dcg, num_judged_nonrel, num_rel,
    num_rel_ret, num_ret, ratio, rel_ret_at,
};
use super::{MetricNode, TopicView};
use crate::memo::MemoCache;
use crate::results::Aggregation;

/// Rank cutoffs of the `P_k`, `recall_k` and `ndcg_cut_k` families
pub const CUTOFFS: [usize; 9] = [5, 10, 15, 20, 30, 100, 200, 500, 1000];

const SUCCESS_CUTOFFS: [usize; 3] = [1, 5, 10];

/// Names accepted by [`bundle`]
pub const BUNDLE_NAMES: [&str; 6] = [
    "all_trec",
    "statistics",
    "precision",
    "recall",
    "ndcg",
    "set",
];

/// Looks up a bundle by name
pub fn bundle(name: &str) -> Option<MetricNode> {
    match name {
        "all_trec" => Some(all_trec()),
        "statistics" => Some(statistics()),
        "precision" => Some(precision_bundle()),
        "recall" => Some(recall_bundle()),
        "ndcg" => Some(ndcg_bundle()),
        "set" => Some(set_bundle()),
        _ => None,
    }
}

/// Per-run statistics, evaluated alongside every metric tree
///
/// These count what was scored, as trec_eval does:
/// - `num_q` is the number of evaluated topics.
/// - `num_ret` is the length of the scored list, after the judged-only
///   filter and the document cutoff.
/// - `num_judged` sums the judgments of the evaluated topics only, so
///   judged topics a run never answered add nothing.
///
/// With all-topics averaging an unanswered topic adds 0 to each of them.
/// Raw input sizes (run lines, judgments) are in
/// [`EvaluationSummary`](crate::evaluator::EvaluationSummary).
pub fn statistics() -> MetricNode {
    MetricNode::composite(
        "statistics",
        vec![
            MetricNode::leaf("num_q", Aggregation::Sum, |_, _| 1.0),
            MetricNode::leaf("num_ret", Aggregation::Sum, num_ret),
            MetricNode::leaf("num_judged", Aggregation::Sum, |topic, _| {
                topic.judgments.len() as f64
            }),
        ],
    )
}

fn counts() -> MetricNode {
    MetricNode::composite(
        "counts",
        vec![
            MetricNode::leaf("num_rel", Aggregation::Sum, num_rel),
            MetricNode::leaf("num_rel_ret", Aggregation::Sum, num_rel_ret),
        ],
    )
}

fn ranked_precision() -> MetricNode {
    MetricNode::composite(
        "ranked_precision",
        vec![
            MetricNode::leaf("map", Aggregation::Mean, average_precision),
            MetricNode::leaf("gm_map", Aggregation::GeometricMean, average_precision),
            MetricNode::leaf("Rprec", Aggregation::Mean, |topic, cache| {
                let rel = num_rel(topic, cache);
                ratio(rel_ret_at(topic, cache, rel as usize), rel)
            }),
            MetricNode::leaf("bpref", Aggregation::Mean, bpref),
            MetricNode::leaf("recip_rank", Aggregation::Mean, |topic, cache| {
                ratio(1.0, first_relevant_rank(topic, cache))
            }),
        ],
    )
}

fn bpref(topic: &TopicView<'_>, cache: &MemoCache) -> f64 {
    let rel = num_rel(topic, cache);
    if rel == 0.0 {
        return 0.0;
    }
    let nonrel = num_judged_nonrel(topic, cache);
    let denominator = rel.min(nonrel);
    let mut nonrel_so_far = 0.0_f64;
    let mut sum = 0.0;
    for doc in topic.ranked {
        if doc.is_relevant() {
            sum += if denominator > 0.0 {
                1.0 - nonrel_so_far.min(rel) / denominator
            } else {
                1.0
            };
        } else if doc.is_judged_nonrelevant() {
            nonrel_so_far += 1.0;
        }
    }
    sum / rel
}

fn interpolated_precision() -> MetricNode {
    let children = (0..=10u32)
        .map(|step| {
            let level = f64::from(step) / 10.0;
            MetricNode::leaf(
                format!("iprec_at_recall_{level:.2}"),
                Aggregation::Mean,
                move |topic, cache| {
                    let rel = num_rel(topic, cache);
                    if rel == 0.0 {
                        return 0.0;
                    }
                    let mut rel_so_far = 0.0;
                    let mut best = 0.0_f64;
                    // precision only peaks at relevant ranks, so those are enough
                    for (i, doc) in topic.ranked.iter().enumerate() {
                        if doc.is_relevant() {
                            rel_so_far += 1.0;
                            if rel_so_far / rel >= level - 1e-9 {
                                best = best.max(rel_so_far / (i + 1) as f64);
                            }
                        }
                    }
                    best
                },
            )
        })
        .collect();
    MetricNode::composite("interpolated_precision", children)
}

pub fn precision_bundle() -> MetricNode {
    let children = CUTOFFS
        .iter()
        .map(|&k| {
            MetricNode::leaf(format!("P_{k}"), Aggregation::Mean, move |topic, cache| {
                rel_ret_at(topic, cache, k) / k as f64
            })
        })
        .collect();
    MetricNode::composite("precision", children)
}

pub fn recall_bundle() -> MetricNode {
    let children = CUTOFFS
        .iter()
        .map(|&k| {
            MetricNode::leaf(format!("recall_{k}"), Aggregation::Mean, move |topic, cache| {
                ratio(rel_ret_at(topic, cache, k), num_rel(topic, cache))
            })
        })
        .collect();
    MetricNode::composite("recall", children)
}

pub fn ndcg_bundle() -> MetricNode {
    let mut children = vec![MetricNode::leaf("ndcg", Aggregation::Mean, |topic, cache| {
        ratio(dcg(topic, cache, None), ideal_dcg(topic, cache, None))
    })];
    children.extend(CUTOFFS.iter().map(|&k| {
        MetricNode::leaf(format!("ndcg_cut_{k}"), Aggregation::Mean, move |topic, cache| {
            ratio(dcg(topic, cache, Some(k)), ideal_dcg(topic, cache, Some(k)))
        })
    }));
    MetricNode::composite("ndcg", children)
}

pub fn set_bundle() -> MetricNode {
    MetricNode::composite(
        "set",
        vec![
            MetricNode::leaf("set_P", Aggregation::Mean, |topic, cache| {
                ratio(num_rel_ret(topic, cache), num_ret(topic, cache))
            }),
            MetricNode::leaf("set_recall", Aggregation::Mean, |topic, cache| {
                ratio(num_rel_ret(topic, cache), num_rel(topic, cache))
            }),
            MetricNode::leaf("set_F", Aggregation::Mean, |topic, cache| {
                let precision = ratio(num_rel_ret(topic, cache), num_ret(topic, cache));
                let recall = ratio(num_rel_ret(topic, cache), num_rel(topic, cache));
                ratio(2.0 * precision * recall, precision + recall)
            }),
        ],
    )
}

fn success() -> MetricNode {
    let children = SUCCESS_CUTOFFS
        .iter()
        .map(|&k| {
            MetricNode::leaf(format!("success_{k}"), Aggregation::Mean, move |topic, cache| {
                let rank = first_relevant_rank(topic, cache);
                if rank > 0.0 && rank <= k as f64 {
                    1.0
                } else {
                    0.0
                }
            })
        })
        .collect();
    MetricNode::composite("success", children)
}

/// The full trec_eval-style catalog
pub fn all_trec() -> MetricNode {
    MetricNode::composite(
        "all_trec",
        vec![
            counts(),
            ranked_precision(),
            interpolated_precision(),
            precision_bundle(),
            recall_bundle(),
            ndcg_bundle(),
            set_bundle(),
            success(),
        ],
    )
}
