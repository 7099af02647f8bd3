//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_METRICS: &str = "all_trec";
pub(crate) const DEFAULT_AVERAGE_OVER_ALL_TOPICS: bool = true;
pub(crate) const DEFAULT_MAX_GRADE: u32 = 3;
pub(crate) const DEFAULT_GRADED_THRESHOLD: f64 = 1.0;
pub(crate) const DEFAULT_SCORE_THRESHOLD: f64 = 1.0;
pub(crate) const DEFAULT_RELEVANT_SYMBOL: &str = "1";
pub(crate) const DEFAULT_NOT_RELEVANT_SYMBOL: &str = "0";

/// Prefix of environment variable overrides
pub(crate) const ENV_PREFIX: &str = "TRECEVAL";

pub(crate) fn default_metrics() -> String {
    DEFAULT_METRICS.to_string()
}

pub(crate) fn default_average_over_all_topics() -> bool {
    DEFAULT_AVERAGE_OVER_ALL_TOPICS
}

pub(crate) fn default_max_grade() -> u32 {
    DEFAULT_MAX_GRADE
}

pub(crate) fn default_threshold() -> f64 {
    DEFAULT_GRADED_THRESHOLD
}

pub(crate) fn default_relevant_symbol() -> String {
    DEFAULT_RELEVANT_SYMBOL.to_string()
}

pub(crate) fn default_not_relevant_symbol() -> String {
    DEFAULT_NOT_RELEVANT_SYMBOL.to_string()
}

pub(crate) fn default_qrels_relevance() -> super::RelevanceTypeConfig {
    super::RelevanceTypeConfig {
        kind: super::RelevanceKind::Graded,
        threshold: DEFAULT_GRADED_THRESHOLD,
        max_grade: DEFAULT_MAX_GRADE,
        relevant_symbol: default_relevant_symbol(),
        not_relevant_symbol: default_not_relevant_symbol(),
    }
}

pub(crate) fn default_run_relevance() -> super::RelevanceTypeConfig {
    super::RelevanceTypeConfig {
        kind: super::RelevanceKind::Numeric,
        threshold: DEFAULT_SCORE_THRESHOLD,
        max_grade: DEFAULT_MAX_GRADE,
        relevant_symbol: default_relevant_symbol(),
        not_relevant_symbol: default_not_relevant_symbol(),
    }
}
