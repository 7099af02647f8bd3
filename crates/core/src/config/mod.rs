//! Configuration module for evaluations
//!
//! Configuration can be loaded from TOML files and/or environment
//! variables. Command-line flags are applied on top by the binary.

mod defaults;
mod loading;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::evaluator::EvalOptions;
use crate::metrics::{self, MetricNode, BUNDLE_NAMES};
use crate::relevance::{
    BinaryRelevanceType, GradedRelevanceType, NumericRelevanceType, RelevanceType,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum_macros::{Display, EnumString};

use defaults::*;

/// Scoring policy of an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Maximum rank scored per topic; unbounded when absent, 0 scores nothing
    #[serde(default)]
    pub document_cutoff: Option<usize>,

    /// Score only documents that have a judgment
    #[serde(default)]
    pub judged_only: bool,

    /// Average over all collection topics instead of the topics a run answered
    #[serde(default = "default_average_over_all_topics")]
    pub average_over_all_topics: bool,

    /// Metric bundle to compute
    #[serde(default = "default_metrics")]
    pub metrics: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            document_cutoff: None,
            judged_only: false,
            average_over_all_topics: default_average_over_all_topics(),
            metrics: default_metrics(),
        }
    }
}

/// Relevance type families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelevanceKind {
    Binary,
    Graded,
    Numeric,
}

/// How tokens of one input are read
///
/// `kind` is required when the section is present; the other fields are
/// only used by the kinds they apply to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceTypeConfig {
    pub kind: RelevanceKind,

    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default = "default_max_grade")]
    pub max_grade: u32,

    #[serde(default = "default_relevant_symbol")]
    pub relevant_symbol: String,

    #[serde(default = "default_not_relevant_symbol")]
    pub not_relevant_symbol: String,
}

impl RelevanceTypeConfig {
    /// Builds the relevance type this section describes
    pub fn build(&self) -> Result<Arc<dyn RelevanceType>> {
        match self.kind {
            RelevanceKind::Binary => {
                if self.relevant_symbol.trim().is_empty()
                    || self.not_relevant_symbol.trim().is_empty()
                {
                    return Err(Error::config("binary relevance symbols must not be empty"));
                }
                if self.relevant_symbol == self.not_relevant_symbol {
                    return Err(Error::config(format!(
                        "binary relevance symbols must differ, both are '{}'",
                        self.relevant_symbol
                    )));
                }
                Ok(Arc::new(BinaryRelevanceType::new(
                    self.relevant_symbol.clone(),
                    self.not_relevant_symbol.clone(),
                )))
            }
            RelevanceKind::Graded => {
                if self.threshold < 0.0 || self.threshold.fract() != 0.0 {
                    return Err(Error::config(format!(
                        "graded relevance threshold must be a non-negative integer, got {}",
                        self.threshold
                    )));
                }
                Ok(Arc::new(GradedRelevanceType::new(
                    self.max_grade,
                    self.threshold as u32,
                )?))
            }
            RelevanceKind::Numeric => {
                if !self.threshold.is_finite() {
                    return Err(Error::config("numeric relevance threshold must be finite"));
                }
                Ok(Arc::new(NumericRelevanceType::new(self.threshold)))
            }
        }
    }
}

/// Relevance types for judgment files and run scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceConfig {
    #[serde(default = "default_qrels_relevance")]
    pub qrels: RelevanceTypeConfig,

    #[serde(default = "default_run_relevance")]
    pub run: RelevanceTypeConfig,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            qrels: default_qrels_relevance(),
            run: default_run_relevance(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// trec_eval-style text lines
    #[default]
    Trec,
    /// The whole result tree as JSON
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Also print one line per topic and metric
    #[serde(default)]
    pub per_topic: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    #[serde(default)]
    pub relevance: RelevanceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl EvalConfig {
    /// Validates the configuration values
    pub fn validate(&self) -> Result<()> {
        if !BUNDLE_NAMES.contains(&self.evaluation.metrics.as_str()) {
            return Err(Error::config(format!(
                "Invalid metrics bundle '{}'. Must be one of: {:?}",
                self.evaluation.metrics, BUNDLE_NAMES
            )));
        }

        self.relevance
            .qrels
            .build()
            .map_err(|e| Error::config(format!("relevance.qrels: {e}")))?;
        self.relevance
            .run
            .build()
            .map_err(|e| Error::config(format!("relevance.run: {e}")))?;

        Ok(())
    }

    /// Filtering and averaging policy for the evaluator
    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            document_cutoff: self.evaluation.document_cutoff,
            judged_only: self.evaluation.judged_only,
            average_over_all_topics: self.evaluation.average_over_all_topics,
        }
    }

    /// Metric tree selected by `evaluation.metrics`
    pub fn metric_tree(&self) -> Result<MetricNode> {
        metrics::bundle(&self.evaluation.metrics).ok_or_else(|| {
            Error::config(format!(
                "Invalid metrics bundle '{}'. Must be one of: {:?}",
                self.evaluation.metrics, BUNDLE_NAMES
            ))
        })
    }
}
