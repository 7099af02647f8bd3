//! Command-line arguments

use clap::Parser;
use std::path::{Path, PathBuf};
use treceval_core::{EvalConfig, OutputFormat};

/// Positional value meaning "not provided"
pub const NOT_PROVIDED: &str = "none";

#[derive(Debug, Parser)]
#[command(name = "treceval")]
#[command(about = "Evaluate ranked retrieval runs against TREC relevance judgments")]
#[command(version)]
pub struct Cli {
    /// Relevance judgments file, or `none`
    #[arg(value_name = "QRELS")]
    pub qrels: Option<String>,

    /// Run file or directory of run files, or `none`
    #[arg(value_name = "RUN")]
    pub run: Option<String>,

    /// File the results are also exported to, or `none`
    #[arg(value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Average over every topic of the judgments, scoring unanswered topics as 0
    #[arg(short = 'c', long, conflicts_with = "answered_topics_only")]
    pub average_over_all_topics: bool,

    /// Average only over the topics each run answered
    #[arg(long)]
    pub answered_topics_only: bool,

    /// Drop unjudged documents before scoring
    #[arg(short = 'J', long)]
    pub judged_only: bool,

    /// Score only the first N documents of each topic
    #[arg(short = 'M', long, value_name = "N")]
    pub cutoff: Option<usize>,

    /// Print per-topic results as well as run summaries
    #[arg(short = 'q', long)]
    pub per_topic: bool,

    /// Metric bundle to compute
    #[arg(short, long, value_name = "BUNDLE")]
    pub metrics: Option<String>,

    /// Format of the exported results
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn provided(value: Option<&str>) -> Option<&Path> {
    value
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(NOT_PROVIDED))
        .map(Path::new)
}

impl Cli {
    pub fn qrels_path(&self) -> Option<&Path> {
        provided(self.qrels.as_deref())
    }

    pub fn run_path(&self) -> Option<&Path> {
        provided(self.run.as_deref())
    }

    pub fn output_path(&self) -> Option<&Path> {
        provided(self.output.as_deref())
    }

    /// Applies the flags given on the command line on top of `config`
    pub fn apply_overrides(&self, config: &mut EvalConfig) {
        if self.average_over_all_topics {
            config.evaluation.average_over_all_topics = true;
        }
        if self.answered_topics_only {
            config.evaluation.average_over_all_topics = false;
        }
        if self.judged_only {
            config.evaluation.judged_only = true;
        }
        if let Some(cutoff) = self.cutoff {
            config.evaluation.document_cutoff = Some(cutoff);
        }
        if let Some(metrics) = &self.metrics {
            config.evaluation.metrics = metrics.clone();
        }
        if self.per_topic {
            config.output.per_topic = true;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }
}
