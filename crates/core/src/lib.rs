//! Core types and traits for TREC-style retrieval evaluation
//!
//! This crate scores ranked retrieval runs against relevance judgments,
//! including:
//!
//! - **Relevance**: Binary, graded and numeric judgment tokens
//! - **Collections and runs**: Judgments per topic and ranked lists per run
//! - **Metrics**: A tree of trec_eval metrics sharing memoized quantities
//! - **Results**: Per topic, per run and overall result groups with viewers and exporters
//! - **Configuration**: Evaluation policy from TOML files and the environment
//! - **Error handling**: Unified error types
//!

pub mod collection;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod memo;
pub mod metrics;
pub mod relevance;
pub mod results;
pub mod run;
pub mod trec;

// Re-export main types for convenience
pub use collection::{Collection, CollectionProvider, RelevanceJudgment, TopicJudgments};
pub use config::{
    EvalConfig, EvaluationConfig, OutputConfig, OutputFormat, RelevanceConfig, RelevanceKind,
    RelevanceTypeConfig,
};
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use evaluator::{EvalOptions, EvalOptionsBuilder, EvalState, EvaluationSummary, Evaluator};
pub use memo::{MemoCache, Quantity};
pub use metrics::{LeafMetric, MetricNode, TopicView};
pub use relevance::{
    BinaryRelevanceType, GradedRelevanceType, NumericRelevanceType, Relevance, RelevanceType,
};
pub use results::{
    Aggregation, ConsoleViewer, Granularity, JsonFileExporter, ResultExporter, ResultGroup,
    ResultNode, ResultViewer, ScalarResult, TrecFileExporter,
};
pub use run::{
    InMemoryRunSet, RankedDocument, RankedList, RawRun, RetrievedLine, Run, RunSetProvider,
    RunSource,
};
pub use trec::{QrelsFile, TrecRunFile, TrecRunSet};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EvalConfig;
    pub use crate::error::{Result, ResultExt};
    pub use crate::evaluator::{EvalOptions, Evaluator};
    pub use crate::metrics::MetricNode;
}
