//! Aggregated evaluation output
//!
//! The result tree has three levels: an [`Granularity::Overall`] root, one
//! [`Granularity::Run`] group per evaluated run and one
//! [`Granularity::Topic`] group per topic of that run. Scalars at the run
//! and overall level are aggregates of the level below.

mod output;
mod render;

pub use output::{ConsoleViewer, JsonFileExporter, ResultExporter, ResultViewer, TrecFileExporter};
pub use render::write_trec_format;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Level of a result group in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Granularity {
    Topic,
    Run,
    Overall,
}

/// How per-topic values are combined into a run value
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Aggregation {
    /// Arithmetic mean over topics
    #[default]
    Mean,
    /// Total over topics, used for counts
    Sum,
    /// Geometric mean with values floored at [`GEOMETRIC_MEAN_FLOOR`]
    GeometricMean,
}

/// Smallest value entering the geometric mean, so zero scores stay finite
pub const GEOMETRIC_MEAN_FLOOR: f64 = 0.00001;

impl Aggregation {
    /// Combines values; an empty slice yields 0
    pub fn aggregate(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let n = values.len() as f64;
        match self {
            Self::Mean => values.iter().sum::<f64>() / n,
            Self::Sum => values.iter().sum(),
            Self::GeometricMean => {
                let log_sum: f64 = values
                    .iter()
                    .map(|v| v.max(GEOMETRIC_MEAN_FLOOR).ln())
                    .sum();
                (log_sum / n).exp()
            }
        }
    }
}

/// A named value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarResult {
    pub name: String,
    pub value: f64,
    pub aggregation: Aggregation,
}

/// Node of the result tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ResultNode {
    Scalar(ScalarResult),
    Group(ResultGroup),
}

impl ResultNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(scalar) => &scalar.name,
            Self::Group(group) => &group.name,
        }
    }
}

/// Named group of results at one granularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGroup {
    name: String,
    granularity: Granularity,
    children: Vec<ResultNode>,
}

impl ResultGroup {
    pub fn new(name: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            name: name.into(),
            granularity,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn children(&self) -> &[ResultNode] {
        &self.children
    }

    /// Adds a scalar, replacing an existing scalar of the same name
    pub fn push_scalar(&mut self, name: impl Into<String>, value: f64, aggregation: Aggregation) {
        let scalar = ScalarResult {
            name: name.into(),
            value,
            aggregation,
        };
        let existing = self.children.iter_mut().find(|child| {
            matches!(child, ResultNode::Scalar(s) if s.name == scalar.name)
        });
        match existing {
            Some(slot) => *slot = ResultNode::Scalar(scalar),
            None => self.children.push(ResultNode::Scalar(scalar)),
        }
    }

    pub fn push_group(&mut self, group: ResultGroup) {
        self.children.push(ResultNode::Group(group));
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars().find(|s| s.name == name).map(|s| s.value)
    }

    pub fn group(&self, name: &str) -> Option<&ResultGroup> {
        self.groups().find(|g| g.name == name)
    }

    pub fn scalars(&self) -> impl Iterator<Item = &ScalarResult> {
        self.children.iter().filter_map(|child| match child {
            ResultNode::Scalar(scalar) => Some(scalar),
            ResultNode::Group(_) => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &ResultGroup> {
        self.children.iter().filter_map(|child| match child {
            ResultNode::Group(group) => Some(group),
            ResultNode::Scalar(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
