//! Relevance interpretation
//!
//! A [`RelevanceType`] turns a raw judgment or score token into a numeric
//! value and classifies that value as relevant and/or unjudged. Judgment
//! files and run files are read with independent relevance types since
//! they usually use different scales.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Value produced by the graded type for the unjudged token
pub const UNJUDGED_VALUE: f64 = -1.0;

/// Interpreted relevance of one judged or scored document
///
/// Computed once when a judgment is created and copied onto ranked
/// documents during the merge, never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Relevance {
    pub value: f64,
    pub relevant: bool,
    pub unjudged: bool,
}

impl Relevance {
    /// Value used as a graded gain; unjudged and negative values give nothing
    pub fn gain(&self) -> f64 {
        if self.unjudged {
            0.0
        } else {
            self.value.max(0.0)
        }
    }
}

/// Strategy for reading and classifying relevance tokens
pub trait RelevanceType: Debug + Send + Sync {
    /// Reads a raw token into the numeric value used by the metrics
    fn read_value(&self, token: &str) -> Result<f64>;

    /// Whether a value read by this type counts as relevant
    fn is_relevant(&self, value: f64) -> bool;

    /// Whether a value read by this type marks an unjudged document
    fn is_unjudged(&self, value: f64) -> bool;

    /// Reads and classifies a token in one step
    fn judge(&self, token: &str) -> Result<Relevance> {
        let value = self.read_value(token)?;
        Ok(Relevance {
            value,
            relevant: self.is_relevant(value),
            unjudged: self.is_unjudged(value),
        })
    }
}

/// Two fixed symbols: relevant and not relevant
///
/// Never produces unjudged values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryRelevanceType {
    relevant_symbol: String,
    not_relevant_symbol: String,
}

impl BinaryRelevanceType {
    pub fn new(relevant_symbol: impl Into<String>, not_relevant_symbol: impl Into<String>) -> Self {
        Self {
            relevant_symbol: relevant_symbol.into(),
            not_relevant_symbol: not_relevant_symbol.into(),
        }
    }
}

impl Default for BinaryRelevanceType {
    fn default() -> Self {
        Self::new("1", "0")
    }
}

impl RelevanceType for BinaryRelevanceType {
    fn read_value(&self, token: &str) -> Result<f64> {
        let token = token.trim();
        if token == self.not_relevant_symbol {
            Ok(0.0)
        } else if token == self.relevant_symbol {
            Ok(1.0)
        } else {
            Err(Error::invalid_token(
                token,
                format!(
                    "binary symbol '{}' or '{}'",
                    self.relevant_symbol, self.not_relevant_symbol
                ),
            ))
        }
    }

    fn is_relevant(&self, value: f64) -> bool {
        value == 1.0
    }

    fn is_unjudged(&self, _value: f64) -> bool {
        false
    }
}

/// Integer grades `0..=max_grade` split by a relevance threshold
///
/// The token `-1` is the unjudged sentinel: it is neither relevant nor
/// counted as a judged non-relevant document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedRelevanceType {
    max_grade: u32,
    threshold: u32,
}

impl GradedRelevanceType {
    pub fn new(max_grade: u32, threshold: u32) -> Result<Self> {
        if threshold > max_grade {
            return Err(Error::config(format!(
                "graded relevance threshold {threshold} exceeds max grade {max_grade}"
            )));
        }
        Ok(Self {
            max_grade,
            threshold,
        })
    }

    pub fn max_grade(&self) -> u32 {
        self.max_grade
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl RelevanceType for GradedRelevanceType {
    fn read_value(&self, token: &str) -> Result<f64> {
        let token = token.trim();
        let grade: i64 = token.parse().map_err(|_| {
            Error::invalid_token(token, format!("integer grade in -1..={}", self.max_grade))
        })?;
        if grade == -1 {
            return Ok(UNJUDGED_VALUE);
        }
        if grade < 0 || grade > i64::from(self.max_grade) {
            return Err(Error::invalid_token(
                token,
                format!("integer grade in -1..={}", self.max_grade),
            ));
        }
        Ok(grade as f64)
    }

    fn is_relevant(&self, value: f64) -> bool {
        !self.is_unjudged(value) && value >= f64::from(self.threshold)
    }

    fn is_unjudged(&self, value: f64) -> bool {
        value == UNJUDGED_VALUE
    }
}

/// Any finite real value, relevant at or above a threshold
///
/// Used to read run scores; never produces unjudged values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRelevanceType {
    threshold: f64,
}

impl NumericRelevanceType {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for NumericRelevanceType {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RelevanceType for NumericRelevanceType {
    fn read_value(&self, token: &str) -> Result<f64> {
        let token = token.trim();
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(Error::invalid_token(token, "finite real number")),
        }
    }

    fn is_relevant(&self, value: f64) -> bool {
        value >= self.threshold
    }

    fn is_unjudged(&self, _value: f64) -> bool {
        false
    }
}
