//! Tests for configuration module

use super::*;
use crate::error::{Error, ErrorKind, Result};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn create_temp_config_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .map_err(|e| Error::config(format!("Failed to create temp file: {e}")))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::config(format!("Failed to write temp file: {e}")))?;
    file.flush()
        .map_err(|e| Error::config(format!("Failed to flush temp file: {e}")))?;
    Ok(file)
}

fn with_env_var<F, T>(key: &str, value: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    std::env::set_var(key, value);
    let result = f();
    std::env::remove_var(key);
    result
}

#[test]
fn test_default_config() {
    let config = EvalConfig::default();

    assert_eq!(config.evaluation.document_cutoff, None);
    assert!(!config.evaluation.judged_only);
    assert!(config.evaluation.average_over_all_topics);
    assert_eq!(config.evaluation.metrics, "all_trec");
    assert_eq!(config.relevance.qrels.kind, RelevanceKind::Graded);
    assert_eq!(config.relevance.qrels.max_grade, 3);
    assert_eq!(config.relevance.run.kind, RelevanceKind::Numeric);
    assert_eq!(config.output.format, OutputFormat::Trec);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_valid() {
    let toml = r#"
        [evaluation]
        document_cutoff = 100
        judged_only = true
        metrics = "precision"

        [relevance.qrels]
        kind = "binary"
        relevant_symbol = "R"
        not_relevant_symbol = "N"

        [output]
        format = "json"
        per_topic = true
    "#;

    let config = EvalConfig::from_toml_str(toml).expect("Failed to parse valid TOML");
    assert_eq!(config.evaluation.document_cutoff, Some(100));
    assert!(config.evaluation.judged_only);
    assert_eq!(config.evaluation.metrics, "precision");
    assert_eq!(config.relevance.qrels.kind, RelevanceKind::Binary);
    assert_eq!(config.relevance.qrels.relevant_symbol, "R");
    assert_eq!(config.relevance.run.kind, RelevanceKind::Numeric);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(config.output.per_topic);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_minimal() {
    let config = EvalConfig::from_toml_str("").expect("Failed to parse empty TOML");
    assert_eq!(config, EvalConfig::default());
}

#[test]
fn test_from_toml_str_invalid_syntax() {
    let toml = r#"
        [evaluation
        judged_only = true
    "#;

    let err = EvalConfig::from_toml_str(toml).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
    assert_eq!(err.kind(), ErrorKind::Fatal);
}

#[test]
fn test_relevance_kind_is_required() {
    let toml = r#"
        [relevance.qrels]
        max_grade = 4
    "#;

    assert!(EvalConfig::from_toml_str(toml).is_err());
}

#[test]
fn test_validate_accepts_zero_cutoff() {
    let mut config = EvalConfig::default();
    config.evaluation.document_cutoff = Some(0);

    assert!(config.validate().is_ok());
    assert_eq!(config.eval_options().document_cutoff, Some(0));
}

#[test]
fn test_validate_rejects_unknown_bundle() {
    let mut config = EvalConfig::default();
    config.evaluation.metrics = "everything".to_string();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("everything"));
    assert!(config.metric_tree().is_err());
}

#[test]
fn test_validate_rejects_bad_relevance_sections() {
    let mut config = EvalConfig::default();
    config.relevance.qrels.threshold = 1.5;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("relevance.qrels"));

    let mut config = EvalConfig::default();
    config.relevance.qrels.threshold = 4.0;
    assert!(config.validate().is_err());

    let mut config = EvalConfig::default();
    config.relevance.run = RelevanceTypeConfig {
        kind: RelevanceKind::Binary,
        threshold: 1.0,
        max_grade: 3,
        relevant_symbol: "x".to_string(),
        not_relevant_symbol: "x".to_string(),
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("relevance.run"));
}

#[test]
fn test_relevance_type_config_build() {
    let graded = RelevanceTypeConfig {
        kind: RelevanceKind::Graded,
        threshold: 2.0,
        max_grade: 4,
        relevant_symbol: "1".to_string(),
        not_relevant_symbol: "0".to_string(),
    };
    let relevance = graded.build().unwrap();

    assert!(relevance.is_relevant(relevance.read_value("2").unwrap()));
    assert!(!relevance.is_relevant(relevance.read_value("1").unwrap()));
    assert!(relevance.read_value("5").is_err());
}

#[test]
fn test_eval_options_and_metric_tree() {
    let mut config = EvalConfig::default();
    config.evaluation.document_cutoff = Some(10);
    config.evaluation.average_over_all_topics = false;
    config.evaluation.metrics = "set".to_string();

    let options = config.eval_options();
    assert_eq!(options.document_cutoff, Some(10));
    assert!(!options.judged_only);
    assert!(!options.average_over_all_topics);
    assert_eq!(config.metric_tree().unwrap().name(), "set");
}

#[test]
fn test_from_file_reads_values() {
    let file = create_temp_config_file(
        r#"
        [evaluation]
        judged_only = true

        [relevance.run]
        kind = "numeric"
        threshold = 0.5
        "#,
    )
    .unwrap();

    let config = EvalConfig::from_file(file.path()).unwrap();
    assert!(config.evaluation.judged_only);
    assert!(config.evaluation.average_over_all_topics);
    assert_eq!(config.evaluation.metrics, "all_trec");
    assert_eq!(config.relevance.run.threshold, 0.5);
    assert_eq!(config.relevance.qrels, EvalConfig::default().relevance.qrels);
}

#[test]
fn test_from_file_missing_path_uses_defaults() {
    let config = EvalConfig::from_file(Path::new("/nonexistent/treceval.toml")).unwrap();
    assert_eq!(config.evaluation.metrics, "all_trec");
    assert_eq!(config.output.format, OutputFormat::Trec);
}

#[test]
fn test_env_overrides_file() {
    let file = create_temp_config_file(
        r#"
        [output]
        per_topic = false
        "#,
    )
    .unwrap();

    let config = with_env_var("TRECEVAL_OUTPUT__PER_TOPIC", "true", || {
        EvalConfig::from_file(file.path()).unwrap()
    });
    assert!(config.output.per_topic);
}

#[test]
fn test_load_validates() {
    let file = create_temp_config_file(
        r#"
        [evaluation]
        metrics = "everything"
        "#,
    )
    .unwrap();

    assert!(EvalConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_toml_roundtrip_preserves_config() {
    let mut config = EvalConfig::default();
    config.evaluation.document_cutoff = Some(20);
    config.output.format = OutputFormat::Json;

    let text = config.to_toml_string().unwrap();
    assert_eq!(EvalConfig::from_toml_str(&text).unwrap(), config);
}
