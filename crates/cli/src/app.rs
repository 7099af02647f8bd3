//! Evaluation driver behind the binary

use crate::args::Cli;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use treceval_core::{
    ConsoleViewer, EvalConfig, Evaluator, JsonFileExporter, OutputConfig, OutputFormat, QrelsFile,
    ResultExporter, TrecFileExporter, TrecRunSet,
};

/// Outcome of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Results were computed and shown
    Evaluated,
    /// A required input was missing; nothing was computed
    Skipped,
}

/// Loads the config file (if any) and applies the command-line flags
pub fn resolve_config(cli: &Cli) -> Result<EvalConfig> {
    let mut config =
        EvalConfig::from_sources(cli.config.as_deref()).context("Failed to load config")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Builds the exporter matching the configured output format
pub fn exporter_for(output: &OutputConfig, path: &Path) -> Box<dyn ResultExporter> {
    match output.format {
        OutputFormat::Trec => Box::new(TrecFileExporter::new(path, output.per_topic)),
        OutputFormat::Json => Box::new(JsonFileExporter::new(path)),
    }
}

/// Lines describing the inputs and the active evaluation options
pub fn active_options(qrels: &Path, runs: &Path, config: &EvalConfig) -> Vec<String> {
    let mut lines = vec![
        format!("qrels: {}", qrels.display()),
        format!("runs: {}", runs.display()),
    ];
    let evaluation = &config.evaluation;
    if let Some(cutoff) = evaluation.document_cutoff {
        lines.push(format!("Num of docs per topic: {cutoff}"));
    }
    if evaluation.judged_only {
        lines.push("Consider only judged docs: active".to_string());
    }
    if evaluation.average_over_all_topics {
        lines.push("Average over all topics in collection: active".to_string());
    }
    lines
}

fn missing_input(what: &str, path: Option<&Path>) -> Option<String> {
    match path {
        None => Some(format!("No {what} given")),
        Some(p) if !p.exists() => Some(format!("{what} not found: {}", p.display())),
        Some(_) => None,
    }
}

/// Runs one evaluation, prints the results and a time summary
///
/// Missing inputs only produce a diagnostic. Import failures are returned
/// as errors; output failures are logged and do not fail the invocation.
pub fn run(cli: &Cli) -> Result<Outcome> {
    let started = Instant::now();

    let (qrels, runs) = match (cli.qrels_path(), cli.run_path()) {
        (Some(qrels), Some(runs)) if qrels.exists() && runs.exists() => (qrels, runs),
        (qrels, runs) => {
            let diagnostic = missing_input("qrels file", qrels)
                .or_else(|| missing_input("run file or directory", runs))
                .unwrap_or_default();
            eprintln!("{diagnostic}, nothing to evaluate");
            eprintln!("Usage: treceval <QRELS> <RUN> [OUTPUT]");
            print_elapsed(started);
            return Ok(Outcome::Skipped);
        }
    };

    let config = resolve_config(cli)?;
    for line in active_options(qrels, runs, &config) {
        println!("{line}");
    }
    let qrels_relevance = config
        .relevance
        .qrels
        .build()
        .context("Invalid qrels relevance")?;
    let run_relevance = config
        .relevance
        .run
        .build()
        .context("Invalid run relevance")?;

    let mut evaluator = Evaluator::new(
        QrelsFile::new(qrels, qrels_relevance),
        TrecRunSet::new(runs, run_relevance),
        config.metric_tree()?,
    )
    .with_options(config.eval_options());

    info!(
        qrels = %qrels.display(),
        runs = %runs.display(),
        metrics = %config.evaluation.metrics,
        "evaluating"
    );
    evaluator.evaluate().context("Evaluation failed")?;

    if let Err(e) = evaluator.show_results(&ConsoleViewer::new(config.output.per_topic)) {
        warn!(error = %e, "results could not be shown");
    }
    if let Some(output) = cli.output_path() {
        let exporter = exporter_for(&config.output, output);
        match evaluator.export_results(exporter.as_ref()) {
            Ok(()) => info!(
                path = %output.display(),
                format = %config.output.format,
                "results exported"
            ),
            Err(e) => warn!(error = %e, "results could not be exported"),
        }
    }

    print_elapsed(started);
    Ok(Outcome::Evaluated)
}

fn print_elapsed(started: Instant) {
    println!("Time elapsed: {:.3} seconds", started.elapsed().as_secs_f64());
}
