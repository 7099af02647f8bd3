mod common;

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use treceval_core::metrics::all_trec;
use treceval_core::{
    CollectionProvider, EvalState, Evaluator, GradedRelevanceType, JsonFileExporter,
    NumericRelevanceType, QrelsFile, ResultExporter, ResultGroup, RunSetProvider, RunSource,
    TrecFileExporter, TrecRunSet,
};

const QRELS: &str = "\
401 0 doc1 2
401 0 doc2 0
401 0 doc3 1
401 0 doc4 -1
402 0 doc7 3
402 0 doc8 0
";

const RUN_A: &str = "\
401 Q0 doc1 1 9.5 alpha
401 Q0 doc4 2 8.0 alpha
401 Q0 doc2 3 7.5 alpha
402 Q0 doc8 1 3.0 alpha
402 Q0 doc7 2 2.0 alpha
";

const RUN_B: &str = "\
401 Q0 doc3 1 1.0 beta
402 Q0 doc7 1 0.5 beta
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn graded() -> Arc<GradedRelevanceType> {
    Arc::new(GradedRelevanceType::new(3, 1).unwrap())
}

fn scores() -> Arc<NumericRelevanceType> {
    Arc::new(NumericRelevanceType::default())
}

fn setup() -> (TempDir, QrelsFile, TrecRunSet) {
    common::init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let qrels = write(dir.path(), "qrels.txt", QRELS);
    let runs = dir.path().join("runs");
    fs::create_dir(&runs).unwrap();
    write(&runs, "b.run", RUN_B);
    write(&runs, "a.run", RUN_A);
    write(&runs, ".hidden", "garbage");
    (
        dir,
        QrelsFile::new(qrels, graded()),
        TrecRunSet::new(runs, scores()),
    )
}

fn scalar(group: &ResultGroup, name: &str) -> f64 {
    group.scalar(name).unwrap()
}

#[test]
fn test_run_directory_is_read_in_name_order() {
    let (_dir, qrels, runs) = setup();
    let collection = qrels.create_collection().unwrap();
    let sources = runs.create_run_set(&collection).unwrap();

    let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(sources[0].size(), 5);
    assert_eq!(sources[1].size(), 2);
}

#[test]
fn test_evaluate_trec_files() {
    let (_dir, qrels, runs) = setup();
    let mut evaluator = Evaluator::new(qrels, runs, all_trec());
    evaluator.evaluate().unwrap();

    assert_eq!(evaluator.state(), EvalState::Done);
    let overall = evaluator.results().unwrap();
    let alpha = overall.group("alpha").unwrap();
    let beta = overall.group("beta").unwrap();

    assert_eq!(scalar(alpha, "num_q"), 2.0);
    assert_eq!(scalar(alpha, "num_ret"), 5.0);
    assert_eq!(scalar(alpha, "num_judged"), 6.0);
    // 401: doc1, doc3 relevant; 402: doc7 relevant
    assert_eq!(scalar(alpha, "num_rel"), 3.0);
    assert_eq!(scalar(alpha, "num_rel_ret"), 2.0);
    assert_eq!(scalar(beta, "num_rel_ret"), 2.0);

    let topic = alpha.group("402").unwrap();
    assert_eq!(scalar(topic, "recip_rank"), 0.5);
    assert_eq!(scalar(beta.group("402").unwrap(), "recip_rank"), 1.0);
}

#[test]
fn test_single_run_file() {
    let dir = tempfile::tempdir().unwrap();
    let qrels = write(dir.path(), "qrels.txt", QRELS);
    let run = write(dir.path(), "only.run", RUN_B);

    let mut evaluator = Evaluator::new(
        QrelsFile::new(qrels, graded()),
        TrecRunSet::new(run, scores()),
        all_trec(),
    );
    evaluator.evaluate().unwrap();

    let overall = evaluator.results().unwrap();
    assert_eq!(overall.groups().count(), 1);
    assert_eq!(scalar(overall.group("beta").unwrap(), "P_5"), 0.2);
}

#[test]
fn test_malformed_run_fails_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let qrels = write(dir.path(), "qrels.txt", QRELS);
    let run = write(dir.path(), "bad.run", "401 Q0 doc1 1 9.5 alpha\n401 Q0 doc2 2\n");

    let mut evaluator = Evaluator::new(
        QrelsFile::new(qrels, graded()),
        TrecRunSet::new(run, scores()),
        all_trec(),
    );
    let err = evaluator.evaluate().unwrap_err();

    assert!(err.to_string().contains("line 2"));
    assert_eq!(evaluator.state(), EvalState::Failed);
    assert!(evaluator.results().is_none());
}

#[test]
fn test_empty_run_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let qrels = write(dir.path(), "qrels.txt", QRELS);
    let runs = dir.path().join("runs");
    fs::create_dir(&runs).unwrap();

    let mut evaluator = Evaluator::new(
        QrelsFile::new(qrels, graded()),
        TrecRunSet::new(runs, scores()),
        all_trec(),
    );
    assert!(evaluator.evaluate().is_err());
    assert_eq!(evaluator.state(), EvalState::Failed);
}

#[test]
fn test_exporters_write_files() {
    let (dir, qrels, runs) = setup();
    let mut evaluator = Evaluator::new(qrels, runs, all_trec());
    evaluator.evaluate().unwrap();

    let trec_path = dir.path().join("out").join("results.txt");
    evaluator
        .export_results(&TrecFileExporter::new(&trec_path, true))
        .unwrap();
    let text = fs::read_to_string(&trec_path).unwrap();
    assert!(text.lines().any(|line| line.starts_with("map") && line.contains("\t401\t")));
    assert!(text.lines().any(|line| line.contains("\tall\talpha")));
    assert!(text.lines().any(|line| line.contains("\tall\toverall")));

    let json_path = dir.path().join("results.json");
    JsonFileExporter::new(&json_path)
        .export(evaluator.results().unwrap())
        .unwrap();
    let parsed: ResultGroup =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(&parsed, evaluator.results().unwrap());
}
