use clap::Parser;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treceval::{active_options, resolve_config, run, Cli, Outcome};

const QRELS: &str = "\
1 0 docA 1
1 0 docB 0
2 0 docD 2
";

const RUN: &str = "\
1 Q0 docA 1 3.0 runX
1 Q0 docC 2 2.0 runX
1 Q0 docB 3 1.0 runX
";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn inputs() -> (TempDir, String, String) {
    let dir = tempfile::tempdir().unwrap();
    let qrels = write(dir.path(), "qrels.txt", QRELS);
    let run = write(dir.path(), "run.txt", RUN);
    (
        dir,
        qrels.display().to_string(),
        run.display().to_string(),
    )
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("treceval").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_missing_inputs_skip_evaluation() {
    let (_dir, qrels, _run) = inputs();

    assert_eq!(run(&parse(&[])).unwrap(), Outcome::Skipped);
    assert_eq!(run(&parse(&["none", "none"])).unwrap(), Outcome::Skipped);
    assert_eq!(run(&parse(&[qrels.as_str(), "none"])).unwrap(), Outcome::Skipped);
    assert_eq!(
        run(&parse(&[qrels.as_str(), "/nonexistent/run.txt"])).unwrap(),
        Outcome::Skipped
    );
}

#[test]
fn test_evaluate_and_export_trec() {
    let (dir, qrels, runs) = inputs();
    let output = dir.path().join("results.txt");
    let output_arg = output.display().to_string();

    let cli = parse(&[
        "-q",
        "-m",
        "set",
        qrels.as_str(),
        runs.as_str(),
        output_arg.as_str(),
    ]);
    assert_eq!(run(&cli).unwrap(), Outcome::Evaluated);

    let text = fs::read_to_string(&output).unwrap();
    let set_p = text
        .lines()
        .find(|line| line.starts_with("set_P") && line.contains("\tall\t"))
        .unwrap();
    // topic 2 is judged but unanswered and counts as 0 by default
    assert!(set_p.ends_with("0.1667"));
    assert!(text.lines().any(|line| line.starts_with("set_P") && line.contains("\t1\t")));
}

fn overall_line(output: &Path, metric: &str) -> String {
    let text = fs::read_to_string(output).unwrap();
    text.lines()
        .find(|line| {
            let mut fields = line.split('\t');
            fields.next().map(str::trim_end) == Some(metric) && fields.next() == Some("all")
        })
        .unwrap()
        .to_string()
}

#[test]
fn test_answered_topics_only_flag() {
    let (dir, qrels, runs) = inputs();
    let output = dir.path().join("results.txt");
    let output_arg = output.display().to_string();

    let cli = parse(&[
        "--answered-topics-only",
        "-m",
        "set",
        qrels.as_str(),
        runs.as_str(),
        output_arg.as_str(),
    ]);
    assert_eq!(run(&cli).unwrap(), Outcome::Evaluated);

    assert!(overall_line(&output, "set_P").ends_with("0.3333"));
}

#[test]
fn test_zero_cutoff_scores_nothing() {
    let (dir, qrels, runs) = inputs();
    let output = dir.path().join("results.txt");
    let output_arg = output.display().to_string();

    let cli = parse(&[
        "-M",
        "0",
        "-m",
        "all_trec",
        qrels.as_str(),
        runs.as_str(),
        output_arg.as_str(),
    ]);
    assert_eq!(run(&cli).unwrap(), Outcome::Evaluated);

    assert!(overall_line(&output, "set_P").ends_with("0.0000"));
    assert!(overall_line(&output, "map").ends_with("0.0000"));
    assert!(overall_line(&output, "num_ret").ends_with("\t0"));
}

#[test]
fn test_active_options_are_listed() {
    let (_dir, qrels, runs) = inputs();
    let cli = parse(&["-J", "-M", "5", qrels.as_str(), runs.as_str()]);
    let config = resolve_config(&cli).unwrap();

    let lines = active_options(Path::new(&qrels), Path::new(&runs), &config);
    assert_eq!(
        lines,
        vec![
            format!("qrels: {qrels}"),
            format!("runs: {runs}"),
            "Num of docs per topic: 5".to_string(),
            "Consider only judged docs: active".to_string(),
            "Average over all topics in collection: active".to_string(),
        ]
    );

    let cli = parse(&["--answered-topics-only", qrels.as_str(), runs.as_str()]);
    let config = resolve_config(&cli).unwrap();
    let lines = active_options(Path::new(&qrels), Path::new(&runs), &config);
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_judged_only_flag() {
    let (dir, qrels, runs) = inputs();
    let output = dir.path().join("results.txt");
    let output_arg = output.display().to_string();

    let cli = parse(&[
        "-J",
        "-m",
        "set",
        qrels.as_str(),
        runs.as_str(),
        output_arg.as_str(),
    ]);
    run(&cli).unwrap();

    // 1/2 on topic 1, 0 on the unanswered topic 2
    assert!(overall_line(&output, "set_P").ends_with("0.2500"));
}

#[test]
fn test_export_json() {
    let (dir, qrels, runs) = inputs();
    let output = dir.path().join("nested").join("results.json");
    let output_arg = output.display().to_string();

    let cli = parse(&[
        "--format",
        "json",
        qrels.as_str(),
        runs.as_str(),
        output_arg.as_str(),
    ]);
    run(&cli).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("\"runX\""));
    assert!(text.contains("\"granularity\""));
}

#[test]
fn test_malformed_qrels_fail() {
    let dir = tempfile::tempdir().unwrap();
    let qrels = write(dir.path(), "qrels.txt", "1 0 docA\n");
    let runs = write(dir.path(), "run.txt", RUN);

    let (qrels, runs) = (qrels.display().to_string(), runs.display().to_string());
    let cli = parse(&[qrels.as_str(), runs.as_str()]);
    let err = run(&cli).unwrap_err();
    assert!(format!("{err:#}").contains("line 1"));
}

#[test]
fn test_config_file_is_merged_with_flags() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "treceval.toml",
        r#"
        [evaluation]
        document_cutoff = 0
        metrics = "everything"
        "#,
    );
    let config_arg = config.display().to_string();

    // the flag repairs the invalid bundle from the file
    let cli = parse(&["--config", config_arg.as_str(), "-m", "recall", "q", "r"]);
    let resolved = resolve_config(&cli).unwrap();
    assert_eq!(resolved.evaluation.document_cutoff, Some(0));
    assert_eq!(resolved.evaluation.metrics, "recall");
    assert!(resolved.evaluation.average_over_all_topics);

    let cli = parse(&["--config", config_arg.as_str(), "q", "r"]);
    assert!(resolve_config(&cli).is_err());
}
