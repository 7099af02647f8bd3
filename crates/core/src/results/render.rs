//! trec_eval-style text rendering

use super::{Aggregation, Granularity, ResultGroup, ScalarResult};
use std::io::{self, Write};

const ALL_TOPICS: &str = "all";

fn write_scalar<W: Write>(out: &mut W, scalar: &ScalarResult, topic: &str) -> io::Result<()> {
    // counts print as integers; a cross-run mean of counts may be fractional
    match scalar.aggregation {
        Aggregation::Sum if scalar.value.fract() == 0.0 => {
            writeln!(out, "{:<22}\t{}\t{:.0}", scalar.name, topic, scalar.value)
        }
        _ => writeln!(out, "{:<22}\t{}\t{:.4}", scalar.name, topic, scalar.value),
    }
}

fn write_run<W: Write>(out: &mut W, run: &ResultGroup, per_topic: bool) -> io::Result<()> {
    writeln!(out, "{:<22}\t{}\t{}", "runid", ALL_TOPICS, run.name())?;
    if per_topic {
        for topic in run.groups() {
            for scalar in topic.scalars() {
                write_scalar(out, scalar, topic.name())?;
            }
        }
    }
    for scalar in run.scalars() {
        write_scalar(out, scalar, ALL_TOPICS)?;
    }
    Ok(())
}

/// Writes `name<TAB>topic<TAB>value` lines for any level of the tree
///
/// Runs are written in order; per-topic lines precede the run summary
/// when `per_topic` is set. Cross-run means follow when more than one run
/// was evaluated.
pub fn write_trec_format<W: Write>(
    out: &mut W,
    results: &ResultGroup,
    per_topic: bool,
) -> io::Result<()> {
    match results.granularity() {
        Granularity::Overall => {
            let mut runs = 0;
            for run in results.groups() {
                write_run(out, run, per_topic)?;
                runs += 1;
            }
            if runs > 1 {
                writeln!(out, "{:<22}\t{}\t{}", "runid", ALL_TOPICS, "overall")?;
                for scalar in results.scalars() {
                    write_scalar(out, scalar, ALL_TOPICS)?;
                }
            }
            Ok(())
        }
        Granularity::Run => write_run(out, results, per_topic),
        Granularity::Topic => {
            for scalar in results.scalars() {
                write_scalar(out, scalar, results.name())?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ResultGroup {
        let mut topic = ResultGroup::new("401", Granularity::Topic);
        topic.push_scalar("num_ret", 3.0, Aggregation::Sum);
        topic.push_scalar("map", 0.5, Aggregation::Mean);
        let mut run = ResultGroup::new("runX", Granularity::Run);
        run.push_scalar("num_ret", 3.0, Aggregation::Sum);
        run.push_scalar("map", 0.5, Aggregation::Mean);
        run.push_group(topic);
        let mut root = ResultGroup::new("", Granularity::Overall);
        root.push_group(run);
        root.push_scalar("map", 0.5, Aggregation::Mean);
        root
    }

    fn render(results: &ResultGroup, per_topic: bool) -> String {
        let mut buf = Vec::new();
        write_trec_format(&mut buf, results, per_topic).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_summary_lines() {
        let text = render(&sample(), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "runid                 \tall\trunX",
                "num_ret               \tall\t3",
                "map                   \tall\t0.5000",
            ]
        );
    }

    #[test]
    fn test_overall_block_prints_counts_as_counts() {
        let mut root = ResultGroup::new("", Granularity::Overall);
        for (name, num_ret) in [("runX", 3.0), ("runY", 5.0)] {
            let mut run = ResultGroup::new(name, Granularity::Run);
            run.push_scalar("num_ret", num_ret, Aggregation::Sum);
            root.push_group(run);
        }
        root.push_scalar("num_ret", 4.0, Aggregation::Sum);
        root.push_scalar("num_q", 1.5, Aggregation::Sum);
        root.push_scalar("map", 0.25, Aggregation::Mean);

        let text = render(&root, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[4..].to_vec(),
            vec![
                "runid                 \tall\toverall",
                "num_ret               \tall\t4",
                "num_q                 \tall\t1.5000",
                "map                   \tall\t0.2500",
            ]
        );
    }

    #[test]
    fn test_per_topic_lines_precede_summary() {
        let text = render(&sample(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "num_ret               \t401\t3");
        assert_eq!(lines[4], "map                   \tall\t0.5000");
    }
}
