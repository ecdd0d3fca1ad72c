use std::error::Error;
use std::path::PathBuf;

use attrbench_suite::{read_json, ComparisonView};
use clap::Args;

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Report written by `attrbench run`.
    #[arg(long)]
    pub report: PathBuf,
}

pub fn run(args: &CompareArgs) -> Result<(), Box<dyn Error>> {
    let report = read_json(&args.report)?;
    print!("{}", render(&report.comparison));
    Ok(())
}

pub fn render(view: &ComparisonView) -> String {
    let mut out = format!("{:<20} {:>8}", "explainer", "anchor");
    for key in &view.metrics {
        out.push_str(&format!(" {:>18}", key.to_string()));
    }
    out.push('\n');
    for row in &view.rows {
        out.push_str(&format!("{:<20} {:>8.3}", row.explainer, row.anchor));
        for score in &row.scores {
            out.push_str(&format!(" {:>18.3}", score));
        }
        out.push('\n');
    }
    if !view.excluded.is_empty() {
        let excluded: Vec<String> = view.excluded.iter().map(ToString::to_string).collect();
        out.push_str(&format!("excluded: {}\n", excluded.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrbench_suite::ComparisonRow;

    #[test]
    fn table_has_one_line_per_explainer_and_lists_exclusions() {
        let view = ComparisonView {
            explainers: vec!["a".to_string(), "b".to_string()],
            metrics: vec!["keep absolute".parse().unwrap()],
            excluded: vec!["remove negative".parse().unwrap()],
            rows: vec![
                ComparisonRow {
                    explainer: "a".to_string(),
                    anchor: 0.0,
                    scores: vec![1.0],
                },
                ComparisonRow {
                    explainer: "b".to_string(),
                    anchor: 1.0,
                    scores: vec![0.0],
                },
            ],
        };
        let text = render(&view);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("keep absolute"));
        assert!(lines[1].starts_with("a "));
        assert_eq!(lines[3], "excluded: remove negative");
    }
}
