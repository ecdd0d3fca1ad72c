use std::error::Error;
use std::path::PathBuf;

use attrbench_suite::{read_json, TrendView};
use clap::Args;

#[derive(Args, Debug)]
pub struct TrendArgs {
    /// Report written by `attrbench run`.
    #[arg(long)]
    pub report: PathBuf,
}

pub fn run(args: &TrendArgs) -> Result<(), Box<dyn Error>> {
    let report = read_json(&args.report)?;
    print!("{}", render(&report.trend));
    Ok(())
}

pub fn render(view: &TrendView) -> String {
    let mut out = String::new();
    for panel in &view.panels {
        let axis = if panel.invert_y { ", inverted" } else { "" };
        out.push_str(&format!("== {} ==\n", panel.key));
        out.push_str(&format!("x: {}\ny: {}{}\n", panel.x_label, panel.y_label, axis));
        for series in &panel.series {
            let start = series.ys.first().copied().unwrap_or(f64::NAN);
            let end = series.ys.last().copied().unwrap_or(f64::NAN);
            out.push_str(&format!(
                "  {:<32} {:>10.4} -> {:>10.4}\n",
                series.label, start, end
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrbench_suite::{TrendPanel, TrendSeries};

    #[test]
    fn panels_list_series_labels() {
        let view = TrendView {
            panels: vec![TrendPanel {
                key: "remove positive".parse().unwrap(),
                x_label: "Max Fraction of Features Removed".to_string(),
                y_label: "Mean Model Output".to_string(),
                invert_y: true,
                series: vec![TrendSeries {
                    explainer: "linear".to_string(),
                    label: "-1.5 - linear".to_string(),
                    auc: -1.5,
                    xs: vec![0.0, 1.0],
                    ys: vec![3.0, 0.0],
                }],
            }],
        };
        let text = render(&view);
        assert!(text.starts_with("== remove positive ==\n"));
        assert!(text.contains("y: Mean Model Output, inverted"));
        assert!(text.contains("-1.5 - linear"));
    }
}
