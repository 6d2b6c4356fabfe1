//! Charts and console summaries of mining results using Plotters

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::annotate::{
    sort_itemsets_by_support, sort_rules_by_confidence, AnnotatedItemset, AnnotatedRule,
};
use crate::pipeline::AnalysisReport;

/// Rules whose lift exceeds 1 are drawn in the first colour, the rest in the second.
const LIFT_COLORS: [RGBColor; 2] = [RED, BLUE];

/// Scatter file written by [`generate_visualization_report`].
pub const RULES_SCATTER_FILE: &str = "rules_scatter.png";
/// Bar chart file written by [`generate_visualization_report`].
pub const ITEMSET_CHART_FILE: &str = "itemset_support.png";

/// One point of the rule scatter plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulePoint {
    pub support: f64,
    pub confidence: f64,
    pub positive: bool,
}

pub fn rule_points(rules: &[AnnotatedRule]) -> Vec<RulePoint> {
    rules
        .iter()
        .map(|rule| RulePoint {
            support: rule.support,
            confidence: rule.confidence,
            positive: rule.lift > 1.0,
        })
        .collect()
}

/// The `top` multi-item itemsets by support, labelled with their item names.
pub fn top_itemset_bars(itemsets: &[AnnotatedItemset], top: usize) -> Vec<(String, f64)> {
    let mut rows: Vec<AnnotatedItemset> = itemsets
        .iter()
        .filter(|r| r.size >= 2)
        .cloned()
        .collect();
    sort_itemsets_by_support(&mut rows);
    rows.into_iter()
        .take(top)
        .map(|row| (row.names.join(" + "), row.support))
        .collect()
}

/// Scatter plot of rule support against confidence
pub fn create_rule_scatter(rules: &[AnnotatedRule], output_path: &Path) -> crate::Result<()> {
    let points = rule_points(rules);
    let max_support = points.iter().map(|p| p.support).fold(0.0, f64::max).max(0.01);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Association Rules: Support vs Confidence", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..(max_support * 1.1), 0f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("Support")
        .y_desc("Confidence")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (idx, label) in ["lift > 1", "lift <= 1"].iter().enumerate() {
        let color = LIFT_COLORS[idx];
        let positive = idx == 0;
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|p| p.positive == positive)
                    .map(|p| Circle::new((p.support, p.confidence), 4, color.filled())),
            )?
            .label(*label)
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = %output_path.display(), rules = points.len(), "rule scatter saved");

    Ok(())
}

/// Bar chart of the most supported multi-item itemsets
pub fn create_itemset_support_chart(
    itemsets: &[AnnotatedItemset],
    top: usize,
    output_path: &Path,
) -> crate::Result<()> {
    let bars = top_itemset_bars(itemsets, top);
    let max_support = bars.iter().map(|(_, s)| *s).fold(0.0, f64::max).max(0.01);
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();

    let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Top Itemsets by Support", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(
            -0.5f64..(bars.len().max(1) as f64 - 0.5),
            0f64..(max_support * 1.1),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len().max(1))
        .x_label_formatter(&|x| {
            let idx = x.round();
            if idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .x_desc("Itemset")
        .y_desc("Support")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(idx, (_, support))| {
        let x = idx as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *support)], BLUE.filled())
    }))?;

    root.present()?;
    tracing::info!(path = %output_path.display(), bars = bars.len(), "itemset chart saved");

    Ok(())
}

/// Print headline numbers and the strongest rules to stdout
pub fn print_report_summary(report: &AnalysisReport, top: usize) {
    println!("\n=== Analysis Summary ===");
    println!("Orders: {}", report.total_orders);
    println!("Transactions (2+ items): {}", report.transaction_count);
    println!("Distinct items: {}", report.distinct_items);
    println!("Minimum support: {:.4}", report.params.min_support);
    println!("Minimum confidence: {:.2}", report.params.min_confidence);
    println!("Frequent itemsets: {}", report.itemsets.len());
    println!("  of which 2+ items: {}", report.multi_item_itemsets().count());
    println!("Association rules: {}", report.rules.len());

    if report.rules.is_empty() {
        println!(
            "\nNo rule reached the confidence threshold; \
             try a lower --min-confidence or --min-support."
        );
        return;
    }

    let mut rules = report.rules.clone();
    sort_rules_by_confidence(&mut rules);
    println!("\nTop rules by confidence:");
    println!("  Confidence |   Lift | Orders | Rule");
    println!("  -----------|--------|--------|-----");
    for rule in rules.iter().take(top) {
        println!(
            "  {:10.3} | {:6.2} | {:6} | {} -> {}",
            rule.confidence,
            rule.lift,
            rule.order_count,
            rule.antecedent_names.join(" + "),
            rule.consequent_names.join(" + ")
        );
    }
}

/// Write both charts into `output_dir` and return their paths
pub fn generate_visualization_report(
    report: &AnalysisReport,
    output_dir: &Path,
    top: usize,
) -> crate::Result<Vec<PathBuf>> {
    let scatter_path = output_dir.join(RULES_SCATTER_FILE);
    create_rule_scatter(&report.rules, &scatter_path)?;

    let chart_path = output_dir.join(ITEMSET_CHART_FILE);
    create_itemset_support_chart(&report.itemsets, top, &chart_path)?;

    Ok(vec![scatter_path, chart_path])
}
