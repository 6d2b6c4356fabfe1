//! BasketForge: market-basket analysis CLI
//!
//! This is the main entrypoint that orchestrates order loading, itemset mining,
//! rule generation, table export and optional charts.

use anyhow::Result;
use basketforge::logging::init_logging;
use basketforge::{
    load_order_files, run_analysis, viz, write_report_tables, AnalysisOptions, Args, TracingSink,
};
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(&args.log_config())?;

    // Reject bad thresholds before touching the input files
    let params = args.mining_params()?;
    params.validate()?;

    println!("=== Market-Basket Analysis ===\n");
    let start_time = Instant::now();

    // Step 1: Load order lines
    let load_start = Instant::now();
    let records = load_order_files(&args.input, &args.record_columns())?;
    println!(
        "✓ Order lines loaded: {} ({:.2}s)",
        records.len(),
        load_start.elapsed().as_secs_f64()
    );

    // Step 2: Mine itemsets and rules
    let mine_start = Instant::now();
    let options = AnalysisOptions {
        max_len: args.max_len,
        sequential: args.sequential,
        cancel: None,
    };
    let mut report = run_analysis(&records, &params, &options, &TracingSink)?;
    println!(
        "✓ Mining complete: {} itemsets, {} rules ({:.2}s)",
        report.itemsets.len(),
        report.rules.len(),
        mine_start.elapsed().as_secs_f64()
    );

    // Step 3: Export tables, strongest rows first
    basketforge::annotate::sort_itemsets_by_support(&mut report.itemsets);
    basketforge::annotate::sort_rules_by_confidence(&mut report.rules);
    let (itemsets_path, rules_path) =
        write_report_tables(&report.itemsets, &report.rules, &args.output_dir)?;

    viz::print_report_summary(&report, args.top);

    // Step 4: Optional charts
    if args.plot {
        let charts = viz::generate_visualization_report(&report, &args.output_dir, args.top)?;
        for chart in charts {
            println!("Chart saved to: {}", chart.display());
        }
    }

    println!("\n=== Analysis Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("Frequent itemsets saved to: {}", itemsets_path.display());
    println!("Association rules saved to: {}", rules_path.display());

    Ok(())
}
