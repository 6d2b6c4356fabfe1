//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::data::RecordColumns;
use crate::logging::{LogConfig, LogFormat};
use crate::params::{parse_threshold, MiningParams};

/// Market-basket analysis: frequent itemsets and association rules from order lines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input CSV files (one row per order line); unreadable files are skipped
    #[arg(short, long, num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Column holding the order identifier
    #[arg(long, default_value = "order_id")]
    pub order_column: String,

    /// Column holding the item identifier
    #[arg(long, default_value = "item_id")]
    pub item_column: String,

    /// Column holding the item display name
    #[arg(long, default_value = "item_name")]
    pub name_column: String,

    /// Item id to drop before analysis (repeatable)
    #[arg(short = 'x', long = "exclude-item", value_name = "ITEM")]
    pub exclude_items: Vec<String>,

    /// Minimum support in (0, 1]; defaults to max(1/transactions, 0.01)
    #[arg(short = 's', long)]
    pub min_support: Option<String>,

    /// Minimum confidence in (0, 1]; defaults to 0.6
    #[arg(short = 'c', long)]
    pub min_confidence: Option<String>,

    /// Largest itemset size to search
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Directory for the result tables and charts
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Also write PNG charts of the results
    #[arg(long)]
    pub plot: bool,

    /// Number of rules and itemsets shown in summaries and charts
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Count support on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,
}

impl Args {
    /// Parse the optional threshold strings. Blank values count as absent.
    pub fn mining_params(&self) -> crate::Result<MiningParams> {
        let min_support = match &self.min_support {
            Some(raw) => parse_threshold("min_support", raw)?,
            None => None,
        };
        let min_confidence = match &self.min_confidence {
            Some(raw) => parse_threshold("min_confidence", raw)?,
            None => None,
        };
        Ok(MiningParams::new(min_support, min_confidence))
    }

    pub fn record_columns(&self) -> RecordColumns {
        RecordColumns {
            order_id: self.order_column.clone(),
            item_id: self.item_column.clone(),
            item_name: Some(self.name_column.clone()),
            excluded_items: self.exclude_items.clone(),
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            ..LogConfig::from_verbosity(self.verbose)
        }
    }
}
