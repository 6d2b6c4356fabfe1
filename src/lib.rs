//! BasketForge: market-basket analysis with frequent itemsets and association rules
//!
//! Order lines are grouped into transactions, a level-wise lattice search finds
//! every itemset above a support threshold, and rules are derived from the
//! lattice subject to a confidence threshold. Results are annotated with item
//! names and estimated order counts.

pub mod annotate;
pub mod cli;
pub mod data;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod rules;
pub mod transaction;
pub mod viz;

// Re-export public items for easier access
pub use annotate::{
    annotate_itemsets, annotate_rules, AnnotatedItemset, AnnotatedRule, ItemNames,
};
pub use cli::Args;
pub use data::{load_order_files, load_order_records, write_report_tables, RecordColumns};
pub use error::MiningError;
pub use events::{EventSink, MiningEvent, NullSink, RecordingSink, TracingSink};
pub use model::{mine_frequent_itemsets, FrequentItemsets, Itemset, LatticeMiner, MinerOptions};
pub use params::{MiningParams, ResolvedParams};
pub use pipeline::{run_analysis, AnalysisOptions, AnalysisReport};
pub use rules::{generate_rules, Rule};
pub use transaction::{build_transactions, OrderRecord, Transaction, TransactionSet};

/// Common result type used by the I/O layers
pub type Result<T> = anyhow::Result<T>;
