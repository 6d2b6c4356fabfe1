//! End-to-end analysis: order lines in, annotated itemset and rule tables out.

use std::sync::atomic::AtomicBool;

use crate::annotate::{annotate_itemsets, annotate_rules, AnnotatedItemset, AnnotatedRule};
use crate::error::MiningError;
use crate::events::EventSink;
use crate::model::{LatticeMiner, MinerOptions};
use crate::params::{MiningParams, ResolvedParams};
use crate::rules::generate_rules_with_events;
use crate::transaction::{build_transactions, OrderRecord};

/// Knobs that do not change which itemsets qualify.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions<'a> {
    pub max_len: Option<usize>,
    pub sequential: bool,
    pub cancel: Option<&'a AtomicBool>,
}

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub total_orders: usize,
    pub transaction_count: usize,
    pub distinct_items: usize,
    pub params: ResolvedParams,
    pub itemsets: Vec<AnnotatedItemset>,
    pub rules: Vec<AnnotatedRule>,
}

impl AnalysisReport {
    /// Itemsets with at least two members.
    pub fn multi_item_itemsets(&self) -> impl Iterator<Item = &AnnotatedItemset> {
        self.itemsets.iter().filter(|row| row.size >= 2)
    }
}

/// Build transactions, mine the lattice, derive rules and annotate both tables.
///
/// Explicit thresholds are validated before any work; defaults are resolved
/// once the transaction count is known. Rows come back in lattice order.
pub fn run_analysis(
    records: &[OrderRecord],
    params: &MiningParams,
    options: &AnalysisOptions<'_>,
    events: &dyn EventSink,
) -> Result<AnalysisReport, MiningError> {
    params.validate()?;

    let transactions = build_transactions(records, events)?;
    let resolved = params.resolve(transactions.len())?;
    tracing::info!(
        min_support = resolved.min_support,
        min_confidence = resolved.min_confidence,
        transactions = transactions.len(),
        "mining parameters resolved"
    );

    let mut miner_options = MinerOptions::new(resolved.min_support);
    miner_options.max_len = options.max_len;
    miner_options.parallel = !options.sequential;

    let mut miner = LatticeMiner::new(miner_options).with_events(events);
    if let Some(cancel) = options.cancel {
        miner = miner.with_cancellation(cancel);
    }
    let itemsets = miner.mine(&transactions)?;

    let rules = generate_rules_with_events(&itemsets, resolved.min_confidence, events)?;

    let names = transactions.item_names();
    if names.is_empty() {
        tracing::debug!("no item names in input; rows are labelled with placeholders");
    }
    Ok(AnalysisReport {
        total_orders: transactions.total_orders(),
        transaction_count: transactions.len(),
        distinct_items: transactions.distinct_items().len(),
        params: resolved,
        itemsets: annotate_itemsets(&itemsets, names),
        rules: annotate_rules(&rules, names, itemsets.transaction_count()),
    })
}
