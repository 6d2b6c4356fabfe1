//! Level-wise frequent-itemset search over a one-hot transaction matrix

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::Array2;
use rayon::prelude::*;

use crate::error::MiningError;
use crate::events::{EventSink, MiningEvent, NullSink};
use crate::params::validate_threshold;
use crate::transaction::TransactionSet;

/// A set of items together with how often it occurs.
#[derive(Debug, Clone, PartialEq)]
pub struct Itemset {
    /// Member item ids, sorted
    items: Vec<String>,
    /// Fraction of transactions containing every member
    support: f64,
    /// Number of transactions containing every member
    count: usize,
}

impl Itemset {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn support(&self) -> f64 {
        self.support
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Options for a lattice search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinerOptions {
    /// Minimum support in (0, 1], inclusive
    pub min_support: f64,
    /// Largest itemset size to search, unbounded when `None`
    pub max_len: Option<usize>,
    /// Count candidate support on the rayon pool
    pub parallel: bool,
}

impl MinerOptions {
    pub fn new(min_support: f64) -> Self {
        Self {
            min_support,
            max_len: None,
            parallel: true,
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn validate(&self) -> Result<(), MiningError> {
        validate_threshold("min_support", self.min_support)?;
        if self.max_len == Some(0) {
            return Err(MiningError::invalid("max_len", 0, "must be at least 1"));
        }
        Ok(())
    }
}

/// Every frequent itemset of a run, grouped by size.
///
/// All levels are retained so rule generation can look up the support of any
/// subset without rescanning transactions.
#[derive(Debug, Clone)]
pub struct FrequentItemsets {
    levels: Vec<Vec<Itemset>>,
    index: HashMap<Vec<String>, usize>,
    flat: Vec<(usize, usize)>,
    transaction_count: usize,
    min_support: f64,
}

impl FrequentItemsets {
    fn from_levels(levels: Vec<Vec<Itemset>>, transaction_count: usize, min_support: f64) -> Self {
        let mut index = HashMap::new();
        let mut flat = Vec::new();
        for (level, itemsets) in levels.iter().enumerate() {
            for (pos, itemset) in itemsets.iter().enumerate() {
                index.insert(itemset.items.clone(), flat.len());
                flat.push((level, pos));
            }
        }
        Self {
            levels,
            index,
            flat,
            transaction_count,
            min_support,
        }
    }

    /// Itemsets of size `level + 1`.
    pub fn levels(&self) -> &[Vec<Itemset>] {
        &self.levels
    }

    /// Itemsets of the given size, empty when none reached the threshold.
    pub fn of_size(&self, size: usize) -> &[Itemset] {
        size.checked_sub(1)
            .and_then(|level| self.levels.get(level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Itemset> {
        self.levels.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    /// Size of the largest frequent itemset, 0 when empty.
    pub fn max_size(&self) -> usize {
        self.levels.len()
    }

    /// Look up a frequent itemset by its members, in any order.
    pub fn get<S: AsRef<str>>(&self, items: &[S]) -> Option<&Itemset> {
        let mut key: Vec<String> = items.iter().map(|s| s.as_ref().to_string()).collect();
        key.sort();
        key.dedup();
        self.get_sorted(&key)
    }

    /// Support of a frequent itemset, `None` if it is not frequent.
    pub fn support_of<S: AsRef<str>>(&self, items: &[S]) -> Option<f64> {
        self.get(items).map(Itemset::support)
    }

    pub(crate) fn get_sorted(&self, items: &[String]) -> Option<&Itemset> {
        let &slot = self.index.get(items)?;
        let (level, pos) = self.flat[slot];
        Some(&self.levels[level][pos])
    }
}

/// Transactions encoded as a dense boolean matrix: one row per transaction,
/// one column per distinct item.
struct OneHot {
    items: Vec<String>,
    matrix: Array2<bool>,
}

impl OneHot {
    fn encode(transactions: &TransactionSet) -> Self {
        let items = transactions.distinct_items();
        let column: HashMap<&str, usize> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.as_str(), idx))
            .collect();

        let mut matrix = Array2::from_elem((transactions.len(), items.len()), false);
        for (row, transaction) in transactions.transactions().iter().enumerate() {
            for item in transaction.items() {
                if let Some(&col) = column.get(item.as_str()) {
                    matrix[[row, col]] = true;
                }
            }
        }
        Self { items, matrix }
    }

    fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of transactions containing every column in `candidate`.
    fn count(&self, candidate: &[usize]) -> usize {
        self.matrix
            .outer_iter()
            .filter(|row| candidate.iter().all(|&col| row[col]))
            .count()
    }
}

/// Lattice search configured with options, an event sink and an optional cancellation flag.
pub struct LatticeMiner<'a> {
    options: MinerOptions,
    events: &'a dyn EventSink,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> LatticeMiner<'a> {
    pub fn new(options: MinerOptions) -> Self {
        Self {
            options,
            events: &NullSink,
            cancel: None,
        }
    }

    pub fn with_events(mut self, events: &'a dyn EventSink) -> Self {
        self.events = events;
        self
    }

    /// Checked before each level starts; a set flag aborts the run.
    pub fn with_cancellation(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Find every itemset whose support is at least `min_support`.
    pub fn mine(&self, transactions: &TransactionSet) -> Result<FrequentItemsets, MiningError> {
        self.options.validate()?;

        let n = transactions.len();
        let min_support = self.options.min_support;
        if transactions.is_empty() {
            return Ok(FrequentItemsets::from_levels(Vec::new(), 0, min_support));
        }

        let encoded = OneHot::encode(transactions);
        let max_len = self
            .options
            .max_len
            .unwrap_or(usize::MAX)
            .min(encoded.items.len());

        let mut levels: Vec<Vec<Itemset>> = Vec::new();
        // Column-index form of the previous level, sorted lexicographically
        let mut previous: Vec<Vec<usize>> = Vec::new();

        for size in 1..=max_len {
            self.check_cancelled(size)?;

            let (candidates, pruned) = if size == 1 {
                ((0..encoded.items.len()).map(|col| vec![col]).collect(), 0)
            } else {
                generate_candidates(&previous)
            };
            let total_candidates = candidates.len() + pruned;

            let counted = self.count_candidates(&encoded, candidates);
            let frequent: Vec<(Vec<usize>, usize)> = counted
                .into_iter()
                .filter(|(_, count)| support(*count, encoded.rows()) >= min_support)
                .collect();

            self.events.emit(&MiningEvent::LevelCompleted {
                level: size,
                candidates: total_candidates,
                pruned,
                frequent: frequent.len(),
            });

            if frequent.is_empty() {
                break;
            }

            levels.push(
                frequent
                    .iter()
                    .map(|(cols, count)| Itemset {
                        items: cols.iter().map(|&c| encoded.items[c].clone()).collect(),
                        support: support(*count, encoded.rows()),
                        count: *count,
                    })
                    .collect(),
            );
            previous = frequent.into_iter().map(|(cols, _)| cols).collect();
        }

        let result = FrequentItemsets::from_levels(levels, n, min_support);
        self.events.emit(&MiningEvent::ItemsetsMined {
            total: result.len(),
        });
        Ok(result)
    }

    fn check_cancelled(&self, level: usize) -> Result<(), MiningError> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                tracing::warn!(level, "mining cancelled");
                Err(MiningError::Cancelled { level })
            }
            _ => Ok(()),
        }
    }

    fn count_candidates(
        &self,
        encoded: &OneHot,
        candidates: Vec<Vec<usize>>,
    ) -> Vec<(Vec<usize>, usize)> {
        if self.options.parallel {
            candidates
                .into_par_iter()
                .map(|candidate| {
                    let count = encoded.count(&candidate);
                    (candidate, count)
                })
                .collect()
        } else {
            candidates
                .into_iter()
                .map(|candidate| {
                    let count = encoded.count(&candidate);
                    (candidate, count)
                })
                .collect()
        }
    }
}

/// Mine with default options apart from the support threshold.
pub fn mine_frequent_itemsets(
    transactions: &TransactionSet,
    min_support: f64,
) -> Result<FrequentItemsets, MiningError> {
    LatticeMiner::new(MinerOptions::new(min_support)).mine(transactions)
}

fn support(count: usize, total: usize) -> f64 {
    count as f64 / total as f64
}

/// Join frequent (k-1)-itemsets sharing their first k-2 members, then drop any
/// candidate with an infrequent (k-1)-subset.
///
/// `previous` must be sorted and each member vector sorted ascending; the
/// returned candidates keep that order. Also returns how many joined
/// candidates were pruned.
fn generate_candidates(previous: &[Vec<usize>]) -> (Vec<Vec<usize>>, usize) {
    let known: HashSet<&[usize]> = previous.iter().map(Vec::as_slice).collect();
    let mut candidates = Vec::new();
    let mut pruned = 0;

    for (i, left) in previous.iter().enumerate() {
        let prefix = &left[..left.len() - 1];
        for right in &previous[i + 1..] {
            // Sorted input: once the prefix differs no later entry shares it
            if &right[..right.len() - 1] != prefix {
                break;
            }
            let mut candidate = left.clone();
            candidate.push(right[right.len() - 1]);

            if has_infrequent_subset(&candidate, &known) {
                pruned += 1;
            } else {
                candidates.push(candidate);
            }
        }
    }
    (candidates, pruned)
}

fn has_infrequent_subset(candidate: &[usize], known: &HashSet<&[usize]>) -> bool {
    // Dropping either of the last two members yields one of the joined parents
    let checks = candidate.len().saturating_sub(2);
    let mut subset = Vec::with_capacity(candidate.len() - 1);
    (0..checks).any(|skip| {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|&(pos, _)| pos != skip)
                .map(|(_, &col)| col),
        );
        !known.contains(subset.as_slice())
    })
}
