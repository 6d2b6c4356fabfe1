//! Association rules derived from the frequent-itemset lattice.

use rayon::prelude::*;

use crate::error::MiningError;
use crate::events::{EventSink, MiningEvent, NullSink};
use crate::model::{FrequentItemsets, Itemset};
use crate::params::validate_threshold;

/// Itemsets larger than this are not split into rules; a `u128` mask enumerates the subsets.
pub const MAX_RULE_ITEMSET_LEN: usize = 127;

/// `antecedent -> consequent` with its interestingness measures.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    /// Support of `antecedent ∪ consequent`
    pub support: f64,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    /// `+inf` when confidence is 1
    pub conviction: f64,
}

impl Rule {
    /// All items of the rule, sorted.
    pub fn items(&self) -> Vec<String> {
        let mut items: Vec<String> = self
            .antecedent
            .iter()
            .chain(&self.consequent)
            .cloned()
            .collect();
        items.sort();
        items
    }
}

/// Derive every rule whose confidence is at least `min_confidence`.
///
/// Runs on the rayon pool. Rules come out grouped by source itemset, in
/// lattice order, so repeated runs give identical output.
///
/// Itemsets with more than [`MAX_RULE_ITEMSET_LEN`] members are skipped with a
/// warning. Enumerating their splits would take over `2^127` steps anyway.
pub fn generate_rules(
    itemsets: &FrequentItemsets,
    min_confidence: f64,
) -> Result<Vec<Rule>, MiningError> {
    generate_rules_with_events(itemsets, min_confidence, &NullSink)
}

pub fn generate_rules_with_events(
    itemsets: &FrequentItemsets,
    min_confidence: f64,
    events: &dyn EventSink,
) -> Result<Vec<Rule>, MiningError> {
    validate_threshold("min_confidence", min_confidence)?;

    let sources: Vec<&Itemset> = itemsets
        .levels()
        .iter()
        .skip(1)
        .flatten()
        .filter(|itemset| {
            if itemset.len() > MAX_RULE_ITEMSET_LEN {
                tracing::warn!(size = itemset.len(), "itemset too large to split into rules");
                return false;
            }
            true
        })
        .collect();

    let rules: Vec<Rule> = sources
        .par_iter()
        .flat_map_iter(|&union| rules_for_itemset(itemsets, union, min_confidence))
        .collect();

    tracing::debug!(
        itemsets = sources.len(),
        rules = rules.len(),
        min_confidence,
        "rule generation finished"
    );
    events.emit(&MiningEvent::RulesGenerated { total: rules.len() });
    Ok(rules)
}

/// Every split of `union` into non-empty antecedent and consequent that meets the threshold.
fn rules_for_itemset(
    itemsets: &FrequentItemsets,
    union: &Itemset,
    min_confidence: f64,
) -> Vec<Rule> {
    let items = union.items();
    let full: u128 = (1u128 << items.len()) - 1;
    let mut rules = Vec::new();

    for mask in 1..full {
        let (antecedent, consequent) = split(items, mask);
        // Subsets of a frequent itemset are frequent, so both lookups succeed
        let (Some(ante), Some(cons)) = (
            itemsets.get_sorted(&antecedent),
            itemsets.get_sorted(&consequent),
        ) else {
            continue;
        };

        let confidence = union.count() as f64 / ante.count() as f64;
        if confidence < min_confidence {
            continue;
        }

        let lift = confidence / cons.support();
        let leverage = union.support() - ante.support() * cons.support();
        let conviction = if confidence >= 1.0 {
            f64::INFINITY
        } else {
            (1.0 - cons.support()) / (1.0 - confidence)
        };

        rules.push(Rule {
            antecedent,
            consequent,
            support: union.support(),
            antecedent_support: ante.support(),
            consequent_support: cons.support(),
            confidence,
            lift,
            leverage,
            conviction,
        });
    }
    rules
}

fn split(items: &[String], mask: u128) -> (Vec<String>, Vec<String>) {
    let mut inside = Vec::new();
    let mut outside = Vec::new();
    for (bit, item) in items.iter().enumerate() {
        if mask & (1u128 << bit) != 0 {
            inside.push(item.clone());
        } else {
            outside.push(item.clone());
        }
    }
    (inside, outside)
}
