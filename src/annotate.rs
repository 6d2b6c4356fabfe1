//! Display names and estimated order counts for mined itemsets and rules.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::FrequentItemsets;
use crate::rules::Rule;

/// Item id to display name lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemNames {
    names: HashMap<String, String>,
}

impl ItemNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name unless the item already has one.
    pub fn insert_if_absent(&mut self, item: &str, name: &str) {
        if !self.names.contains_key(item) {
            self.names.insert(item.to_string(), name.to_string());
        }
    }

    pub fn get(&self, item: &str) -> Option<&str> {
        self.names.get(item).map(String::as_str)
    }

    /// The item's name, or `unknown(<id>)` when it has none.
    pub fn display(&self, item: &str) -> String {
        match self.get(item) {
            Some(name) => name.to_string(),
            None => format!("unknown({item})"),
        }
    }

    pub fn display_all(&self, items: &[String]) -> Vec<String> {
        items.iter().map(|item| self.display(item)).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ItemNames {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut names = Self::new();
        for (item, name) in iter {
            let item = item.into();
            if !names.names.contains_key(&item) {
                names.names.insert(item, name.into());
            }
        }
        names
    }
}

/// One row of the frequent-itemset table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedItemset {
    pub items: Vec<String>,
    pub names: Vec<String>,
    pub size: usize,
    pub support: f64,
    pub order_count: usize,
}

/// One row of the association-rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub antecedent_names: Vec<String>,
    pub consequent_names: Vec<String>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    pub conviction: f64,
    pub order_count: usize,
}

/// `round(support * transaction_count)`.
pub fn estimated_order_count(support: f64, transaction_count: usize) -> usize {
    (support * transaction_count as f64).round() as usize
}

pub fn annotate_itemsets(itemsets: &FrequentItemsets, names: &ItemNames) -> Vec<AnnotatedItemset> {
    let total = itemsets.transaction_count();
    itemsets
        .iter()
        .map(|itemset| AnnotatedItemset {
            items: itemset.items().to_vec(),
            names: names.display_all(itemset.items()),
            size: itemset.len(),
            support: itemset.support(),
            order_count: estimated_order_count(itemset.support(), total),
        })
        .collect()
}

pub fn annotate_rules(
    rules: &[Rule],
    names: &ItemNames,
    transaction_count: usize,
) -> Vec<AnnotatedRule> {
    rules
        .iter()
        .map(|rule| AnnotatedRule {
            antecedent: rule.antecedent.clone(),
            consequent: rule.consequent.clone(),
            antecedent_names: names.display_all(&rule.antecedent),
            consequent_names: names.display_all(&rule.consequent),
            support: rule.support,
            confidence: rule.confidence,
            lift: rule.lift,
            leverage: rule.leverage,
            conviction: rule.conviction,
            order_count: estimated_order_count(rule.support, transaction_count),
        })
        .collect()
}

/// Highest support first; ties by members.
pub fn sort_itemsets_by_support(rows: &mut [AnnotatedItemset]) {
    rows.sort_by(|a, b| {
        descending(a.support, b.support).then_with(|| a.items.cmp(&b.items))
    });
}

/// Highest confidence first, then highest lift; ties by antecedent and consequent.
pub fn sort_rules_by_confidence(rows: &mut [AnnotatedRule]) {
    rows.sort_by(|a, b| {
        descending(a.confidence, b.confidence)
            .then_with(|| descending(a.lift, b.lift))
            .then_with(|| a.antecedent.cmp(&b.antecedent))
            .then_with(|| a.consequent.cmp(&b.consequent))
    });
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
