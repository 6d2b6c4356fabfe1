//! Grouping of raw order lines into market-basket transactions.

use std::collections::{HashMap, HashSet};

use crate::annotate::ItemNames;
use crate::error::MiningError;
use crate::events::{EventSink, MiningEvent};

/// One order line as delivered by the ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub order_id: String,
    pub item_id: String,
    pub item_name: Option<String>,
}

impl OrderRecord {
    pub fn new(order_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            item_id: item_id.into(),
            item_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }
}

/// The distinct items of one order, in first-seen order. Always holds at least two items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    order_id: String,
    items: Vec<String>,
}

impl Transaction {
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }
}

/// Immutable input of a mining run.
#[derive(Debug, Clone)]
pub struct TransactionSet {
    transactions: Vec<Transaction>,
    total_orders: usize,
    item_names: ItemNames,
}

impl TransactionSet {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of distinct order ids seen in the input, including discarded ones.
    pub fn total_orders(&self) -> usize {
        self.total_orders
    }

    /// Orders dropped because they held fewer than two distinct items.
    pub fn discarded_orders(&self) -> usize {
        self.total_orders - self.transactions.len()
    }

    /// Item names taken from the first occurrence of each item in a retained order.
    pub fn item_names(&self) -> &ItemNames {
        &self.item_names
    }

    /// Distinct item ids across all transactions, sorted.
    pub fn distinct_items(&self) -> Vec<String> {
        let mut items: Vec<String> = self
            .transactions
            .iter()
            .flat_map(|t| t.items.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        items.sort();
        items
    }
}

struct OrderGroup<'a> {
    order_id: &'a str,
    items: Vec<&'a OrderRecord>,
    seen: HashSet<&'a str>,
}

/// Group records by order id, collapse repeated items and keep orders with two or more items.
///
/// Fails with [`MiningError::EmptyInput`] when no order qualifies.
pub fn build_transactions(
    records: &[OrderRecord],
    events: &dyn EventSink,
) -> Result<TransactionSet, MiningError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<OrderGroup<'_>> = Vec::new();

    for record in records {
        let slot = *index.entry(record.order_id.as_str()).or_insert_with(|| {
            groups.push(OrderGroup {
                order_id: &record.order_id,
                items: Vec::new(),
                seen: HashSet::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        // First occurrence wins, including its name
        if group.seen.insert(record.item_id.as_str()) {
            group.items.push(record);
        }
    }

    let total_orders = groups.len();
    let mut item_names = ItemNames::new();
    let mut transactions = Vec::new();

    for group in groups.into_iter().filter(|g| g.items.len() >= 2) {
        for record in &group.items {
            if let Some(name) = &record.item_name {
                item_names.insert_if_absent(&record.item_id, name);
            }
        }
        transactions.push(Transaction {
            order_id: group.order_id.to_string(),
            items: group.items.iter().map(|r| r.item_id.clone()).collect(),
        });
    }

    events.emit(&MiningEvent::TransactionsBuilt {
        orders: total_orders,
        transactions: transactions.len(),
        discarded: total_orders - transactions.len(),
    });

    if transactions.is_empty() {
        tracing::warn!(orders = total_orders, "no order holds two or more distinct items");
        return Err(MiningError::EmptyInput {
            orders: total_orders,
        });
    }

    Ok(TransactionSet {
        transactions,
        total_orders,
        item_names,
    })
}

/// Build a transaction set directly from item lists, one per order.
///
/// Order ids are the positions in `baskets`. Useful for callers that already
/// hold grouped data.
pub fn from_baskets<I, B, S>(baskets: I) -> Result<TransactionSet, MiningError>
where
    I: IntoIterator<Item = B>,
    B: IntoIterator<Item = S>,
    S: Into<String>,
{
    let records: Vec<OrderRecord> = baskets
        .into_iter()
        .enumerate()
        .flat_map(|(order, items)| {
            items
                .into_iter()
                .map(move |item| OrderRecord::new(order.to_string(), item))
        })
        .collect();
    build_transactions(&records, &crate::events::NullSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullSink, RecordingSink};

    #[test]
    fn test_groups_and_discards_single_item_orders() {
        let records = vec![
            OrderRecord::new("T1", "a"),
            OrderRecord::new("T1", "b"),
            OrderRecord::new("T2", "a"),
            OrderRecord::new("T3", "b"),
            OrderRecord::new("T3", "c"),
        ];

        let set = build_transactions(&records, &NullSink).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(set.transactions().iter().all(|t| !t.is_empty() && t.len() == 2));
        assert_eq!(set.total_orders(), 3);
        assert_eq!(set.discarded_orders(), 1);
        assert_eq!(set.transactions()[0].order_id(), "T1");
        assert_eq!(set.transactions()[1].items(), ["b", "c"]);
    }

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let records = vec![
            OrderRecord::new("A", "x").with_name("first name"),
            OrderRecord::new("A", "y").with_name("why"),
            OrderRecord::new("A", "x").with_name("second name"),
        ];

        let set = build_transactions(&records, &NullSink).unwrap();
        assert_eq!(set.transactions()[0].items(), ["x", "y"]);
        assert_eq!(set.item_names().get("x"), Some("first name"));
    }

    #[test]
    fn test_repeated_single_item_is_discarded() {
        // Two lines of the same item is still a one-item basket
        let records = vec![OrderRecord::new("A", "x"), OrderRecord::new("A", "x")];
        let err = build_transactions(&records, &NullSink).unwrap_err();
        assert_eq!(err, MiningError::EmptyInput { orders: 1 });
    }

    #[test]
    fn test_only_single_item_orders_is_empty_input() {
        let records = vec![
            OrderRecord::new("1", "a"),
            OrderRecord::new("2", "b"),
            OrderRecord::new("3", "c"),
        ];
        let result = build_transactions(&records, &NullSink);
        assert!(matches!(result, Err(MiningError::EmptyInput { orders: 3 })));

        let result = build_transactions(&[], &NullSink);
        assert!(matches!(result, Err(MiningError::EmptyInput { orders: 0 })));
    }

    #[test]
    fn test_names_only_from_retained_orders() {
        let records = vec![
            OrderRecord::new("solo", "z").with_name("lonely"),
            OrderRecord::new("pair", "a").with_name("apple"),
            OrderRecord::new("pair", "z"),
        ];
        let set = build_transactions(&records, &NullSink).unwrap();
        assert_eq!(set.item_names().get("a"), Some("apple"));
        assert_eq!(set.item_names().get("z"), None);

        let records = vec![OrderRecord::new("p", "a"), OrderRecord::new("p", "b")];
        assert!(build_transactions(&records, &NullSink)
            .unwrap()
            .item_names()
            .is_empty());
    }

    #[test]
    fn test_emits_event() {
        let sink = RecordingSink::new();
        let records = vec![
            OrderRecord::new("1", "a"),
            OrderRecord::new("1", "b"),
            OrderRecord::new("2", "a"),
        ];
        build_transactions(&records, &sink).unwrap();
        assert_eq!(
            sink.events(),
            vec![MiningEvent::TransactionsBuilt {
                orders: 2,
                transactions: 1,
                discarded: 1
            }]
        );
    }

    #[test]
    fn test_from_baskets() {
        let set = from_baskets(vec![vec!["b", "a"], vec!["c"], vec!["a", "c", "a"]]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.distinct_items(), ["a", "b", "c"]);
        assert!(set.transactions()[1].contains("c"));
    }
}
