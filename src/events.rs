//! Structured progress events emitted by the mining stages.
//!
//! The engine never prints. Each stage reports what it did through an
//! [`EventSink`], and the caller decides how to render it.

use std::sync::Mutex;

/// A stage-level progress report.
#[derive(Debug, Clone, PartialEq)]
pub enum MiningEvent {
    /// Raw records were grouped into transactions.
    TransactionsBuilt {
        orders: usize,
        transactions: usize,
        discarded: usize,
    },
    /// One level of the itemset lattice was counted.
    LevelCompleted {
        level: usize,
        candidates: usize,
        pruned: usize,
        frequent: usize,
    },
    /// The lattice search finished.
    ItemsetsMined { total: usize },
    /// Rule generation finished.
    RulesGenerated { total: usize },
}

/// Receiver of [`MiningEvent`]s.
pub trait EventSink: Sync {
    fn emit(&self, event: &MiningEvent);
}

impl<F> EventSink for F
where
    F: Fn(&MiningEvent) + Sync,
{
    fn emit(&self, event: &MiningEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &MiningEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &MiningEvent) {
        match *event {
            MiningEvent::TransactionsBuilt {
                orders,
                transactions,
                discarded,
            } => {
                tracing::info!(orders, transactions, discarded, "transactions built");
            }
            MiningEvent::LevelCompleted {
                level,
                candidates,
                pruned,
                frequent,
            } => {
                tracing::debug!(level, candidates, pruned, frequent, "lattice level completed");
            }
            MiningEvent::ItemsetsMined { total } => {
                tracing::info!(itemsets = total, "frequent itemsets mined");
            }
            MiningEvent::RulesGenerated { total } => {
                tracing::info!(rules = total, "association rules generated");
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MiningEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<MiningEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &MiningEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
