//! Append-only log of accepted deposits.

use halo2curves_axiom::bn256::Fr;
use serde::{Deserialize, Serialize};
use zkmsg_common::serde_fr;

/// Emitted once per accepted deposit, carrying the full payload scalar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageDeposited {
    #[serde(with = "serde_fr")]
    pub data: Fr,
}

/// Deposit events in acceptance order. Entries are only ever appended,
/// so an index keeps naming the same event forever.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<MessageDeposited>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn emit(&mut self, event: MessageDeposited) {
        self.entries.push(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Events in the half-open range `[from, to)`, clamped to the log.
    pub fn range(&self, from: usize, to: usize) -> &[MessageDeposited] {
        let to = to.min(self.entries.len());
        let from = from.min(to);
        &self.entries[from..to]
    }
}
