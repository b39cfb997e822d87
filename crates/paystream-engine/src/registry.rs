//! Append-only registry of every payee that has ever had a stream.

use std::collections::HashSet;

use paystream_core::types::AccountId;

/// Ordered, deduplicated list of payees. Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct PayeeRegistry {
    order: Vec<AccountId>,
    seen: HashSet<AccountId>,
}

impl PayeeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `payee` if it is not already listed. Returns whether it was added.
    pub fn register(&mut self, payee: AccountId) -> bool {
        if !self.seen.insert(payee) {
            return false;
        }
        self.order.push(payee);
        true
    }

    pub fn contains(&self, payee: &AccountId) -> bool {
        self.seen.contains(payee)
    }

    /// Payees in first-registration order.
    pub fn payees(&self) -> &[AccountId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
