//! In-memory transaction store
//!
//! Append-only list in creation order. Listing and export keep that order.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    AccountBalance, Currency, NewTransaction, Transaction, TransactionStatus, TransactionType,
};
use crate::validation::TransactionFilters;

#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction with a fresh id and the current timestamp
    pub fn create(&mut self, new: NewTransaction) -> Transaction {
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            from_account: new.from_account,
            to_account: new.to_account,
            amount: new.amount,
            currency: new.currency,
            tx_type: new.tx_type,
            timestamp: Utc::now(),
            status: new.status,
        };

        debug!(
            transaction_id = %transaction.id,
            tx_type = %transaction.tx_type,
            amount = %transaction.amount,
            "Transaction created"
        );
        self.transactions.push(transaction.clone());
        transaction
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Every transaction matching all present filters, in creation order
    pub fn list(&self, filters: &TransactionFilters) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| {
                filters
                    .account_id
                    .as_deref()
                    .map_or(true, |account| t.involves(account))
            })
            .filter(|t| filters.tx_type.map_or(true, |tx_type| t.tx_type == tx_type))
            .filter(|t| filters.from.map_or(true, |from| t.timestamp >= from))
            .filter(|t| filters.to.map_or(true, |to| t.timestamp <= to))
            .cloned()
            .collect()
    }

    /// Net balance of `account_id` over its completed transactions
    pub fn balance(&self, account_id: &str) -> AccountBalance {
        let counted: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed && t.involves(account_id))
            .collect();

        let balance: Decimal = counted
            .iter()
            .map(|t| signed_amount(t, account_id))
            .sum();

        AccountBalance {
            account_id: account_id.to_string(),
            balance: balance.round_dp(2),
            currency: counted.first().map_or(Currency::default(), |t| t.currency),
            transaction_count: counted.len(),
        }
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    pub fn count(&self) -> usize {
        self.transactions.len()
    }
}

/// Effect of `t` on `account_id`
fn signed_amount(t: &Transaction, account_id: &str) -> Decimal {
    let incoming = t.to_account.as_deref() == Some(account_id);
    let outgoing = t.from_account.as_deref() == Some(account_id);

    match t.tx_type {
        TransactionType::Deposit if incoming => t.amount,
        TransactionType::Withdrawal if outgoing => -t.amount,
        TransactionType::Transfer => {
            let mut delta = Decimal::ZERO;
            if incoming {
                delta += t.amount;
            }
            if outgoing {
                delta -= t.amount;
            }
            delta
        }
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_tx(
        tx_type: TransactionType,
        from: Option<&str>,
        to: Option<&str>,
        amount: Decimal,
    ) -> NewTransaction {
        NewTransaction {
            from_account: from.map(str::to_string),
            to_account: to.map(str::to_string),
            amount,
            currency: Currency::Eur,
            tx_type,
            status: TransactionStatus::Completed,
        }
    }

    fn seeded() -> TransactionStore {
        let mut store = TransactionStore::new();
        store.create(new_tx(
            TransactionType::Deposit,
            None,
            Some("ACC-AAAAA"),
            Decimal::new(100000, 2),
        ));
        store.create(new_tx(
            TransactionType::Withdrawal,
            Some("ACC-AAAAA"),
            None,
            Decimal::new(25025, 2),
        ));
        store.create(new_tx(
            TransactionType::Transfer,
            Some("ACC-AAAAA"),
            Some("ACC-BBBBB"),
            Decimal::new(10010, 2),
        ));
        store
    }

    #[test]
    fn create_assigns_unique_ids() {
        let store = seeded();
        let all = store.list(&TransactionFilters::default());
        assert_eq!(all.len(), 3);
        assert_ne!(all[0].id, all[1].id);
        assert_eq!(store.find_by_id(&all[2].id), Some(&all[2]));
        assert!(store.find_by_id("missing").is_none());
    }

    #[test]
    fn account_filter_matches_either_leg() {
        let store = seeded();
        let filters = TransactionFilters {
            account_id: Some("ACC-BBBBB".into()),
            ..Default::default()
        };
        let found = store.list(&filters);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tx_type, TransactionType::Transfer);

        let filters = TransactionFilters {
            account_id: Some("ACC-AAAAA".into()),
            tx_type: Some(TransactionType::Withdrawal),
            ..Default::default()
        };
        assert_eq!(store.list(&filters).len(), 1);
    }

    #[test]
    fn date_range_filters() {
        let store = seeded();
        let now = Utc::now();
        let filters = TransactionFilters {
            from: Some(now - Duration::hours(1)),
            to: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        assert_eq!(store.list(&filters).len(), 3);

        let filters = TransactionFilters {
            from: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        assert!(store.list(&filters).is_empty());
    }

    #[test]
    fn balance_nets_both_legs() {
        let store = seeded();

        let a = store.balance("ACC-AAAAA");
        // 1000.00 - 250.25 - 100.10
        assert_eq!(a.balance, Decimal::new(64965, 2));
        assert_eq!(a.transaction_count, 3);
        assert_eq!(a.currency, Currency::Eur);

        let b = store.balance("ACC-BBBBB");
        assert_eq!(b.balance, Decimal::new(10010, 2));
        assert_eq!(b.transaction_count, 1);
    }

    #[test]
    fn balance_ignores_non_completed() {
        let mut store = TransactionStore::new();
        let mut pending = new_tx(
            TransactionType::Deposit,
            None,
            Some("ACC-CCCCC"),
            Decimal::new(500, 0),
        );
        pending.status = TransactionStatus::Pending;
        store.create(pending);

        let balance = store.balance("ACC-CCCCC");
        assert_eq!(balance.balance, Decimal::ZERO);
        assert_eq!(balance.transaction_count, 0);
        assert_eq!(balance.currency, Currency::Usd);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = seeded();
        store.clear();
        assert_eq!(store.count(), 0);
    }
}
