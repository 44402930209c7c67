//! Data models for the ledger service

pub mod transaction;

pub use transaction::{
    AccountBalance, Currency, NewTransaction, Transaction, TransactionStatus, TransactionType,
};
