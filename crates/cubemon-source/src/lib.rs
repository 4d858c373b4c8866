//! Transaction records and where they come from
//!
//! The record model lives in `types`; records are produced by a
//! `TransactionSource`. The default source generates a synthetic data set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

pub mod error;
pub mod generator;
pub mod types;

pub use error::SourceError;
pub use generator::generate_transactions;
pub use types::{Location, Transaction, TransactionStatus, TransactionType};

// ==================== Source Trait ====================

/// Source reference type
pub type SourceRef = Arc<dyn TransactionSource>;

/// Trait for transaction sources
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Produce the full record list, newest first
    async fn load(&self) -> Result<Vec<Transaction>, SourceError>;

    /// Short description for startup logs
    fn describe(&self) -> String;
}

/// Synthetic data source
#[derive(Debug, Clone)]
pub struct MockTransactionSource {
    pub count: usize,
    pub days_back: u32,
    pub seed: Option<u64>,
    /// Fixed "now"; the wall clock is used when unset
    pub now: Option<DateTime<Utc>>,
}

impl Default for MockTransactionSource {
    fn default() -> Self {
        Self {
            count: 300,
            days_back: 30,
            seed: None,
            now: None,
        }
    }
}

impl MockTransactionSource {
    pub fn new(count: usize, days_back: u32, seed: Option<u64>) -> Self {
        Self {
            count,
            days_back,
            seed,
            now: None,
        }
    }

    /// Pin the generation time (useful for reproducible fixtures)
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

#[async_trait]
impl TransactionSource for MockTransactionSource {
    async fn load(&self) -> Result<Vec<Transaction>, SourceError> {
        let now = self.now.unwrap_or_else(Utc::now);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let transactions = generate_transactions(&mut rng, self.count, self.days_back, now)?;
        log::debug!(
            "Generated {} transactions ending at {}",
            transactions.len(),
            now.to_rfc3339()
        );
        Ok(transactions)
    }

    fn describe(&self) -> String {
        match self.seed {
            Some(seed) => format!("mock ({} records, {} days, seed {})", self.count, self.days_back, seed),
            None => format!("mock ({} records, {} days)", self.count, self.days_back),
        }
    }
}
