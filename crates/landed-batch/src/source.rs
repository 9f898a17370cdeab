//! Where product records come from
use landed_core::{ProductFacts, RawProductRecord, RecordError};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("SOURCE/{product_id}: {message}")]
    Unavailable {
        product_id: String,
        message: String,
        /// Worth retrying (timeouts, throttling, exhausted call budget)
        transient: bool,
    },

    /// The record exists but cannot be priced
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl SourceError {
    pub fn transient(product_id: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::Unavailable {
            product_id: product_id.into(),
            message: message.into(),
            transient: true,
        }
    }

    pub fn permanent(product_id: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::Unavailable {
            product_id: product_id.into(),
            message: message.into(),
            transient: false,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Unavailable { transient: true, .. })
    }
}

/// Async product lookup
pub trait ProductSource: Send + Sync + 'static {
    fn fetch(&self, product_id: &str) -> impl Future<Output = Result<ProductFacts, SourceError>> + Send;
}

/// Records held in memory, converted on fetch
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: HashMap<String, RawProductRecord>,
}

impl InMemorySource {
    pub fn new(records: impl IntoIterator<Item = RawProductRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.product_id.clone(), r))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Product ids in sorted order
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl ProductSource for InMemorySource {
    fn fetch(&self, product_id: &str) -> impl Future<Output = Result<ProductFacts, SourceError>> + Send {
        let result = match self.records.get(product_id) {
            Some(record) => ProductFacts::try_from(record.clone()).map_err(SourceError::from),
            None => Err(SourceError::permanent(product_id, "no such product")),
        };
        std::future::ready(result)
    }
}
