//! The Record Persister: decode, stamp, insert.
//!
//! Every failure stops at this boundary. A submission that cannot be parsed
//! or stored is logged and dropped; the caller only learns the [`Outcome`].

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info};

use crate::error::Result;
use crate::record::Record;
use crate::store::DocumentStore;

/// What happened to one submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Stored,
    Dropped,
}

pub struct Persister {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl Persister {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self { store, collection: collection.into() }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Parses `text`, stamps it with the current local time and inserts it
    /// as one document. Never fails; errors are logged and the record dropped.
    pub async fn persist(&self, text: &str) -> Outcome {
        match self.try_persist(text).await {
            Ok(record) => {
                info!(collection = %self.collection, fields = record.len(), "record stored");
                Outcome::Stored
            }
            Err(e) => {
                error!(collection = %self.collection, error = %e, "record dropped");
                Outcome::Dropped
            }
        }
    }

    async fn try_persist(&self, text: &str) -> Result<Record> {
        let mut record = Record::parse(text)?;
        record.stamp(Local::now());
        let document = record.to_document()?;
        self.store.insert(&self.collection, &document).await?;
        Ok(record)
    }
}
