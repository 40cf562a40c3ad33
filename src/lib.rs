pub mod export;
pub mod money;
pub mod rollup;
pub mod store;
pub mod voucher;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use store::Store;
use voucher::Voucher;
use voucher::draft::Draft;
use voucher::id::{self, VoucherId};

/// The voucher book: the full record collection, newest first, plus its
/// backing store. Sole owner of mutations; every create, update, or
/// delete replaces the collection and persists it whole in the same
/// step.
pub struct Book {
    records: Vec<Voucher>,
    store: Store,
}

impl Book {
    /// Opens the book over its store, degrading to an empty collection
    /// when the slot is missing or unreadable.
    pub async fn open(store: Store) -> Self {
        let records = store.load().await;
        Book { records, store }
    }

    pub fn records(&self) -> &[Voucher] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Voucher> {
        self.records.iter().find(|record| record.id.as_str() == id)
    }

    /// Saves a new voucher: allocates the next id for the month of
    /// `today`, prepends, persists. Returns the allocated id.
    pub async fn create(&mut self, draft: &Draft, today: NaiveDate) -> Result<VoucherId> {
        let id = id::next_id(&self.records, today);
        let voucher = draft.build(id.clone())?;
        self.records.insert(0, voucher);
        self.store.save(&self.records).await;
        Ok(id)
    }

    /// Replaces every field of an existing voucher except its id.
    pub async fn update(&mut self, id: &str, draft: &Draft) -> Result<()> {
        let existing = self.get(id).context(format!("No voucher {:?}", id))?;
        let voucher = draft.build(existing.id.clone())?;
        let records = self
            .records
            .iter()
            .map(|record| {
                if record.id.as_str() == id {
                    voucher.clone()
                } else {
                    record.clone()
                }
            })
            .collect();
        self.records = records;
        self.store.save(&self.records).await;
        Ok(())
    }

    /// Removes a voucher by id and persists. Returns whether anything
    /// was removed. Confirmation lives at the caller; this is final.
    pub async fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id.as_str() != id);
        let removed = self.records.len() < before;
        if removed {
            self.store.save(&self.records).await;
        }
        removed
    }
}
