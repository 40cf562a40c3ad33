use crate::voucher::Voucher;
use async_std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The single storage slot: one file holding the whole record collection
/// as a JSON array. Reads and writes never surface errors. A failed read
/// is an empty collection; a failed write leaves the previous blob in
/// place while the in-memory collection stays authoritative for the rest
/// of the session.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Store {
            path: path.as_ref().to_owned(),
        }
    }

    pub async fn load(&self) -> Vec<Voucher> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) => {
                debug!("No readable voucher file at {:?}: {}", self.path, err);
                return Vec::new();
            }
        };
        let mut records: Vec<Voucher> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!("Ignoring unparsable voucher file {:?}: {}", self.path, err);
                return Vec::new();
            }
        };
        // stored totals are a cache of the raw quantities, prices, and
        // trip costs; re-derive them rather than trust the blob
        for record in &mut records {
            if let Err(err) = record.recompute_totals() {
                warn!("Keeping stored totals for {}: {}", record.id, err);
            }
        }
        records
    }

    pub async fn save(&self, records: &[Voucher]) {
        let blob = match serde_json::to_string(records) {
            Ok(blob) => blob,
            Err(err) => {
                warn!("Failed to serialize {} vouchers: {}", records.len(), err);
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, blob).await {
            warn!("Failed to write voucher file {:?}: {}", self.path, err);
        }
    }
}
