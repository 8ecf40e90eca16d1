use std::sync::{Arc, RwLock};

use bytes::Bytes;

use crate::io_struct::ClassificationResult;

/// The most recent (image, result) pair. The image is the RGB-normalized
/// JPEG the result was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestEntry {
    pub image: Bytes,
    pub result: ClassificationResult,
}

/// Single-slot store for the latest classification. The slot starts empty
/// and is only ever replaced wholesale; there is no way back to empty.
///
/// `publish` swaps the slot under a short write lock, so a concurrent
/// reader sees either the previous entry or the new one, never a mix.
#[derive(Debug, Default)]
pub struct LatestCache {
    slot: RwLock<Option<Arc<LatestEntry>>>,
}

impl LatestCache {
    pub fn new() -> Self {
        LatestCache {
            slot: RwLock::new(None),
        }
    }

    pub fn publish(&self, entry: LatestEntry) {
        let entry = Arc::new(entry);
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(entry);
    }

    /// Consistent snapshot of the current entry, or `None` before the first
    /// successful trigger.
    pub fn snapshot(&self) -> Option<Arc<LatestEntry>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
