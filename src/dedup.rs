//! Seen Set + Pending Buffer.
//!
//! Single-threaded by design: the engine is the only owner, so a plain
//! `HashSet` and `Vec` suffice (running two engines against one store is
//! unsupported).

use std::collections::HashSet;

use crate::record::BidRecord;

pub struct DedupBuffer {
    seen: HashSet<String>,
    pending: Vec<BidRecord>,
}

impl DedupBuffer {
    /// `seen` is preloaded from the record store at startup.
    pub fn new(seen: HashSet<String>) -> Self {
        Self {
            seen,
            pending: Vec::new(),
        }
    }

    pub fn is_new(&self, bid_no: &str) -> bool {
        !self.seen.contains(bid_no)
    }

    /// Buffers the record and marks its id seen. Idempotent: a duplicate id
    /// is a no-op and returns false.
    pub fn accept(&mut self, record: BidRecord) -> bool {
        if !self.is_new(&record.bid_no) {
            return false;
        }
        self.seen.insert(record.bid_no.clone());
        self.pending.push(record);
        true
    }

    /// Returns and clears the pending buffer.
    pub fn flush(&mut self) -> Vec<BidRecord> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }
}
