//! Acquisition ledger: the record of which segments are safely on disk.
//!
//! Both polling cycles share one [`Ledger`]. A fetch first reserves its key
//! with [`Ledger::try_claim`], so the same segment is never downloaded by two
//! tasks at once; the reservation becomes a permanent `Downloaded` mark only
//! after the bytes have been written.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    InFlight,
    Downloaded,
}

#[derive(Debug, Default)]
pub struct Ledger {
    entries: DashMap<String, EntryState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_downloaded(&self, segment: &str) -> bool {
        self.entries
            .get(segment)
            .is_some_and(|state| *state == EntryState::Downloaded)
    }

    /// Reserves `segment` for download. Returns `None` when it is already
    /// downloaded or another task holds the reservation.
    pub fn try_claim(&self, segment: &str) -> Option<ClaimGuard<'_>> {
        match self.entries.entry(segment.to_owned()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(EntryState::InFlight);
                Some(ClaimGuard {
                    ledger: self,
                    segment: segment.to_owned(),
                    completed: false,
                })
            }
        }
    }

    /// Marks `segment` downloaded. Idempotent; a mark is never undone.
    pub fn mark_downloaded(&self, segment: &str) {
        self.entries
            .insert(segment.to_owned(), EntryState::Downloaded);
    }

    /// Point-in-time copy of every downloaded key, in no particular order.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| *entry.value() == EntryState::Downloaded)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Number of downloaded segments.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| *entry.value() == EntryState::Downloaded)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, segment: &str) {
        self.entries
            .remove_if(segment, |_, state| *state == EntryState::InFlight);
    }
}

/// In-flight reservation of one ledger key. Dropping the guard without
/// calling [`ClaimGuard::complete`] makes the key eligible again.
#[derive(Debug)]
pub struct ClaimGuard<'a> {
    ledger: &'a Ledger,
    segment: String,
    completed: bool,
}

impl ClaimGuard<'_> {
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Converts the reservation into a permanent `Downloaded` mark.
    pub fn complete(mut self) {
        self.ledger.mark_downloaded(&self.segment);
        self.completed = true;
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.ledger.release(&self.segment);
        }
    }
}
