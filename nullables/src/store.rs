//! Nullable audit store: thread-safe in-memory log for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use vx_store::{AuditStore, LogEntry, StoreError};
use vx_types::{AuditRecord, Commitment, Registration, RevealPackage};

/// An in-memory [`AuditStore`] that keeps entries in write order.
pub struct NullAuditStore {
    entries: Mutex<Vec<LogEntry>>,
    fail_writes: AtomicBool,
}

impl NullAuditStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Everything written so far (for assertions).
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store write failure".into()));
        }
        Ok(())
    }
}

impl Default for NullAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for NullAuditStore {
    fn record_registration(&self, registration: &Registration) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        let exists = entries.iter().any(
            |e| matches!(e, LogEntry::Registration(r) if r.commitment == registration.commitment),
        );
        if exists {
            return Err(StoreError::Duplicate("registration".into()));
        }
        entries.push(LogEntry::Registration(registration.clone()));
        Ok(())
    }

    fn registration(&self, commitment: &Commitment) -> Result<Option<Registration>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find_map(|e| match e {
                LogEntry::Registration(r) if r.commitment == *commitment => Some(r.clone()),
                _ => None,
            }))
    }

    fn record_round(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        let duplicate = entries.iter().any(|e| {
            matches!(e, LogEntry::Round(r) if r.commitment == record.commitment && r.round == record.round)
        });
        if duplicate {
            return Err(StoreError::Duplicate(format!("round {}", record.round)));
        }
        entries.push(LogEntry::Round(record.clone()));
        Ok(())
    }

    fn rounds(&self, commitment: &Commitment) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                LogEntry::Round(r) if r.commitment == *commitment => Some(r.clone()),
                _ => None,
            })
            .collect())
    }

    fn record_reveal(&self, reveal: &RevealPackage) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        let exists = entries
            .iter()
            .any(|e| matches!(e, LogEntry::Reveal(r) if r.commitment == reveal.commitment));
        if exists {
            return Err(StoreError::AlreadyRevealed(reveal.commitment));
        }
        entries.push(LogEntry::Reveal(reveal.clone()));
        Ok(())
    }

    fn reveal(&self, commitment: &Commitment) -> Result<Option<RevealPackage>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find_map(|e| match e {
                LogEntry::Reveal(r) if r.commitment == *commitment => Some(r.clone()),
                _ => None,
            }))
    }

    fn commitments(&self) -> Result<Vec<Commitment>, StoreError> {
        let mut seen = Vec::new();
        for entry in self.entries.lock().unwrap().iter() {
            let c = match entry {
                LogEntry::Registration(r) => r.commitment,
                LogEntry::Round(r) => r.commitment,
                LogEntry::Reveal(r) => r.commitment,
            };
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vx_types::{CommitMode, Contribution, RoundKey, Signature};

    fn record(round: u64) -> AuditRecord {
        AuditRecord {
            commitment: Commitment::new([1u8; 32]),
            message: Contribution::new(vec![round as u8]),
            round: RoundKey::new(round),
            context: Vec::new(),
            signature: Signature::new(vec![0u8; 96]),
        }
    }

    #[test]
    fn write_failure_injection() {
        let store = NullAuditStore::new();
        store.record_round(&record(1)).unwrap();
        store.fail_writes(true);
        assert!(store.record_round(&record(2)).is_err());
        store.fail_writes(false);
        store.record_round(&record(2)).unwrap();
        assert_eq!(store.rounds(&Commitment::new([1u8; 32])).unwrap().len(), 2);
    }

    #[test]
    fn single_reveal() {
        let store = NullAuditStore::new();
        let reveal = RevealPackage {
            commitment: Commitment::new([1u8; 32]),
            mode: CommitMode::Single,
            secret: [0u8; 32],
            context: None,
        };
        store.record_reveal(&reveal).unwrap();
        assert!(matches!(
            store.record_reveal(&reveal),
            Err(StoreError::AlreadyRevealed(_))
        ));
        assert_eq!(store.commitments().unwrap().len(), 1);
    }
}
