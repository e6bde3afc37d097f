//! Append-only JSON-lines audit log.
//!
//! One entry per line, tagged by `kind`. Each append is flushed and synced
//! before returning; a failed append is cut back off the file. The whole file
//! is indexed in memory on open, after dropping an unterminated last line left
//! by a crash mid-write.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use vx_types::{AuditRecord, Commitment, Registration, RevealPackage};

use crate::{AuditStore, StoreError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Registration(Registration),
    Round(AuditRecord),
    Reveal(RevealPackage),
}

#[derive(Default)]
struct Index {
    order: Vec<Commitment>,
    registrations: HashMap<Commitment, Registration>,
    rounds: HashMap<Commitment, Vec<AuditRecord>>,
    reveals: HashMap<Commitment, RevealPackage>,
}

impl Index {
    fn see(&mut self, commitment: Commitment) {
        if !self.order.contains(&commitment) {
            self.order.push(commitment);
        }
    }

    fn check_round(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let exists = self
            .rounds
            .get(&record.commitment)
            .is_some_and(|rs| rs.iter().any(|r| r.round == record.round));
        if exists {
            return Err(StoreError::Duplicate(format!(
                "round {} of {}",
                record.round,
                record.commitment.short()
            )));
        }
        Ok(())
    }

    fn apply(&mut self, entry: LogEntry) -> Result<(), StoreError> {
        match entry {
            LogEntry::Registration(registration) => {
                if self.registrations.contains_key(&registration.commitment) {
                    return Err(StoreError::Duplicate(format!(
                        "registration of {}",
                        registration.commitment.short()
                    )));
                }
                self.see(registration.commitment);
                self.registrations
                    .insert(registration.commitment, registration);
            }
            LogEntry::Round(record) => {
                self.check_round(&record)?;
                self.see(record.commitment);
                self.rounds.entry(record.commitment).or_default().push(record);
            }
            LogEntry::Reveal(reveal) => {
                if self.reveals.contains_key(&reveal.commitment) {
                    return Err(StoreError::AlreadyRevealed(reveal.commitment));
                }
                self.see(reveal.commitment);
                self.reveals.insert(reveal.commitment, reveal);
            }
        }
        Ok(())
    }
}

struct Inner {
    file: File,
    index: Index,
}

pub struct JsonlAuditStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl JsonlAuditStore {
    /// Open (or create) the log at `path` and index its entries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let index = if path.exists() {
            repair_torn_tail(&path)?;
            read_index(&path)?
        } else {
            Index::default()
        };
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!(path = %path.display(), sessions = index.order.len(), "opened audit log");
        Ok(Self {
            path,
            inner: Mutex::new(Inner { file, index }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("audit log lock poisoned".into()))
    }
}

/// Read every entry of a log without opening it for writing.
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<LogEntry>, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|e| StoreError::Corruption {
            line: i + 1,
            reason: e.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn read_index(path: &Path) -> Result<Index, StoreError> {
    let mut index = Index::default();
    for entry in read_entries(path)? {
        index.apply(entry)?;
    }
    Ok(index)
}

/// Drop a trailing line without its newline. If that line is a complete
/// entry, terminate it instead so the next append starts on a fresh line.
fn repair_torn_tail(path: &Path) -> Result<(), StoreError> {
    let bytes = fs::read(path)?;
    if matches!(bytes.last(), None | Some(b'\n')) {
        return Ok(());
    }
    let start = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let mut file = OpenOptions::new().write(true).open(path)?;
    if serde_json::from_slice::<LogEntry>(&bytes[start..]).is_ok() {
        file.seek(SeekFrom::End(0))?;
        file.write_all(b"\n")?;
    } else {
        tracing::warn!(
            path = %path.display(),
            dropped = bytes.len() - start,
            "dropping torn entry at end of audit log"
        );
        file.set_len(start as u64)?;
    }
    file.sync_data()?;
    Ok(())
}

fn append(file: &mut File, entry: &LogEntry) -> Result<(), StoreError> {
    let mut line =
        serde_json::to_vec(entry).map_err(|e| StoreError::Serialization(e.to_string()))?;
    line.push(b'\n');
    let len = file.metadata()?.len();
    if let Err(e) = write_line(file, &line) {
        tracing::error!(error = %e, "audit append failed, truncating to last entry");
        file.set_len(len)?;
        return Err(e.into());
    }
    Ok(())
}

fn write_line(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line)?;
    file.flush()?;
    file.sync_data()
}

impl AuditStore for JsonlAuditStore {
    fn record_registration(&self, registration: &Registration) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.index.registrations.contains_key(&registration.commitment) {
            return Err(StoreError::Duplicate(format!(
                "registration of {}",
                registration.commitment.short()
            )));
        }
        let entry = LogEntry::Registration(registration.clone());
        append(&mut inner.file, &entry)?;
        inner.index.apply(entry)
    }

    fn registration(&self, commitment: &Commitment) -> Result<Option<Registration>, StoreError> {
        Ok(self.lock()?.index.registrations.get(commitment).cloned())
    }

    fn record_round(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.index.check_round(record)?;
        let entry = LogEntry::Round(record.clone());
        append(&mut inner.file, &entry)?;
        inner.index.apply(entry)
    }

    fn rounds(&self, commitment: &Commitment) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .lock()?
            .index
            .rounds
            .get(commitment)
            .cloned()
            .unwrap_or_default())
    }

    fn record_reveal(&self, reveal: &RevealPackage) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.index.reveals.contains_key(&reveal.commitment) {
            return Err(StoreError::AlreadyRevealed(reveal.commitment));
        }
        let entry = LogEntry::Reveal(reveal.clone());
        append(&mut inner.file, &entry)?;
        inner.index.apply(entry)
    }

    fn reveal(&self, commitment: &Commitment) -> Result<Option<RevealPackage>, StoreError> {
        Ok(self.lock()?.index.reveals.get(commitment).cloned())
    }

    fn commitments(&self) -> Result<Vec<Commitment>, StoreError> {
        Ok(self.lock()?.index.order.clone())
    }
}
