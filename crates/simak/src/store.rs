//! The record store.
//!
//! [`RecordStore`] owns the canonical in-memory record and unit lists and
//! mirrors every mutation to [`Storage`]. Each mutation stages the next state,
//! persists it, and only then commits it to memory, so a failed write leaves
//! memory and storage in agreement.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::CorruptStatePolicy;
use crate::error::{Error, Result};
use crate::import::{BrowserExport, ImportSummary};
use crate::record::ViolationRecord;
use crate::storage::{codec, Scope, Storage, RECORDS_KEY, UNITS_KEY};
use crate::vocab::default_units;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was appended.
    Inserted,
    /// An existing record was replaced in place.
    Updated,
}

/// Canonical owner of records and units.
#[derive(Debug)]
pub struct RecordStore {
    storage: Storage,
    records: Vec<ViolationRecord>,
    units: Vec<String>,
}

impl RecordStore {
    /// Rehydrate the store from storage.
    ///
    /// Absent keys fall back to an empty record list and the default unit
    /// list. Corrupt payloads are handled according to `policy`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails, or if a payload is corrupt and the
    /// policy is [`CorruptStatePolicy::Fail`].
    pub fn open(storage: Storage, policy: CorruptStatePolicy) -> Result<Self> {
        let records: Vec<ViolationRecord> =
            Self::load_or(&storage, RECORDS_KEY, policy, Vec::new)?;
        let units: Vec<String> = Self::load_or(&storage, UNITS_KEY, policy, default_units)?;
        info!(
            "Loaded {} records and {} units",
            records.len(),
            units.len()
        );
        Ok(Self {
            storage,
            records,
            units,
        })
    }

    fn load_or<T: serde::de::DeserializeOwned>(
        storage: &Storage,
        key: &str,
        policy: CorruptStatePolicy,
        seed: impl FnOnce() -> Vec<T>,
    ) -> Result<Vec<T>> {
        match storage.load(Scope::Local, key) {
            Ok(Some(items)) => Ok(items),
            Ok(None) => Ok(seed()),
            Err(err) if err.is_corrupt_state() && policy == CorruptStatePolicy::Reset => {
                warn!("Discarding stored '{}': {}", key, err);
                Ok(seed())
            }
            Err(err) => Err(err),
        }
    }

    /// All records, in storage order.
    #[must_use]
    pub fn records(&self) -> &[ViolationRecord] {
        &self.records
    }

    /// The unit list.
    #[must_use]
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ViolationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records matching a free-text query. An empty query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&ViolationRecord> {
        let query = query.trim();
        self.records.iter().filter(|r| r.matches(query)).collect()
    }

    /// Allocate a fresh record id from the given clock reading.
    ///
    /// Ids are epoch milliseconds; a collision bumps the value until free.
    #[must_use]
    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut candidate = now.timestamp_millis();
        loop {
            let id = candidate.to_string();
            if self.get(&id).is_none() {
                return id;
            }
            candidate += 1;
        }
    }

    /// Insert a record, or replace the record with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is invalid or persisting fails.
    pub fn upsert(&mut self, mut record: ViolationRecord) -> Result<UpsertOutcome> {
        record.normalize();
        record.validate()?;

        let mut next = self.records.clone();
        let outcome = match next.iter().position(|r| r.id == record.id) {
            Some(index) => {
                next[index] = record;
                UpsertOutcome::Updated
            }
            None => {
                next.push(record);
                UpsertOutcome::Inserted
            }
        };

        self.storage.save(Scope::Local, RECORDS_KEY, &next)?;
        self.records = next;
        debug!("Upsert finished: {:?}", outcome);
        Ok(outcome)
    }

    /// Delete a closed record.
    ///
    /// Returns `false` if no record has the id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaseStillOpen`] if the record is still in process, or
    /// a storage error if persisting fails.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(record) = self.get(id) else {
            debug!("Delete of unknown record {} ignored", id);
            return Ok(false);
        };
        if !record.is_closed() {
            return Err(Error::CaseStillOpen { id: id.to_string() });
        }

        let next: Vec<ViolationRecord> =
            self.records.iter().filter(|r| r.id != id).cloned().collect();
        self.storage.save(Scope::Local, RECORDS_KEY, &next)?;
        self.records = next;
        info!("Deleted record {}", id);
        Ok(true)
    }

    /// Append a unit. Returns `false` if it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUnit`] for a blank name, or a storage error.
    pub fn add_unit(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidUnit);
        }
        if self.has_unit(name) {
            return Ok(false);
        }

        let mut next = self.units.clone();
        next.push(name.to_string());
        self.storage.save(Scope::Local, UNITS_KEY, &next)?;
        self.units = next;
        info!("Added unit {}", name);
        Ok(true)
    }

    /// Rename a unit and every record that references it.
    ///
    /// Returns the number of records rewritten, or `None` when nothing
    /// changed because `new` already exists or `old` is not a unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUnit`] for a blank new name, or a storage error.
    pub fn rename_unit(&mut self, old: &str, new: &str) -> Result<Option<usize>> {
        let new = new.trim();
        if new.is_empty() {
            return Err(Error::InvalidUnit);
        }
        if self.has_unit(new) || !self.has_unit(old) {
            return Ok(None);
        }

        let units: Vec<String> = self
            .units
            .iter()
            .map(|u| if u == old { new.to_string() } else { u.clone() })
            .collect();
        let mut rewritten = 0;
        let records: Vec<ViolationRecord> = self
            .records
            .iter()
            .map(|r| {
                let mut r = r.clone();
                if r.satuan == old {
                    r.satuan = new.to_string();
                    rewritten += 1;
                }
                r
            })
            .collect();

        self.storage.save_batch(
            Scope::Local,
            &[
                (UNITS_KEY, codec::encode(&units)?),
                (RECORDS_KEY, codec::encode(&records)?),
            ],
        )?;
        self.units = units;
        self.records = records;
        info!("Renamed unit {} to {} ({} records)", old, new, rewritten);
        Ok(Some(rewritten))
    }

    /// Remove a unit. Records keep their reference to it.
    ///
    /// Returns `false` if the unit was not in the list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails.
    pub fn remove_unit(&mut self, name: &str) -> Result<bool> {
        if !self.has_unit(name) {
            return Ok(false);
        }

        let next: Vec<String> = self.units.iter().filter(|u| *u != name).cloned().collect();
        self.storage.save(Scope::Local, UNITS_KEY, &next)?;
        self.units = next;

        let orphaned = self.records.iter().filter(|r| r.satuan == name).count();
        if orphaned > 0 {
            warn!(
                "Removed unit {} still referenced by {} records",
                name, orphaned
            );
        } else {
            info!("Removed unit {}", name);
        }
        Ok(true)
    }

    /// Merge an export into the register in one transaction.
    ///
    /// Units missing from the list are appended in export order. Records
    /// replace the record with the same id or are appended. Nothing is
    /// written unless every record is valid.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, or a storage error.
    pub fn import(&mut self, export: BrowserExport) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        let mut units = self.units.clone();
        for name in export.units {
            let name = name.trim();
            if !name.is_empty() && !units.iter().any(|u| u == name) {
                units.push(name.to_string());
                summary.units_added += 1;
            }
        }

        let mut records = self.records.clone();
        for mut record in export.records {
            record.normalize();
            record.validate()?;
            match records.iter().position(|r| r.id == record.id) {
                Some(index) => {
                    records[index] = record;
                    summary.updated += 1;
                }
                None => {
                    records.push(record);
                    summary.inserted += 1;
                }
            }
        }

        self.storage.save_batch(
            Scope::Local,
            &[
                (UNITS_KEY, codec::encode(&units)?),
                (RECORDS_KEY, codec::encode(&records)?),
            ],
        )?;
        self.units = units;
        self.records = records;
        info!(
            "Imported {} new and {} updated records, {} units",
            summary.inserted, summary.updated, summary.units_added
        );
        Ok(summary)
    }

    fn has_unit(&self, name: &str) -> bool {
        self.units.iter().any(|u| u == name)
    }
}
