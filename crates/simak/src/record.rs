//! Core record types for simak.
//!
//! This module defines the disciplinary case record and the partial updates
//! the editor applies to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Legal status of a case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    /// The case is in legal process.
    #[default]
    #[serde(rename = "Proses Hukum")]
    ProsesHukum,
    /// The case is closed.
    #[serde(rename = "Selesai")]
    Selesai,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProsesHukum => write!(f, "Proses Hukum"),
            Self::Selesai => write!(f, "Selesai"),
        }
    }
}

impl std::str::FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proses hukum" | "proses" | "proses-hukum" => Ok(Self::ProsesHukum),
            "selesai" => Ok(Self::Selesai),
            other => Err(format!("unknown case status: {other}")),
        }
    }
}

/// One disciplinary case.
///
/// Field names follow the register's stored JSON layout, so data written by
/// earlier versions of the register loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Opaque unique identifier, stable for the record's lifetime.
    pub id: String,
    /// Unit name. Soft reference into the unit list.
    pub satuan: String,
    /// Case category.
    pub perkara: String,
    /// Full name.
    pub nama: String,
    /// Rank.
    pub pangkat: String,
    /// Service number.
    pub nrp: String,
    /// Position.
    pub jabatan: String,
    /// Date of the incident.
    pub tanggal: NaiveDate,
    /// Legal status.
    pub status: CaseStatus,
    /// Action note. Only meaningful while the case is in process.
    #[serde(
        rename = "ketTindakan",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ket_tindakan: Option<String>,
    /// Chronology of the incident.
    pub kronologis: String,
}

impl ViolationRecord {
    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] naming the first blank field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("id", &self.id),
            ("satuan", &self.satuan),
            ("perkara", &self.perkara),
            ("nama", &self.nama),
            ("pangkat", &self.pangkat),
            ("nrp", &self.nrp),
            ("jabatan", &self.jabatan),
            ("kronologis", &self.kronologis),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidRecord { field });
            }
        }
        Ok(())
    }

    /// Enforce the action-note invariant.
    ///
    /// A closed case carries no action note, and a blank note is absent.
    pub fn normalize(&mut self) {
        if self.status == CaseStatus::Selesai {
            self.ket_tindakan = None;
        }
        if self
            .ket_tindakan
            .as_deref()
            .is_some_and(|note| note.trim().is_empty())
        {
            self.ket_tindakan = None;
        }
    }

    /// Whether the case is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == CaseStatus::Selesai
    }

    /// Check whether this record matches a free-text search.
    ///
    /// Name, unit, category and action note match case-insensitively; the
    /// service number matches as typed.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.nama.to_lowercase().contains(&needle)
            || self.nrp.contains(query)
            || self.satuan.to_lowercase().contains(&needle)
            || self.perkara.to_lowercase().contains(&needle)
            || self
                .ket_tindakan
                .as_deref()
                .is_some_and(|note| note.to_lowercase().contains(&needle))
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the input is not a valid date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}

/// A partial set of field values entered in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    /// Unit name.
    pub satuan: Option<String>,
    /// Case category.
    pub perkara: Option<String>,
    /// Full name.
    pub nama: Option<String>,
    /// Rank.
    pub pangkat: Option<String>,
    /// Service number.
    pub nrp: Option<String>,
    /// Position.
    pub jabatan: Option<String>,
    /// Date of the incident.
    pub tanggal: Option<NaiveDate>,
    /// Legal status.
    pub status: Option<CaseStatus>,
    /// Action note.
    pub ket_tindakan: Option<String>,
    /// Chronology.
    pub kronologis: Option<String>,
}

impl RecordPatch {
    /// Build a new record from this patch.
    ///
    /// Missing date and status default to today and `Proses Hukum`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if a required field is missing.
    pub fn into_record(self, id: String, today: NaiveDate) -> Result<ViolationRecord> {
        fn take(value: Option<String>, field: &'static str) -> Result<String> {
            value.ok_or(Error::InvalidRecord { field })
        }

        let mut record = ViolationRecord {
            id,
            satuan: take(self.satuan, "satuan")?,
            perkara: take(self.perkara, "perkara")?,
            nama: take(self.nama, "nama")?,
            pangkat: take(self.pangkat, "pangkat")?,
            nrp: take(self.nrp, "nrp")?,
            jabatan: take(self.jabatan, "jabatan")?,
            tanggal: self.tanggal.unwrap_or(today),
            status: self.status.unwrap_or_default(),
            ket_tindakan: self.ket_tindakan,
            kronologis: take(self.kronologis, "kronologis")?,
        };
        record.normalize();
        record.validate()?;
        Ok(record)
    }

    /// Apply the fields present in this patch to an existing record.
    pub fn apply(self, record: &mut ViolationRecord) {
        if let Some(v) = self.satuan {
            record.satuan = v;
        }
        if let Some(v) = self.perkara {
            record.perkara = v;
        }
        if let Some(v) = self.nama {
            record.nama = v;
        }
        if let Some(v) = self.pangkat {
            record.pangkat = v;
        }
        if let Some(v) = self.nrp {
            record.nrp = v;
        }
        if let Some(v) = self.jabatan {
            record.jabatan = v;
        }
        if let Some(v) = self.tanggal {
            record.tanggal = v;
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.ket_tindakan {
            record.ket_tindakan = Some(v);
        }
        if let Some(v) = self.kronologis {
            record.kronologis = v;
        }
        record.normalize();
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(id: &str, satuan: &str, status: CaseStatus) -> ViolationRecord {
        ViolationRecord {
            id: id.to_string(),
            satuan: satuan.to_string(),
            perkara: "Desersi".to_string(),
            nama: "Budi Santoso".to_string(),
            pangkat: "Pratu".to_string(),
            nrp: "31190123456".to_string(),
            jabatan: "Tamtama".to_string(),
            tanggal: NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date"),
            status,
            ket_tindakan: match status {
                CaseStatus::ProsesHukum => Some("Tahanan Satuan".to_string()),
                CaseStatus::Selesai => None,
            },
            kronologis: "Tidak hadir tanpa izin selama 30 hari.".to_string(),
        }
    }
}
