//! Error types for simak.
//!
//! This module defines all error types used throughout the simak crate.
//! Authorization and validation variants double as the user-facing notices
//! printed by the CLI, so their display strings are written for operators.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for simak operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored payload could not be decoded.
    #[error("stored value under '{key}' is corrupt: {source}")]
    CorruptState {
        /// Storage key holding the payload.
        key: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored payload was written by a newer schema than this build knows.
    #[error("stored value under '{key}' has unsupported version {version}")]
    UnsupportedPayloadVersion {
        /// Storage key holding the payload.
        key: String,
        /// Version tag found in the payload.
        version: u32,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// A non-admin role attempted a gated action.
    #[error("Akses Terbatas: Hanya Admin ({action})")]
    AccessRestricted {
        /// The action that was refused.
        action: &'static str,
    },

    /// No role is active.
    #[error("belum login: gunakan `simak login viewer` atau `simak login admin`")]
    NotLoggedIn,

    /// The admin password did not match.
    #[error("Password Salah!")]
    CredentialMismatch,

    // === Record Errors ===
    /// A required record field is missing or blank.
    #[error("field '{field}' wajib diisi")]
    InvalidRecord {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A unit name was blank.
    #[error("nama satuan tidak boleh kosong")]
    InvalidUnit,

    /// A date string was not an ISO calendar date.
    #[error("tanggal tidak valid '{value}': gunakan format YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// No record has the given id.
    #[error("data dengan id {id} tidak ditemukan")]
    RecordNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// Only closed cases may be deleted.
    #[error("data {id} masih berstatus Proses Hukum dan tidak dapat dihapus")]
    CaseStillOpen {
        /// The id of the open case.
        id: String,
    },

    /// The editor named a unit missing from the unit list.
    #[error("satuan tidak terdaftar: {name}")]
    UnknownUnit {
        /// The rejected unit name.
        name: String,
    },

    /// The editor named a rank outside the rank vocabulary.
    #[error("pangkat tidak dikenal: {name}")]
    UnknownRank {
        /// The rejected rank.
        name: String,
    },

    /// A theme name outside the closed set.
    #[error("tema tidak dikenal: {name}")]
    UnknownTheme {
        /// The rejected name.
        name: String,
    },

    // === Assistant Errors ===
    /// The assistant provider failed.
    #[error("assistant provider '{provider}' failed: {message}")]
    Advisor {
        /// Name of the provider.
        provider: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for simak operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an access restriction for the named action.
    #[must_use]
    pub fn restricted(action: &'static str) -> Self {
        Self::AccessRestricted { action }
    }

    /// Create an assistant provider error.
    #[must_use]
    pub fn advisor(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Advisor {
            provider,
            message: message.into(),
        }
    }

    /// Check if this error is an authorization refusal.
    #[must_use]
    pub fn is_access_restricted(&self) -> bool {
        matches!(self, Self::AccessRestricted { .. } | Self::NotLoggedIn)
    }

    /// Check if this error came from decoding persisted state.
    #[must_use]
    pub fn is_corrupt_state(&self) -> bool {
        matches!(
            self,
            Self::CorruptState { .. } | Self::UnsupportedPayloadVersion { .. }
        )
    }
}
