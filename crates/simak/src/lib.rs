//! `simak` - Disciplinary case register for Brigif 4/DR
//!
//! This library provides the record store, dashboard statistics, role-gated
//! view routing and the AI legal assistant behind the `simak` command.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod preferences;
pub mod record;
pub mod report;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod view;
pub mod vocab;

pub use app::{App, Notice};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{CaseStatus, RecordPatch, ViolationRecord};
pub use session::Role;
pub use storage::{Storage, StorageStats};
