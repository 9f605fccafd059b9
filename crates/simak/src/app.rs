//! Application facade.
//!
//! [`App`] owns every component and is the only entry point the CLI uses.
//! Role checks for mutations live here, so the record store itself stays
//! unaware of sessions.

use std::path::PathBuf;

use chrono::{Local, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::assistant::{Advisor, Assistant, ChatMessage, GeminiAdvisor};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::import::{BrowserExport, ImportSummary};
use crate::preferences::{Heading, Preferences, Theme};
use crate::record::{CaseStatus, RecordPatch, ViolationRecord};
use crate::session::{Role, SessionController};
use crate::stats::DashboardStats;
use crate::storage::{Storage, StorageStats};
use crate::store::{RecordStore, UpsertOutcome};
use crate::view::{EditorTarget, View, ViewRouter};
use crate::vocab::RANKS;

/// Short confirmation shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A role was activated.
    LoggedIn(Role),
    /// The session ended.
    LoggedOut,
    /// A record was saved.
    RecordSaved,
    /// A record was deleted.
    RecordDeleted,
    /// A unit was added.
    UnitAdded(String),
    /// A unit was renamed.
    UnitUpdated,
    /// A unit was removed.
    UnitRemoved,
    /// A theme was selected.
    ThemeActive(Theme),
    /// The dashboard heading changed.
    HeadingSaved,
    /// A browser export was merged.
    Imported(ImportSummary),
    /// Nothing had to change.
    Unchanged,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoggedIn(Role::Admin) => write!(f, "Login Berhasil sebagai Admin"),
            Self::LoggedIn(Role::Viewer) => write!(f, "Login Berhasil sebagai Pengunjung"),
            Self::LoggedOut => write!(f, "Logout Berhasil"),
            Self::RecordSaved => write!(f, "Data Berhasil Disimpan"),
            Self::RecordDeleted => write!(f, "Data Berhasil Dihapus"),
            Self::UnitAdded(name) => write!(f, "Satuan {name} ditambahkan"),
            Self::UnitUpdated => write!(f, "Satuan diperbarui"),
            Self::UnitRemoved => write!(f, "Satuan dihapus"),
            Self::ThemeActive(theme) => write!(f, "Tema {} Aktif", theme.display_name()),
            Self::HeadingSaved => write!(f, "Judul Dashboard Diperbarui"),
            Self::Imported(summary) => write!(
                f,
                "Impor selesai: {} data baru, {} diperbarui, {} satuan ditambahkan",
                summary.inserted, summary.updated, summary.units_added
            ),
            Self::Unchanged => write!(f, "Tidak ada perubahan"),
        }
    }
}

/// Result of saving a record from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRecord {
    /// The record as stored.
    pub record: ViolationRecord,
    /// Whether it was new.
    pub outcome: UpsertOutcome,
}

/// Everything the dashboard surface shows.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Active role.
    pub role: Role,
    /// Selected theme.
    pub theme: Theme,
    /// Heading shown above the figures.
    pub heading: Heading,
    /// Derived figures.
    pub stats: DashboardStats,
}

/// Overview of the register and its database.
#[derive(Debug, Clone, Serialize)]
pub struct AppStatus {
    /// Database file.
    pub database_path: PathBuf,
    /// Active role, if any.
    pub role: Option<Role>,
    /// Number of records.
    pub records: usize,
    /// Number of units.
    pub units: usize,
    /// Storage statistics.
    pub storage: StorageStats,
}

/// The register.
#[derive(Debug)]
pub struct App {
    config: Config,
    storage: Storage,
    store: RecordStore,
    session: SessionController,
    router: ViewRouter,
    preferences: Preferences,
    assistant: Assistant,
}

impl App {
    /// Open the register described by `config`, with the Gemini advisor.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened, stored state is
    /// unreadable, or the HTTP client cannot be built.
    pub fn open(config: Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        let advisor = GeminiAdvisor::new(
            &config.assistant,
            config.assistant_api_key(),
            config.assistant_timeout(),
        )?;
        Self::with_parts(config, storage, Box::new(advisor))
    }

    /// Assemble the register from an opened storage and an advisor.
    ///
    /// # Errors
    ///
    /// Returns an error if stored state is unreadable.
    pub fn with_parts(config: Config, storage: Storage, advisor: Box<dyn Advisor>) -> Result<Self> {
        let store = RecordStore::open(storage.clone(), config.storage.on_corrupt)?;
        let session = SessionController::open(
            storage.clone(),
            config.auth.admin_password.clone(),
            config.session_idle(),
        )?;
        let preferences = Preferences::new(storage.clone());

        Ok(Self {
            config,
            storage,
            store,
            session,
            router: ViewRouter::new(),
            preferences,
            assistant: Assistant::new(advisor),
        })
    }

    /// Active role, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    /// Active surface.
    #[must_use]
    pub fn view(&self) -> &View {
        self.router.current()
    }

    /// Configuration the register was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    // === Session ===

    /// Log in with read-only access.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be persisted.
    pub fn login_viewer(&mut self) -> Result<Notice> {
        let role = self.session.login_viewer()?;
        self.router.reset();
        Ok(Notice::LoggedIn(role))
    }

    /// Log in as admin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CredentialMismatch`] for a wrong password.
    pub fn login_admin(&mut self, password: &str) -> Result<Notice> {
        let role = self.session.login_admin(password)?;
        self.router.reset();
        Ok(Notice::LoggedIn(role))
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role cannot be removed.
    pub fn logout(&mut self) -> Result<Notice> {
        let was_active = self.session.logout()?;
        self.router.reset();
        Ok(if was_active {
            Notice::LoggedOut
        } else {
            Notice::Unchanged
        })
    }

    /// Switch to another surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the active role may not open `view`.
    pub fn navigate(&mut self, view: View) -> Result<&View> {
        self.router.navigate(view, self.session.role())
    }

    // === Reads ===

    /// The dashboard surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role, or a storage error.
    pub fn dashboard(&mut self) -> Result<Dashboard> {
        self.navigate(View::Dashboard)?;
        let role = self.session.require_login()?;
        Ok(Dashboard {
            role,
            theme: self.preferences.theme()?,
            heading: self.preferences.heading()?,
            stats: DashboardStats::compute(self.store.records(), self.store.units(), RANKS),
        })
    }

    /// Records matching `query`; an empty query lists everything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role.
    pub fn search(&mut self, query: &str) -> Result<Vec<&ViolationRecord>> {
        self.navigate(View::RecordList)?;
        Ok(self.store.search(query))
    }

    /// One record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role and
    /// [`Error::RecordNotFound`] for an unknown id.
    pub fn record(&self, id: &str) -> Result<&ViolationRecord> {
        self.session.require_login()?;
        self.store.get(id).ok_or_else(|| Error::RecordNotFound { id: id.to_string() })
    }

    /// All records, in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role.
    pub fn records(&self) -> Result<&[ViolationRecord]> {
        self.session.require_login()?;
        Ok(self.store.records())
    }

    /// The unit list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role.
    pub fn units(&self) -> Result<&[String]> {
        self.session.require_login()?;
        Ok(self.store.units())
    }

    // === Record mutations ===

    /// Open the editor on `target`, stage `patch`, and save.
    ///
    /// New records get a fresh id, today's date and `Proses Hukum` unless
    /// the patch says otherwise. On success the record list becomes the
    /// active surface; on failure the editor stays open with the draft.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, a validation error for
    /// incomplete records, [`Error::RecordNotFound`] for an unknown id, or a
    /// storage error.
    pub async fn save_record(
        &mut self,
        target: EditorTarget,
        patch: RecordPatch,
    ) -> Result<SavedRecord> {
        self.session.require_admin("simpan data")?;
        self.navigate(View::Editor(target.clone()))?;
        self.router.stage(patch)?;
        let draft = self
            .router
            .draft()
            .cloned()
            .ok_or_else(|| Error::internal("editor draft missing"))?;

        let (mut record, previous) = match &target {
            EditorTarget::New => (
                draft.into_record(self.store.next_id(Utc::now()), Local::now().date_naive())?,
                None,
            ),
            EditorTarget::Existing(id) => {
                let previous = self
                    .store
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::RecordNotFound { id: id.clone() })?;
                let mut record = previous.clone();
                draft.apply(&mut record);
                (record, Some(previous))
            }
        };
        record.normalize();
        record.validate()?;
        self.check_vocabulary(&record, previous.as_ref())?;

        let latency = self.config.save_latency();
        if !latency.is_zero() {
            debug!("Delaying save by {:?}", latency);
            tokio::time::sleep(latency).await;
        }

        let outcome = self.store.upsert(record.clone())?;
        self.navigate(View::RecordList)?;
        info!("Saved record {} ({:?})", record.id, outcome);
        Ok(SavedRecord { record, outcome })
    }

    /// Unit and rank must come from their lists. An edit that keeps a stale
    /// value unchanged is allowed so older records stay editable.
    fn check_vocabulary(
        &self,
        record: &ViolationRecord,
        previous: Option<&ViolationRecord>,
    ) -> Result<()> {
        let unit_changed = !previous.is_some_and(|p| p.satuan == record.satuan);
        if unit_changed && !self.store.units().iter().any(|u| *u == record.satuan) {
            return Err(Error::UnknownUnit {
                name: record.satuan.clone(),
            });
        }

        let rank_changed = !previous.is_some_and(|p| p.pangkat == record.pangkat);
        if rank_changed && !RANKS.contains(&record.pangkat.as_str()) {
            return Err(Error::UnknownRank {
                name: record.pangkat.clone(),
            });
        }
        Ok(())
    }

    /// Mark a case as closed. Clears its action note.
    ///
    /// # Errors
    ///
    /// Same as [`App::save_record`].
    pub async fn close_record(&mut self, id: &str) -> Result<SavedRecord> {
        let patch = RecordPatch {
            status: Some(CaseStatus::Selesai),
            ..RecordPatch::default()
        };
        self.save_record(EditorTarget::Existing(id.to_string()), patch)
            .await
    }

    /// Delete a closed case.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, [`Error::CaseStillOpen`]
    /// for open cases, or a storage error.
    pub fn delete_record(&mut self, id: &str) -> Result<Notice> {
        self.session.require_admin("hapus data")?;
        Ok(if self.store.delete(id)? {
            Notice::RecordDeleted
        } else {
            Notice::Unchanged
        })
    }

    /// Merge data exported from the browser edition.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, a validation error if
    /// any imported record is incomplete, or a storage error.
    pub fn import(&mut self, export: BrowserExport) -> Result<Notice> {
        self.session.require_admin("impor data")?;
        Ok(Notice::Imported(self.store.import(export)?))
    }

    // === Units ===

    /// Add a unit.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, [`Error::InvalidUnit`]
    /// for a blank name, or a storage error.
    pub fn add_unit(&mut self, name: &str) -> Result<Notice> {
        self.session.require_admin("tambah satuan")?;
        Ok(if self.store.add_unit(name)? {
            Notice::UnitAdded(name.trim().to_string())
        } else {
            Notice::Unchanged
        })
    }

    /// Rename a unit and the records that reference it.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, [`Error::InvalidUnit`]
    /// for a blank name, or a storage error.
    pub fn rename_unit(&mut self, old: &str, new: &str) -> Result<Notice> {
        self.session.require_admin("ubah satuan")?;
        Ok(match self.store.rename_unit(old, new)? {
            Some(_) => Notice::UnitUpdated,
            None => Notice::Unchanged,
        })
    }

    /// Remove a unit. Records keep their reference.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, or a storage error.
    pub fn remove_unit(&mut self, name: &str) -> Result<Notice> {
        self.session.require_admin("hapus satuan")?;
        Ok(if self.store.remove_unit(name)? {
            Notice::UnitRemoved
        } else {
            Notice::Unchanged
        })
    }

    // === Preferences ===

    /// The selected theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn theme(&self) -> Result<Theme> {
        self.preferences.theme()
    }

    /// Select a theme. Available to every logged-in role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role, or a storage error.
    pub fn set_theme(&self, theme: Theme) -> Result<Notice> {
        self.session.require_login()?;
        self.preferences.set_theme(theme)?;
        Ok(Notice::ThemeActive(theme))
    }

    /// The dashboard heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn heading(&self) -> Result<Heading> {
        self.preferences.heading()
    }

    /// Replace the dashboard heading.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, or a storage error.
    pub fn set_heading(&self, title: &str, description: &str) -> Result<Notice> {
        self.session.require_admin("ubah judul")?;
        self.preferences.set_heading(title, description)?;
        Ok(Notice::HeadingSaved)
    }

    /// Restore the default dashboard heading.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, or a storage error.
    pub fn reset_heading(&self) -> Result<Notice> {
        self.session.require_admin("ubah judul")?;
        self.preferences.reset_heading()?;
        Ok(Notice::HeadingSaved)
    }

    // === Assistant ===

    /// Ask the assistant about the current records.
    ///
    /// Returns `None` for a blank question or while a reply is pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role. Provider failures are
    /// reported as fallback replies, never as errors.
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.navigate(View::Assistant)?;
        Ok(self.assistant.ask(question, self.store.records()).await)
    }

    /// The assistant transcript.
    #[must_use]
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.assistant.transcript()
    }

    // === Status ===

    /// Overview of the register and its database.
    ///
    /// # Errors
    ///
    /// Returns an error if storage statistics cannot be read.
    pub fn status(&self) -> Result<AppStatus> {
        Ok(AppStatus {
            database_path: self.storage.path().to_path_buf(),
            role: self.session.role(),
            records: self.store.records().len(),
            units: self.store.units().len(),
            storage: self.storage.stats()?,
        })
    }
}
