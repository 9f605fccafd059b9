//! Session and role control.
//!
//! The active role lives in the session scope of [`Storage`], so it survives
//! repeated invocations until logout or until the session goes idle.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::{Scope, Storage, ROLE_KEY};

/// A logged-in role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access.
    Viewer,
    /// Full mutation rights.
    Admin,
}

impl Role {
    /// Stored representation of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Admin => "admin",
        }
    }

    /// Label shown next to the operator's name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Viewer => "Pengunjung",
            Self::Admin => "Administrator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "viewer" => Ok(Self::Viewer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Tracks the active role and gates admin-only actions.
#[derive(Debug)]
pub struct SessionController {
    storage: Storage,
    admin_password: String,
    role: Option<Role>,
}

impl SessionController {
    /// Restore the session from storage.
    ///
    /// Session values idle for longer than `idle` are discarded first; `None`
    /// keeps them until logout. An unreadable stored role counts as logged
    /// out.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn open(
        storage: Storage,
        admin_password: impl Into<String>,
        idle: Option<Duration>,
    ) -> Result<Self> {
        if let Some(idle) = idle {
            storage.expire_session(idle)?;
        }

        let role = match storage.get_text(Scope::Session, ROLE_KEY)? {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(err) => {
                    warn!("Ignoring stored session role: {}", err);
                    None
                }
            },
            None => None,
        };
        debug!("Session restored with role {:?}", role);

        Ok(Self {
            storage,
            admin_password: admin_password.into(),
            role,
        })
    }

    /// The active role, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Whether the active role is admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Log in with read-only access. Replaces any active role.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be persisted.
    pub fn login_viewer(&mut self) -> Result<Role> {
        self.set_role(Role::Viewer)
    }

    /// Log in as admin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CredentialMismatch`] if the password differs from the
    /// configured one; the active role is left unchanged.
    pub fn login_admin(&mut self, password: &str) -> Result<Role> {
        if password != self.admin_password {
            warn!("Rejected admin login");
            return Err(Error::CredentialMismatch);
        }
        self.set_role(Role::Admin)
    }

    fn set_role(&mut self, role: Role) -> Result<Role> {
        self.storage
            .set_text(Scope::Session, ROLE_KEY, role.as_str())?;
        self.role = Some(role);
        info!("Logged in as {}", role);
        Ok(role)
    }

    /// End the session.
    ///
    /// Returns `true` if a role was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role cannot be removed.
    pub fn logout(&mut self) -> Result<bool> {
        self.storage.remove(Scope::Session, ROLE_KEY)?;
        let was_active = self.role.take().is_some();
        if was_active {
            info!("Logged out");
        }
        Ok(was_active)
    }

    /// Require any logged-in role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] when no role is active.
    pub fn require_login(&self) -> Result<Role> {
        self.role.ok_or(Error::NotLoggedIn)
    }

    /// Require the admin role for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] when no role is active and
    /// [`Error::AccessRestricted`] for viewers.
    pub fn require_admin(&self, action: &'static str) -> Result<()> {
        match self.require_login()? {
            Role::Admin => Ok(()),
            Role::Viewer => Err(Error::restricted(action)),
        }
    }
}
