//! Long-lived display preferences: theme and dashboard heading.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::storage::{Scope, Storage, HERO_DESC_KEY, HERO_TITLE_KEY, THEME_KEY};

/// Default dashboard title.
pub const DEFAULT_TITLE: &str = "Brigade Infanteri 4 / Dewa Ratna";

/// Default dashboard description.
pub const DEFAULT_DESCRIPTION: &str = "Sistem Informasi Manajemen Hukum (SIMAK) dirancang untuk \
pemantauan real-time, pendataan akurat, dan analisis tren pelanggaran guna mendukung pembinaan \
personel yang unggul dan disiplin.";

/// Colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Army green.
    #[default]
    Jungle,
    /// Navy blue.
    Midnight,
    /// Dark red.
    Maroon,
    /// Neutral grey.
    Stealth,
}

/// Colours of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Header background gradient.
    pub gradient: &'static str,
    /// Accent colour.
    pub accent: &'static str,
    /// Light tint of the accent.
    pub light: &'static str,
    /// Dark shade of the accent.
    pub dark: &'static str,
}

impl Theme {
    /// Every theme, in menu order.
    pub const ALL: [Theme; 4] = [Self::Jungle, Self::Midnight, Self::Maroon, Self::Stealth];

    /// Stored key of the theme.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Jungle => "jungle",
            Self::Midnight => "midnight",
            Self::Maroon => "maroon",
            Self::Stealth => "stealth",
        }
    }

    /// Display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Jungle => "Jungle (Army)",
            Self::Midnight => "Midnight (Navy)",
            Self::Maroon => "Maroon (Elite)",
            Self::Stealth => "Stealth (Modern)",
        }
    }

    /// Colour palette.
    #[must_use]
    pub fn palette(self) -> Palette {
        match self {
            Self::Jungle => Palette {
                gradient: "linear-gradient(135deg, #2d3a2a 0%, #1a2418 100%)",
                accent: "#22c55e",
                light: "#dcfce7",
                dark: "#166534",
            },
            Self::Midnight => Palette {
                gradient: "linear-gradient(135deg, #1e293b 0%, #0f172a 100%)",
                accent: "#3b82f6",
                light: "#dbeafe",
                dark: "#1e40af",
            },
            Self::Maroon => Palette {
                gradient: "linear-gradient(135deg, #450a0a 0%, #180404 100%)",
                accent: "#ef4444",
                light: "#fee2e2",
                dark: "#991b1b",
            },
            Self::Stealth => Palette {
                gradient: "linear-gradient(135deg, #27272a 0%, #09090b 100%)",
                accent: "#71717a",
                light: "#f4f4f5",
                dark: "#18181b",
            },
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|theme| theme.key() == name)
            .ok_or(Error::UnknownTheme {
                name: s.to_string(),
            })
    }
}

/// Dashboard heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Title line.
    pub title: String,
    /// Description paragraph.
    pub description: String,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// Reads and writes display preferences.
///
/// Role checks happen in the application facade; this type only persists.
#[derive(Debug, Clone)]
pub struct Preferences {
    storage: Storage,
}

impl Preferences {
    /// Create a preferences handle over `storage`.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The selected theme. Unknown stored names fall back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn theme(&self) -> Result<Theme> {
        let Some(raw) = self.storage.get_text(Scope::Local, THEME_KEY)? else {
            return Ok(Theme::default());
        };
        Ok(raw.parse().unwrap_or_else(|err| {
            warn!("Ignoring stored theme: {}", err);
            Theme::default()
        }))
    }

    /// Select a theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.storage.set_text(Scope::Local, THEME_KEY, theme.key())?;
        info!("Theme set to {}", theme);
        Ok(())
    }

    /// The dashboard heading. Missing or blank parts use the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn heading(&self) -> Result<Heading> {
        let defaults = Heading::default();
        let read = |key: &str, fallback: String| -> Result<String> {
            Ok(self
                .storage
                .get_text(Scope::Local, key)?
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(fallback))
        };
        Ok(Heading {
            title: read(HERO_TITLE_KEY, defaults.title)?,
            description: read(HERO_DESC_KEY, defaults.description)?,
        })
    }

    /// Replace the dashboard heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn set_heading(&self, title: &str, description: &str) -> Result<Heading> {
        self.storage.save_batch(
            Scope::Local,
            &[
                (HERO_TITLE_KEY, title.to_string()),
                (HERO_DESC_KEY, description.to_string()),
            ],
        )?;
        info!("Dashboard heading updated");
        self.heading()
    }

    /// Restore the default heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn reset_heading(&self) -> Result<Heading> {
        self.storage.remove(Scope::Local, HERO_TITLE_KEY)?;
        self.storage.remove(Scope::Local, HERO_DESC_KEY)?;
        Ok(Heading::default())
    }
}
