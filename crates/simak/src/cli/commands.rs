//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::error::Result;
use crate::record::{parse_date, CaseStatus, RecordPatch};
use crate::vocab::Vocabulary;

/// Login commands.
#[derive(Debug, Subcommand)]
pub enum LoginCommand {
    /// Log in with read-only access
    Viewer,

    /// Log in as admin
    Admin {
        /// Admin password (prompted when omitted)
        #[arg(short, long, env = "SIMAK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

/// Flag for JSON output.
#[derive(Debug, Args)]
pub struct JsonFlag {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Search by name, NRP, unit, category or action note
    pub query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Record id
    pub id: String,

    /// Print the case card
    #[arg(long, conflicts_with = "json")]
    pub card: bool,

    /// Write the case card to a file in this directory
    #[arg(long, value_name = "DIR", requires = "card")]
    pub save: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Record fields accepted by the editor.
#[derive(Debug, Default, Args)]
pub struct RecordFields {
    /// Unit
    #[arg(long)]
    pub satuan: Option<String>,

    /// Case category (see `simak vocab perkara`)
    #[arg(long)]
    pub perkara: Option<String>,

    /// Full name
    #[arg(long)]
    pub nama: Option<String>,

    /// Rank (see `simak vocab pangkat`)
    #[arg(long)]
    pub pangkat: Option<String>,

    /// Service number
    #[arg(long)]
    pub nrp: Option<String>,

    /// Position
    #[arg(long)]
    pub jabatan: Option<String>,

    /// Incident date (YYYY-MM-DD, defaults to today for new records)
    #[arg(long)]
    pub tanggal: Option<String>,

    /// Case status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Action note, kept only while the case is in process
    /// (see `simak vocab tindakan`)
    #[arg(long)]
    pub tindakan: Option<String>,

    /// Chronology
    #[arg(long)]
    pub kronologis: Option<String>,
}

impl RecordFields {
    /// Convert the flags into an editor patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is not a valid ISO date.
    pub fn into_patch(self) -> Result<RecordPatch> {
        Ok(RecordPatch {
            satuan: self.satuan,
            perkara: self.perkara,
            nama: self.nama,
            pangkat: self.pangkat,
            nrp: self.nrp,
            jabatan: self.jabatan,
            tanggal: self.tanggal.as_deref().map(parse_date).transpose()?,
            status: self.status.map(CaseStatus::from),
            ket_tindakan: self.tindakan,
            kronologis: self.kronologis,
        })
    }
}

/// Record commands.
#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// Add a new record
    Add(RecordFields),

    /// Edit fields of an existing record
    Edit {
        /// Record id
        id: String,

        #[command(flatten)]
        fields: RecordFields,
    },

    /// Mark a case as closed
    Close {
        /// Record id
        id: String,
    },

    /// Delete a closed case
    Delete {
        /// Record id
        id: String,
    },
}

/// Unit commands.
#[derive(Debug, Subcommand)]
pub enum UnitCommand {
    /// List units
    List,

    /// Add a unit
    Add {
        /// Unit name
        name: String,
    },

    /// Rename a unit and every record that references it
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Remove a unit (records keep their reference)
    Remove {
        /// Unit name
        name: String,
    },
}

/// Recap command arguments.
#[derive(Debug, Args)]
pub struct RecapCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write the recap to a file in this directory
    #[arg(long, value_name = "DIR")]
    pub save: Option<PathBuf>,
}

/// Ask command arguments.
#[derive(Debug, Args)]
pub struct AskCommand {
    /// The question
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Record export, or a `localStorage` dump of the browser edition
    pub file: PathBuf,

    /// Unit list export
    #[arg(long, value_name = "FILE")]
    pub units: Option<PathBuf>,
}

/// Vocabulary command arguments.
#[derive(Debug, Args)]
pub struct VocabCommand {
    /// List to show (all when omitted)
    #[arg(value_enum)]
    pub list: Option<VocabArg>,
}

/// Vocabulary list argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VocabArg {
    /// Case categories
    Perkara,
    /// Action notes
    Tindakan,
    /// Ranks
    Pangkat,
}

impl From<VocabArg> for Vocabulary {
    fn from(arg: VocabArg) -> Self {
        match arg {
            VocabArg::Perkara => Self::Categories,
            VocabArg::Tindakan => Self::Actions,
            VocabArg::Pangkat => Self::Ranks,
        }
    }
}

impl VocabCommand {
    /// The lists to print.
    #[must_use]
    pub fn lists(&self) -> Vec<Vocabulary> {
        match self.list {
            Some(arg) => vec![arg.into()],
            None => Vocabulary::ALL.to_vec(),
        }
    }
}

/// Theme commands.
#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Show the active theme
    Show,

    /// List available themes
    List,

    /// Select a theme
    Set {
        /// Theme name (jungle, midnight, maroon, stealth)
        name: String,
    },
}

/// Dashboard heading commands.
#[derive(Debug, Subcommand)]
pub enum HeadingCommand {
    /// Show the dashboard heading
    Show,

    /// Replace the dashboard heading
    Set {
        /// Title line
        #[arg(long)]
        title: String,

        /// Description paragraph
        #[arg(long)]
        description: String,
    },

    /// Restore the default heading
    Reset,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Case status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// In legal process
    Proses,
    /// Closed
    Selesai,
}

impl From<StatusArg> for CaseStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Proses => Self::ProsesHukum,
            StatusArg::Selesai => Self::Selesai,
        }
    }
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one record per line
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_status_arg_conversion() {
        assert_eq!(CaseStatus::from(StatusArg::Proses), CaseStatus::ProsesHukum);
        assert_eq!(CaseStatus::from(StatusArg::Selesai), CaseStatus::Selesai);
    }

    #[test]
    fn test_fields_into_patch() {
        let fields = RecordFields {
            nama: Some("Budi".to_string()),
            tanggal: Some("2024-03-14".to_string()),
            status: Some(StatusArg::Selesai),
            ..RecordFields::default()
        };
        let patch = fields.into_patch().unwrap();
        assert_eq!(patch.nama.as_deref(), Some("Budi"));
        assert_eq!(patch.tanggal, NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(patch.status, Some(CaseStatus::Selesai));
        assert_eq!(patch.satuan, None);
    }

    #[test]
    fn test_vocab_lists() {
        let all = VocabCommand { list: None };
        assert_eq!(all.lists(), Vocabulary::ALL);
        let one = VocabCommand {
            list: Some(VocabArg::Tindakan),
        };
        assert_eq!(one.lists(), [Vocabulary::Actions]);
    }

    #[test]
    fn test_fields_reject_bad_date() {
        let fields = RecordFields {
            tanggal: Some("14/03/2024".to_string()),
            ..RecordFields::default()
        };
        assert!(fields.into_patch().is_err());
    }
}
