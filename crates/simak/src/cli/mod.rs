//! Command-line interface for simak.
//!
//! This module provides the CLI structure for the `simak` binary. Command
//! handlers live in the binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AskCommand, ConfigCommand, HeadingCommand, ImportCommand, JsonFlag, ListCommand,
    LoginCommand, OutputFormat, RecapCommand, RecordCommand, RecordFields, ShowCommand,
    StatusArg, ThemeCommand, UnitCommand, VocabArg, VocabCommand,
};

/// simak - Disciplinary case register for Brigif 4/DR
///
/// Records military disciplinary cases, reports dashboard figures, and
/// answers legal questions through an AI assistant.
#[derive(Debug, Parser)]
#[command(name = "simak")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a session
    #[command(subcommand)]
    Login(LoginCommand),

    /// End the session
    Logout,

    /// Show the active role
    Whoami,

    /// Show register and database status
    Status(JsonFlag),

    /// Show dashboard figures
    Dashboard(JsonFlag),

    /// List or search records
    List(ListCommand),

    /// Show one record
    Show(ShowCommand),

    /// Add, edit, close or delete records (admin)
    #[command(subcommand)]
    Record(RecordCommand),

    /// Manage units
    #[command(subcommand)]
    Unit(UnitCommand),

    /// Import data exported from the browser edition (admin)
    Import(ImportCommand),

    /// List suggested categories, action notes and ranks
    Vocab(VocabCommand),

    /// Print the recap of all records
    Recap(RecapCommand),

    /// Ask the AI legal assistant one question
    Ask(AskCommand),

    /// Chat with the AI legal assistant
    Chat,

    /// View or select the colour theme
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// View or change the dashboard heading
    #[command(subcommand)]
    Heading(HeadingCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Whoami,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "simak");
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login_admin() {
        let cli = Cli::try_parse_from(["simak", "login", "admin", "-p", "rahasia"]).unwrap();
        match cli.command {
            Command::Login(LoginCommand::Admin { password }) => {
                assert_eq!(password.as_deref(), Some("rahasia"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_with_query() {
        let cli = Cli::try_parse_from(["simak", "list", "budi", "-f", "json"]).unwrap();
        match cli.command {
            Command::List(list) => {
                assert_eq!(list.query.as_deref(), Some("budi"));
                assert_eq!(list.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_record_add() {
        let cli = Cli::try_parse_from([
            "simak",
            "record",
            "add",
            "--nama",
            "Budi Santoso",
            "--satuan",
            "Yonif 405/SK",
            "--status",
            "proses",
        ])
        .unwrap();
        match cli.command {
            Command::Record(RecordCommand::Add(fields)) => {
                assert_eq!(fields.nama.as_deref(), Some("Budi Santoso"));
                assert_eq!(fields.status, Some(StatusArg::Proses));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_record_edit() {
        let cli =
            Cli::try_parse_from(["simak", "record", "edit", "171", "--tindakan", "Sidang"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Command::Record(RecordCommand::Edit { ref id, .. }) if id == "171"
        ));
    }

    #[test]
    fn test_parse_unit_rename() {
        let cli = Cli::try_parse_from(["simak", "unit", "rename", "A", "B"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Unit(UnitCommand::Rename { .. })
        ));
    }

    #[test]
    fn test_parse_import_with_units() {
        let cli =
            Cli::try_parse_from(["simak", "import", "data.json", "--units", "units.json"])
                .unwrap();
        match cli.command {
            Command::Import(import) => {
                assert_eq!(import.file, PathBuf::from("data.json"));
                assert_eq!(import.units, Some(PathBuf::from("units.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_vocab() {
        let cli = Cli::try_parse_from(["simak", "vocab", "perkara"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Vocab(VocabCommand {
                list: Some(VocabArg::Perkara)
            })
        ));
        assert!(Cli::try_parse_from(["simak", "vocab", "satuan"]).is_err());
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["simak", "ask", "apa", "itu", "desersi"]).unwrap();
        match cli.command {
            Command::Ask(ask) => assert_eq!(ask.question.join(" "), "apa itu desersi"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ask_requires_question() {
        assert!(Cli::try_parse_from(["simak", "ask"]).is_err());
    }

    #[test]
    fn test_parse_show_save_requires_card() {
        assert!(Cli::try_parse_from(["simak", "show", "1", "--save", "."]).is_err());
        assert!(Cli::try_parse_from(["simak", "show", "1", "--card", "--save", "."]).is_ok());
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["simak", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["simak", "-v", "whoami"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let cli = Cli::try_parse_from(["simak", "-q", "whoami"]).unwrap();
        assert!(cli.quiet);
    }
}
