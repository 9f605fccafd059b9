//! `simak` - CLI for the disciplinary case register
//!
//! This binary provides the command-line interface over the register: login,
//! dashboard, record management, reports and the AI legal assistant.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use simak::app::Dashboard;
use simak::assistant::Speaker;
use simak::cli::{
    Cli, Command, ConfigCommand, HeadingCommand, ImportCommand, ListCommand, LoginCommand,
    OutputFormat, RecapCommand, RecordCommand, ShowCommand, ThemeCommand, UnitCommand,
    VocabCommand,
};
use simak::import::{parse_export, parse_units};
use simak::preferences::Theme;
use simak::report::{card_file_name, recap_file_name, render_card, render_recap};
use simak::view::{EditorTarget, View};
use simak::{init_logging, App, Config, ViolationRecord};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => {
            let mut app = App::open(config).context("failed to open the register")?;
            run(&mut app, command).await
        }
    }
}

async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login(login_cmd) => handle_login(app, login_cmd),
        Command::Logout => {
            println!("{}", app.logout()?);
            Ok(())
        }
        Command::Whoami => {
            match app.role() {
                Some(role) => {
                    println!("{} ({})", role.label(), role);
                    let menu: Vec<&str> = View::menu(role).iter().map(View::label).collect();
                    println!("Menu: {}", menu.join(" | "));
                }
                None => println!("Belum login"),
            }
            Ok(())
        }
        Command::Status(flag) => handle_status(app, flag.json),
        Command::Dashboard(flag) => handle_dashboard(app, flag.json),
        Command::List(list_cmd) => handle_list(app, &list_cmd),
        Command::Show(show_cmd) => handle_show(app, &show_cmd),
        Command::Record(record_cmd) => handle_record(app, record_cmd).await,
        Command::Unit(unit_cmd) => handle_unit(app, unit_cmd),
        Command::Import(import_cmd) => handle_import(app, &import_cmd),
        Command::Vocab(vocab_cmd) => {
            handle_vocab(&vocab_cmd);
            Ok(())
        }
        Command::Recap(recap_cmd) => handle_recap(app, &recap_cmd),
        Command::Ask(ask_cmd) => {
            if let Some(reply) = app.ask(&ask_cmd.question.join(" ")).await? {
                println!("{reply}");
            }
            Ok(())
        }
        Command::Chat => handle_chat(app).await,
        Command::Theme(theme_cmd) => handle_theme(app, theme_cmd),
        Command::Heading(heading_cmd) => handle_heading(app, heading_cmd),
        Command::Config(config_cmd) => handle_config(app.config(), config_cmd),
    }
}

fn handle_login(app: &mut App, cmd: LoginCommand) -> Result<()> {
    let notice = match cmd {
        LoginCommand::Viewer => app.login_viewer()?,
        LoginCommand::Admin { password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?.unwrap_or_default(),
            };
            app.login_admin(&password)?
        }
    };
    println!("{notice}");
    Ok(())
}

/// Read one line from stdin after printing `label`. `None` at end of input.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn handle_status(app: &App, json: bool) -> Result<()> {
    let status = app.status()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("simak status");
    println!("------------");
    println!("Database:      {}", status.database_path.display());
    println!(
        "Role:          {}",
        status.role.map_or("Belum login", |r| r.label())
    );
    println!("Records:       {}", status.records);
    println!("Units:         {}", status.units);
    println!("Stored keys:   {}", status.storage.local_keys);
    println!("Session keys:  {}", status.storage.session_keys);
    if let Some(last) = status.storage.last_write {
        println!("Last write:    {}", last.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"));
    }
    println!("Size:          {} bytes", status.storage.db_size_bytes);
    Ok(())
}

fn handle_dashboard(app: &mut App, json: bool) -> Result<()> {
    let dashboard = app.dashboard()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print_dashboard(&dashboard);
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    let stats = &dashboard.stats;
    println!("{}", dashboard.heading.title);
    println!("{}", dashboard.heading.description);
    println!();
    println!("Total Kasus:   {}", stats.total);
    println!("Proses Hukum:  {}", stats.in_process);
    println!("Selesai:       {}", stats.closed);
    println!();

    println!("Per Satuan");
    let rows: Vec<Vec<String>> = stats
        .per_unit
        .iter()
        .map(|u| vec![u.short_name.clone(), u.unit.clone(), u.total.to_string()])
        .collect();
    print_table(&["Singkatan", "Satuan", "Kasus"], &rows);
    if stats.unlisted() > 0 {
        println!("({} kasus pada satuan yang sudah dihapus)", stats.unlisted());
    }

    if !stats.per_rank.is_empty() {
        println!();
        println!("Per Pangkat");
        let rows: Vec<Vec<String>> = stats
            .per_rank
            .iter()
            .map(|r| vec![r.rank.clone(), r.count.to_string()])
            .collect();
        print_table(&["Pangkat", "Kasus"], &rows);
    }

    if !stats.per_category.is_empty() {
        println!();
        println!("Per Perkara");
        let rows: Vec<Vec<String>> = stats
            .per_category
            .iter()
            .map(|c| vec![c.category.clone(), c.count.to_string()])
            .collect();
        print_table(&["Perkara", "Kasus"], &rows);
    }
}

fn handle_list(app: &mut App, cmd: &ListCommand) -> Result<()> {
    let records = app.search(cmd.query.as_deref().unwrap_or(""))?;
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Plain => {
            for r in &records {
                println!(
                    "{}  {} ({} / {})  {}  {}  {}",
                    r.id, r.nama, r.pangkat, r.nrp, r.satuan, r.perkara, r.status
                );
            }
        }
        OutputFormat::Table => {
            if records.is_empty() {
                println!("Tidak ada data.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = records.iter().copied().map(record_row).collect();
            print_table(
                &["ID", "Nama", "Pangkat", "NRP", "Satuan", "Perkara", "Status", "Tindakan"],
                &rows,
            );
        }
    }
    Ok(())
}

fn record_row(r: &ViolationRecord) -> Vec<String> {
    vec![
        r.id.clone(),
        r.nama.clone(),
        r.pangkat.clone(),
        r.nrp.clone(),
        r.satuan.clone(),
        r.perkara.clone(),
        r.status.to_string(),
        r.ket_tindakan.clone().unwrap_or_default(),
    ]
}

fn handle_show(app: &App, cmd: &ShowCommand) -> Result<()> {
    let record = app.record(&cmd.id)?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    if cmd.card {
        let card = render_card(record, Local::now().date_naive());
        match &cmd.save {
            Some(dir) => save_text(dir, &card_file_name(record), &card)?,
            None => print!("{card}"),
        }
        return Ok(());
    }

    println!("ID:          {}", record.id);
    println!("Nama:        {}", record.nama);
    println!("Pangkat/NRP: {} / {}", record.pangkat, record.nrp);
    println!("Jabatan:     {}", record.jabatan);
    println!("Satuan:      {}", record.satuan);
    println!("Perkara:     {}", record.perkara);
    println!("Tanggal:     {}", record.tanggal);
    println!("Status:      {}", record.status);
    if let Some(note) = &record.ket_tindakan {
        println!("Tindakan:    {note}");
    }
    println!();
    println!("{}", record.kronologis);
    Ok(())
}

async fn handle_record(app: &mut App, cmd: RecordCommand) -> Result<()> {
    match cmd {
        RecordCommand::Add(fields) => {
            let saved = app.save_record(EditorTarget::New, fields.into_patch()?).await?;
            println!("{} (id {})", simak::Notice::RecordSaved, saved.record.id);
        }
        RecordCommand::Edit { id, fields } => {
            app.save_record(EditorTarget::Existing(id), fields.into_patch()?)
                .await?;
            println!("{}", simak::Notice::RecordSaved);
        }
        RecordCommand::Close { id } => {
            app.close_record(&id).await?;
            println!("{}", simak::Notice::RecordSaved);
        }
        RecordCommand::Delete { id } => println!("{}", app.delete_record(&id)?),
    }
    Ok(())
}

fn handle_unit(app: &mut App, cmd: UnitCommand) -> Result<()> {
    match cmd {
        UnitCommand::List => {
            for (index, unit) in app.units()?.iter().enumerate() {
                println!("{:>2}. {unit}", index + 1);
            }
        }
        UnitCommand::Add { name } => println!("{}", app.add_unit(&name)?),
        UnitCommand::Rename { old, new } => println!("{}", app.rename_unit(&old, &new)?),
        UnitCommand::Remove { name } => println!("{}", app.remove_unit(&name)?),
    }
    Ok(())
}

fn handle_import(app: &mut App, cmd: &ImportCommand) -> Result<()> {
    let raw = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let mut export = parse_export(&raw)?;
    if let Some(path) = &cmd.units {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        export.units.extend(parse_units(&raw)?);
    }
    println!("{}", app.import(export)?);
    Ok(())
}

fn handle_vocab(cmd: &VocabCommand) {
    for (index, list) in cmd.lists().into_iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("{}", list.title());
        for entry in list.entries() {
            println!("  {entry}");
        }
    }
}

fn handle_recap(app: &App, cmd: &RecapCommand) -> Result<()> {
    let records = app.records()?;
    let now = Local::now();
    let text = match cmd.format {
        OutputFormat::Json => serde_json::to_string_pretty(records)? + "\n",
        OutputFormat::Plain | OutputFormat::Table => render_recap(records, now.naive_local()),
    };
    match &cmd.save {
        Some(dir) => save_text(dir, &recap_file_name(now.date_naive()), &text),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn save_text(dir: &Path, stem: &str, text: &str) -> Result<()> {
    let path = dir.join(format!("{stem}.txt"));
    std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Disimpan ke {}", path.display());
    Ok(())
}

async fn handle_chat(app: &mut App) -> Result<()> {
    app.navigate(View::Assistant)?;
    for message in app.transcript() {
        print_message(message.speaker, &message.text);
    }
    println!("(ketik 'keluar' untuk selesai)");

    while let Some(line) = prompt("> ")? {
        let question = line.trim();
        if question.eq_ignore_ascii_case("keluar") || question.eq_ignore_ascii_case("exit") {
            break;
        }
        if let Some(reply) = app.ask(question).await? {
            print_message(Speaker::Ai, &reply);
        }
    }
    Ok(())
}

fn print_message(speaker: Speaker, text: &str) {
    match speaker {
        Speaker::Ai => println!("AI: {text}"),
        Speaker::User => println!("Anda: {text}"),
    }
}

fn handle_theme(app: &App, cmd: ThemeCommand) -> Result<()> {
    match cmd {
        ThemeCommand::Show => {
            let theme = app.theme()?;
            let palette = theme.palette();
            println!("{} ({})", theme.display_name(), theme);
            println!("  Accent: {}", palette.accent);
            println!("  Light:  {}", palette.light);
            println!("  Dark:   {}", palette.dark);
        }
        ThemeCommand::List => {
            let active = app.theme()?;
            for theme in Theme::ALL {
                let marker = if theme == active { "*" } else { " " };
                println!("{marker} {:<9} {}", theme.key(), theme.display_name());
            }
        }
        ThemeCommand::Set { name } => {
            let theme: Theme = name.parse()?;
            println!("{}", app.set_theme(theme)?);
        }
    }
    Ok(())
}

fn handle_heading(app: &App, cmd: HeadingCommand) -> Result<()> {
    match cmd {
        HeadingCommand::Show => {
            let heading = app.heading()?;
            println!("{}", heading.title);
            println!("{}", heading.description);
        }
        HeadingCommand::Set { title, description } => {
            println!("{}", app.set_heading(&title, &description)?);
        }
        HeadingCommand::Reset => println!("{}", app.reset_heading()?),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  On corrupt state:   {:?}", config.storage.on_corrupt);
                println!(
                    "  Session idle (min): {}",
                    config.storage.session_idle_minutes
                );
                println!();
                println!("[Assistant]");
                println!("  Endpoint:           {}", config.assistant.endpoint);
                println!("  Model:              {}", config.assistant.model);
                println!(
                    "  API key:            {}",
                    if config.assistant_api_key().is_some() {
                        "set"
                    } else {
                        "not set"
                    }
                );
                println!("  Timeout (s):        {}", config.assistant.timeout_secs);
                println!();
                println!("[Simulation]");
                println!(
                    "  Save latency (ms):  {}",
                    config.simulation.save_latency_ms
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.to_vec());
    line(separator.iter().map(String::as_str).collect());
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
}
