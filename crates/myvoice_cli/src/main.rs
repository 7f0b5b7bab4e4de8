//! Command-line driver for the MyVoice core.
//!
//! # Responsibility
//! - Exercise deck and drawing persistence against a SQLite file.
//! - Keep output line-oriented and deterministic for scripted checks.

use clap::{Args, Parser, Subcommand};
use myvoice_core::db::open_db;
use myvoice_core::{
    init_logging_from_config, Card, CardDeckStore, CoreConfig, DrawingStore,
    SqliteKeyValueStore, SqliteSlotStore,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "myvoice", version, about = "MyVoice board state tool")]
struct Cli {
    /// SQLite file holding the deck and drawing slots.
    #[arg(long, default_value = "myvoice.sqlite3")]
    db: PathBuf,
    /// Optional TOML config overriding keys, timings and logging.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core version and health check.
    Version,
    #[command(subcommand)]
    Deck(DeckCommand),
    #[command(subcommand)]
    Drawing(DrawingCommand),
}

#[derive(Debug, Subcommand)]
enum DeckCommand {
    List,
    Add(AddCard),
    Remove { id: String },
    /// Move ACTIVE into the slot currently held by OVER.
    Move { active: String, over: String },
    Reset,
}

#[derive(Debug, Args)]
struct AddCard {
    #[arg(long)]
    label: String,
    #[arg(long, default_value = "Smile")]
    icon: String,
    #[arg(long, default_value = "bg-slate-100 text-slate-800 border-slate-200")]
    color: String,
    /// Explicit id; generated when omitted.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Debug, Subcommand)]
enum DrawingCommand {
    Show,
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config.logging)?;

    match cli.command {
        Command::Version => {
            println!("myvoice_core ping={}", myvoice_core::ping());
            println!("myvoice_core version={}", myvoice_core::core_version());
            Ok(())
        }
        Command::Deck(command) => run_deck(&cli.db, &config, command),
        Command::Drawing(command) => run_drawing(&cli.db, &config, command),
    }
}

fn run_deck(db: &Path, config: &CoreConfig, command: DeckCommand) -> Result<(), Box<dyn Error>> {
    let conn = open_db(db)?;
    let mut store = CardDeckStore::from_config(SqliteSlotStore::new(&conn), config);

    match command {
        DeckCommand::List => {}
        DeckCommand::Add(args) => {
            let card = match args.id {
                Some(id) => Card::with_id(id, args.label, args.icon, args.color),
                None => Card::new(args.label, args.icon, args.color),
            };
            store.add(card)?;
        }
        DeckCommand::Remove { id } => {
            store.remove(&id);
        }
        DeckCommand::Move { active, over } => {
            store.reorder(&active, &over);
        }
        DeckCommand::Reset => {
            store.reset();
        }
    }

    for (index, card) in store.cards().iter().enumerate() {
        println!("{index}\t{}\t{}\t{}", card.id, card.label, card.icon_name);
    }
    Ok(())
}

fn run_drawing(
    db: &Path,
    config: &CoreConfig,
    command: DrawingCommand,
) -> Result<(), Box<dyn Error>> {
    let store = DrawingStore::from_config(SqliteKeyValueStore::new(open_db(db)?), config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    runtime.block_on(async {
        match command {
            DrawingCommand::Show => match store.get_saved_drawing().await {
                Some(drawing) => {
                    let points: usize = drawing.paths().iter().map(|path| path.paths.len()).sum();
                    println!("paths={} points={points}", drawing.len());
                }
                None => println!("no saved drawing"),
            },
            DrawingCommand::Clear => {
                store.save_drawing(&[]).await;
                println!("cleared");
            }
        }
    });
    Ok(())
}
