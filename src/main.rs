/*!
# Serenity - An AI-Powered Mood Journal

This file contains the main application flow: it parses arguments, loads
configuration, sets up logging and dispatches to the selected subcommand.

## Usage

```text
serenity [OPTIONS] <COMMAND>

Commands:
  serve     Run the mood analysis service
  sign-in   Start a session for an email address
  sign-out  End the current session
  write     Analyse and save a journal entry (reads stdin when TEXT is omitted)
  history   Show recent entries and the average mood

Options:
  -v, --verbose                  Print verbose output
      --log-format <LOG_FORMAT>  Log output format [possible values: text, json]
```

## Configuration

See [`serenity::config`] for the environment variables read at startup.
*/

use clap::Parser;
use serenity::cli::output::{render_analysis, render_history};
use serenity::cli::{CliArgs, Command};
use serenity::client::AnalysisClient;
use serenity::config::{ensure_data_dir, Config};
use serenity::db::Database;
use serenity::errors::{AppError, AppResult};
use serenity::history::load_history;
use serenity::journal::{clear_draft, load_draft, save_draft, submit_entry, JournalEntryInput};
use serenity::logging::init_tracing;
use serenity::session::{AuthEvent, SessionStore};
use serenity::service;
use std::io::{self, IsTerminal, Read};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let log_format = args
        .log_format
        .clone()
        .unwrap_or_else(|| config.log_format.clone());
    if let Err(e) = init_tracing(&log_format, args.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let correlation_id = Uuid::new_v4();
    let span = tracing::info_span!("serenity", correlation_id = %correlation_id);

    if let Err(e) = run(args.command, config).instrument(span).await {
        // Errors are logged once here, at the application boundary.
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, mut config: Config) -> AppResult<()> {
    if let Command::Serve { bind: Some(bind) } = &command {
        config.bind_addr = bind.clone();
    }
    config.validate()?;
    debug!("Configuration: {:?}", config);

    match command {
        Command::Serve { .. } => service::serve(&config).await,
        Command::SignIn { email } => sign_in(&config, &email),
        Command::SignOut => sign_out(&config),
        Command::Write { text, draft } => write_entry(&config, text, draft).await,
        Command::History { limit } => show_history(&config, limit.unwrap_or(config.history_limit)),
    }
}

fn open_database(config: &Config) -> AppResult<Database> {
    ensure_data_dir(&config.data_dir)?;
    let db = Database::open(&config.db_path())?;
    db.initialize_schema()?;
    Ok(db)
}

fn log_auth_event(event: AuthEvent, email: Option<&str>) {
    match (event, email) {
        (AuthEvent::SignedIn, Some(email)) => info!("Auth state changed: signed in as {}", email),
        (AuthEvent::SignedIn, None) => info!("Auth state changed: signed in"),
        (AuthEvent::SignedOut, _) => info!("Auth state changed: signed out"),
    }
}

fn sign_in(config: &Config, email: &str) -> AppResult<()> {
    let db = open_database(config)?;
    let store = SessionStore::new(config.session_path());
    let subscription = store.on_auth_state_change(|event, session| {
        log_auth_event(event, session.map(|s| s.email.as_str()))
    });

    let session = store.sign_in(&db, email)?;
    subscription.unsubscribe();

    println!("Signed in as {}", session.email);
    Ok(())
}

fn sign_out(config: &Config) -> AppResult<()> {
    ensure_data_dir(&config.data_dir)?;
    let store = SessionStore::new(config.session_path());
    let subscription = store.on_auth_state_change(|event, session| {
        log_auth_event(event, session.map(|s| s.email.as_str()))
    });

    store.sign_out()?;
    subscription.unsubscribe();

    println!("Signed out");
    Ok(())
}

fn read_stdin() -> AppResult<String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Write your entry, then press Ctrl-D:");
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

async fn write_entry(config: &Config, text: Option<String>, use_draft: bool) -> AppResult<()> {
    let db = open_database(config)?;
    let session = SessionStore::new(config.session_path()).require()?;
    let draft_path = config.draft_path();

    let raw = if use_draft {
        load_draft(&draft_path)?
            .ok_or_else(|| AppError::Journal("No draft to submit".to_string()))?
    } else {
        match text {
            Some(text) => text,
            None => read_stdin()?,
        }
    };

    let entry = JournalEntryInput::new(raw)?;
    let client = AnalysisClient::from_config(config);

    info!("Analyzing entry via {}", client.endpoint());
    match submit_entry(&db, &session, &client, &entry).await {
        Ok(record) => {
            clear_draft(&draft_path)?;
            print!("{}", render_analysis(&record.analysis));
            Ok(())
        }
        Err(e) => {
            save_draft(&draft_path, entry.as_str())?;
            warn!("Entry kept as a draft; resubmit with `serenity write --draft`");
            Err(e)
        }
    }
}

fn show_history(config: &Config, limit: usize) -> AppResult<()> {
    let db = open_database(config)?;
    let session = SessionStore::new(config.session_path()).require()?;

    let history = load_history(&db, &session, limit)?;
    print!("{}", render_history(&history));
    Ok(())
}
