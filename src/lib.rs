/*!
# Serenity

Serenity is a mood journal. Each entry is sent to a mood analysis service,
which asks a hosted language model for a structured assessment: a mood score
from 0 to 100, one of ten mental states, suggestions, habits and a breathing
exercise. Analysed entries are stored per user and summarised as a recent
mood history.

## Architecture

- `analysis`: The `MoodAnalysis` contract and its validation
- `ai`: Prompt, function-calling schema and completion endpoint client
- `service`: HTTP service exposing `POST /analyze-mood`
- `client`: Single-flight client for the analysis service
- `journal`: Entry input, submission and drafts
- `history`: Recent entries and average mood
- `session`: Explicit signed-in identity with change listeners
- `db`: SQLite persistence
- `cli`: Command-line interface and text rendering
- `config`, `errors`, `logging`: Configuration, error types and tracing setup

## Usage Example

```rust,no_run
use serenity::client::AnalysisClient;
use serenity::db::Database;
use serenity::journal::{submit_entry, JournalEntryInput};
use serenity::session::SessionStore;
use serenity::Config;

# async fn run() -> serenity::AppResult<()> {
let config = Config::load()?;
config.validate()?;
serenity::config::ensure_data_dir(&config.data_dir)?;

let db = Database::open(&config.db_path())?;
db.initialize_schema()?;

let session = SessionStore::new(config.session_path()).require()?;
let client = AnalysisClient::from_config(&config);

let entry = JournalEntryInput::new("I had a wonderful productive day")?;
let record = submit_entry(&db, &session, &client, &entry).await?;
println!("{}", record.analysis.mental_state);
# Ok(())
# }
```
*/

/// Hosted language model integration
pub mod ai;
/// Mood analysis contract
pub mod analysis;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Client for the mood analysis service
pub mod client;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// SQLite persistence
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Mood history
pub mod history;
/// Journal entry submission
pub mod journal;
/// Tracing setup
pub mod logging;
/// Mood analysis HTTP service
pub mod service;
/// Signed-in identity
pub mod session;

// Re-export important types for convenience
pub use analysis::{MentalState, MoodAnalysis};
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
