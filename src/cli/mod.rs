//! Command-line interface definition.

pub mod output;

use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::{Parser, Subcommand};

/// An AI-powered mood journal for mental wellness
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[clap(long, global = true, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the mood analysis service
    Serve {
        /// Address to listen on (host:port)
        #[clap(long)]
        bind: Option<String>,
    },

    /// Start a session for an email address
    SignIn {
        /// Email address identifying the journal
        email: String,
    },

    /// End the current session
    SignOut,

    /// Analyse and save a journal entry (reads stdin when TEXT is omitted)
    Write {
        /// Entry text
        text: Option<String>,

        /// Resubmit the draft kept from a failed submission
        #[clap(long, conflicts_with = "text")]
        draft: bool,
    },

    /// Show recent entries and the average mood
    History {
        /// Number of entries to show
        #[clap(short = 'n', long, value_parser = parse_limit)]
        limit: Option<usize>,
    },
}

fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(format!("'{}' is not a positive integer", raw)),
    }
}
