//! Command-line surface: argument definitions and dispatch.

mod auth;
mod donations;
mod events;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use givetrack_core::models::{PageSize, PRESET_AMOUNTS};
use givetrack_core::ApiError;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "givetrack", version, about = "Manage fundraising events and donations")]
pub struct Cli {
    /// API base URL, e.g. https://fundraiser.example.org/api/
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and keep the session for later commands
    Login {
        #[arg(short, long, env = "GIVETRACK_USERNAME")]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Browse and manage events
    #[command(subcommand)]
    Events(EventsCommand),
    /// Donate to an event
    Donate {
        event_id: i64,
        /// Amount to give
        #[arg(required_unless_present = "preset")]
        amount: Option<String>,
        /// One of the quick-pick amounts (500, 1000, 1500)
        #[arg(long, conflicts_with = "amount", value_parser = parse_preset)]
        preset: Option<u32>,
    },
    /// Donation reports
    #[command(subcommand)]
    Donations(DonationsCommand),
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// List events, eight per page
    List {
        /// Only events whose title contains this text
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show an event with its donations
    Show { id: i64 },
    /// Create an event (admin and HR only)
    Create(EventFields),
    /// Edit an event; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: EventFields,
    },
    /// Delete an event
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct EventFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Event date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Image file to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TableQuery {
    #[arg(short, long, default_value = "")]
    pub search: String,
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,
    /// Rows per page: 5, 10, 50 or all
    #[arg(long, default_value = "10")]
    pub page_size: PageSize,
}

#[derive(Subcommand, Debug)]
pub enum DonationsCommand {
    /// Donation totals per event
    Summary(TableQuery),
    /// Individual donations for one event
    List {
        event_id: i64,
        #[command(flatten)]
        query: TableQuery,
    },
}

fn parse_preset(s: &str) -> Result<u32, String> {
    let amount: u32 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if PRESET_AMOUNTS.contains(&amount) {
        Ok(amount)
    } else {
        Err(format!("preset must be one of {:?}", PRESET_AMOUNTS))
    }
}

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => auth::login(app, username).await,
        Command::Logout => auth::logout(app).await,
        Command::Whoami => auth::whoami(app).await,
        Command::Events(cmd) => match cmd {
            EventsCommand::List { search, page } => {
                events::list(app, search.as_deref().unwrap_or(""), page).await
            }
            EventsCommand::Show { id } => events::show(app, id).await,
            EventsCommand::Create(fields) => events::create(app, fields).await,
            EventsCommand::Update { id, fields } => events::update(app, id, fields).await,
            EventsCommand::Delete { id, yes } => events::delete(app, id, yes).await,
        },
        Command::Donate {
            event_id,
            amount,
            preset,
        } => donations::donate(app, event_id, amount.as_deref(), preset).await,
        Command::Donations(cmd) => match cmd {
            DonationsCommand::Summary(query) => donations::summary(app, query).await,
            DonationsCommand::List { event_id, query } => {
                donations::list(app, event_id, query).await
            }
        },
    }
}

/// User-facing text for a failed command. Prefers the server's `detail`
/// message when the API returned one.
pub fn describe_error(err: &anyhow::Error) -> String {
    if let Some(detail) = err.downcast_ref::<ApiError>().and_then(ApiError::detail) {
        return detail;
    }
    format!("{:#}", err)
}

pub fn is_session_expired(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_session_expired)
}
