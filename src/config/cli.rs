use crate::domain::model::SessionContext;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "zoo-tracker")]
#[command(about = "Relocate animals, browse movement history and handle QR payloads")]
pub struct Cli {
    /// TOML config file; falls back to ZOO_* environment variables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Staff member the calls are attributed to
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Session token issued by the backend auth service
    #[arg(long, global = true)]
    pub access_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Move an animal to another enclosure and record the move
    Relocate {
        #[arg(long)]
        animal: String,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show recent relocations, newest first
    History {
        #[arg(long, default_value = "100")]
        limit: usize,
        #[arg(long)]
        animal: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    #[command(subcommand)]
    Animal(AnimalCommand),
    /// List enclosures that can be used as destinations
    Enclosures {
        #[arg(long)]
        area: Option<String>,
    },
    #[command(subcommand)]
    Qr(QrCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum AnimalCommand {
    Show {
        id: String,
    },
    /// Create an animal in its initial enclosure (no history record)
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        species: Option<String>,
        #[arg(long)]
        enclosure: Option<String>,
        #[arg(long, default_value = "active")]
        status: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum QrCommand {
    /// Print the payload text to encode into a QR image
    Generate {
        #[arg(long)]
        action: String,
        /// JSON object with the action's data
        #[arg(long, default_value = "{}")]
        data: String,
    },
    /// Decide what to do with a scanned payload
    Dispatch {
        #[arg(long)]
        payload: String,
        #[arg(long, default_value = "qr")]
        format: String,
        /// Look up referenced animals in the backend
        #[arg(long)]
        resolve: bool,
        /// Skip the prompt for outcomes that leave the app or need staff input
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl Cli {
    pub fn session(&self) -> SessionContext {
        SessionContext {
            user_id: self.user.clone(),
            access_token: self
                .access_token
                .clone()
                .or_else(|| std::env::var("ZOO_ACCESS_TOKEN").ok()),
        }
    }

    pub fn needs_backend(&self) -> bool {
        match &self.command {
            Command::Qr(QrCommand::Generate { .. }) => false,
            Command::Qr(QrCommand::Dispatch { resolve, .. }) => *resolve,
            _ => true,
        }
    }
}
