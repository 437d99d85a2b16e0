// src/cli.rs
use clap::{Args, Parser, Subcommand};
use slotbook_booking::AdminCredentials;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slotbook", version, about = "Book a blood donation time slot")]
pub struct Cli {
    /// API base URL including the /api prefix (overrides [client].base_url)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Fill in the form and reserve a time
    Book,
    /// Show every slot with its availability
    Slots,
    /// Show the current bookings
    List,
    /// Keep the booking list on screen, redrawn on every change
    Watch,
    /// Export all bookings to an .xlsx file
    Export {
        /// Directory the file is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[command(flatten)]
        admin: AdminArgs,
    },
    /// Remove every booking
    Clear {
        #[command(flatten)]
        admin: AdminArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct AdminArgs {
    /// Admin username; prompted when missing
    #[arg(long)]
    pub username: Option<String>,
    /// Admin password; prompted when missing
    #[arg(long, env = "SLOTBOOK_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl AdminArgs {
    /// Credentials given on the command line, when both parts are present.
    pub fn credentials(&self) -> Option<AdminCredentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                Some(AdminCredentials::new(username.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}
