use clap::{Parser, Subcommand};

use crate::admin::AdminCommand;

#[derive(Debug, Parser)]
#[command(name = "job-board", version, about = "Job board web application")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (the default when no command is given)
    Serve {
        /// Keep everything in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply pending database migrations and exit
    Migrate,
    /// Inspect and manage jobs, applications and accounts
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

impl Cli {
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Serve { in_memory: false })
    }
}
