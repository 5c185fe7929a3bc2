//! Command-line interface for trk.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::http::{self, AppState};
use crate::identity::LocalUsers;
use crate::output::{self, OutputOptions};
use crate::storage::Paths;
use crate::store::Backend;

#[derive(Parser)]
#[command(
    name = "trk",
    version,
    about = "Personal tracker API and sync tooling"
)]
pub struct Cli {
    /// Path to a .trk.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the tracker REST API server
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3001
        #[arg(long, env = "TRK_BIND")]
        bind: Option<String>,

        /// Data directory override
        #[arg(long, env = "TRK_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Storage backend: memory, document or workbook
        #[arg(long)]
        backend: Option<String>,

        /// Reject requests without an identity header
        #[arg(long)]
        require_identity: bool,
    },

    /// Manage locally registered users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a local user for namespacing local collections
    Register { username: String, password: String },

    /// List registered local users
    List,
}

impl Cli {
    /// Stable command name for output envelopes
    pub fn command_name(&self) -> &'static str {
        match &self.command {
            Commands::Serve { .. } => "serve",
            Commands::User { command } => match command {
                UserCommands::Register { .. } => "user register",
                UserCommands::List => "user list",
            },
        }
    }

    pub async fn run(self) -> Result<()> {
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let mut config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve {
                bind,
                data_dir,
                backend,
                require_identity,
            } => {
                if let Some(bind) = bind {
                    config.bind = bind;
                }
                if let Some(data_dir) = data_dir {
                    config.storage.data_dir = data_dir;
                }
                if let Some(backend) = backend {
                    config.storage.backend = BackendKind::parse(&backend)?;
                }
                if require_identity {
                    config.identity.required = true;
                }

                let paths = Paths::new(config.storage.data_dir.clone());
                paths.init_all()?;
                let backend = Arc::new(Backend::open(config.storage.backend, &paths)?);
                let state = AppState::new(backend, config.identity.clone());
                http::serve(state, &config.bind).await
            }

            Commands::User { command } => {
                let paths = Paths::new(config.storage.data_dir.clone());
                paths.init_all()?;
                let registry = LocalUsers::new(paths.users_file());

                match command {
                    UserCommands::Register { username, password } => {
                        let user = registry.register(&username, &password)?;
                        output::emit_success(
                            options,
                            "user register",
                            &user,
                            &[format!("registered user {}", user.username)],
                        )
                    }
                    UserCommands::List => {
                        let users = registry.list()?;
                        let lines: Vec<String> = users
                            .iter()
                            .map(|user| format!("{}  {}", user.id, user.username))
                            .collect();
                        output::emit_success(options, "user list", &users, &lines)
                    }
                }
            }
        }
    }
}
