//! `assura` — back-office command line.
//!
//! Usage:
//!   assura -c <context-name-or-path> <command>
//!
//! The context name resolves to `/etc/assura/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod commands;

use clap::{Parser, Subcommand};
use tracing::info;

use assura_core::ServerConfig;

/// Assura back-office core.
#[derive(Parser, Debug)]
#[command(name = "assura", about = "Assura insurance back-office")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", global = true, default_value = "default")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create data files and schemas, and ensure the root account exists.
    Bootstrap,

    /// Print an argon2id hash for `[root] password_hash`.
    HashPassword {
        /// Password (not recommended — use interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Start a login. Standard accounts get a one-time code by mail
    /// (written to the log by the development mailer).
    Login {
        #[arg(long)]
        email: String,
        /// Prompt for a password (privileged accounts).
        #[arg(long)]
        password: bool,
    },

    /// Finish a standard-account login with the mailed code.
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },

    /// Verify a session token and print its claims.
    CheckToken {
        token: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bootstrap => commands::bootstrap::run(&load_config(&cli.config)?),
        Commands::HashPassword { password } => commands::password::hash(password),
        Commands::Login { email, password } => {
            commands::session::login(&load_config(&cli.config)?, &email, password)
        }
        Commands::VerifyOtp { email, otp } => {
            commands::session::verify_otp(&load_config(&cli.config)?, &email, &otp)
        }
        Commands::CheckToken { token } => {
            commands::session::check_token(&load_config(&cli.config)?, &token)
        }
    }
}

fn load_config(name_or_path: &str) -> anyhow::Result<ServerConfig> {
    let config_path = ServerConfig::resolve_path(name_or_path);
    info!("Loading configuration from {}", config_path.display());
    let config = ServerConfig::load(&config_path)?;
    config.verify()?;
    Ok(config)
}
