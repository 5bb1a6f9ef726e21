use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Public root the file service serves banners under.
    pub files_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Meetup scheduling API")]
pub struct Args {
    /// Host to bind to (overrides MEETUP_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MEETUP_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides MEETUP_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Public URL of stored banner files (overrides MEETUP_FILES_URL)
    #[arg(long)]
    pub files_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::merge(args, |key| env::var(key))?;
        Ok((cfg, migrate))
    }

    /// Merge CLI args over environment lookups over defaults.
    fn merge<F>(args: Args, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = var("MEETUP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match var("MEETUP_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing MEETUP_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3333,
            Err(err) => return Err(err).context("reading MEETUP_PORT"),
        };
        let env_db =
            var("MEETUP_DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/meetups.db".into());
        let env_files =
            var("MEETUP_FILES_URL").unwrap_or_else(|_| "http://localhost:3333/files".into());

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            files_url: args.files_url.unwrap_or(env_files),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
