use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use asc_core::{ApiCredentials, ConnectSession};

pub mod regenerate;
pub mod register;

#[derive(Debug, Parser)]
#[command(
    name = "asconnect",
    author,
    version,
    about = "App Store Connect API utility",
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Regenerate development and distribution provisioning profiles
    Regenerate(regenerate::RegenerateArgs),
    /// Register a development device
    Register(register::RegisterArgs),
}

/// The three components of a JWT-based API key, shared by every subcommand.
#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Issuer ID for the API auth key
    #[arg(long = "issuer-id", value_name = "ID")]
    pub issuer_id: String,
    /// Key ID for the API auth key
    #[arg(long = "key-id", value_name = "ID")]
    pub key_id: String,
    /// Path to the API auth key (.p8)
    #[arg(long = "auth-key", value_name = "PATH")]
    pub auth_key: PathBuf,
}

impl AuthArgs {
    pub fn session(&self) -> anyhow::Result<ConnectSession> {
        let credentials = ApiCredentials::load(&self.issuer_id, &self.key_id, &self.auth_key)?;
        Ok(ConnectSession::new(credentials)?)
    }
}
