mod commands;

use std::ffi::OsString;

use clap::Parser;
use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse_from(normalized_args(std::env::args_os().collect()));

    match cli.command {
        Commands::Regenerate(args) => commands::regenerate::execute(args).await?,
        Commands::Register(args) => commands::register::execute(args).await?,
    }

    Ok(())
}

/// `regenerate` is the default subcommand: a first argument that is a flag
/// gets the subcommand name inserted in front of it.
fn normalized_args(mut argv: Vec<OsString>) -> Vec<OsString> {
    if let Some(first) = argv.get(1).map(|arg| arg.to_string_lossy().into_owned()) {
        let top_level = matches!(first.as_str(), "-h" | "--help" | "-V" | "--version");
        if first.starts_with('-') && !top_level {
            argv.insert(1, OsString::from("regenerate"));
        }
    }
    argv
}
