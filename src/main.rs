//! Command-line front end for the studio backend.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use process_studio::prelude::*;

const DEFAULT_TOKEN_DIR: &str = ".process-studio";

#[derive(Parser)]
#[command(name = "process-studio", version, about = "Manage processes, policies and rules")]
struct Cli {
    /// JSON config file; PROCESS_STUDIO_* variables override it.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session token
    Login {
        email: String,
        #[arg(long, env = "PROCESS_STUDIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted session token
    Logout,
    /// Print every record of a collection
    List { resource: Resource },
    /// Delete one record
    Delete { resource: Resource, id: String },
    /// Run a compliance analysis of a process against policies
    Analyze {
        #[arg(long)]
        process: String,
        #[arg(long = "policy", required = true)]
        policies: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => StudioConfig::from_file(path)?,
        None => StudioConfig::default(),
    }
    .with_env_overrides()?;
    if config.token_dir.is_none() {
        config.token_dir = Some(PathBuf::from(DEFAULT_TOKEN_DIR));
    }

    let session = Session::start(&config).context("could not start session")?;
    let result = run(&session, cli.command).await;
    session.end();
    result
}

async fn run(session: &Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = session.auth.login(&email, &password).await?;
            print_json(&user)?;
        }
        Command::Logout => session.auth.logout(),
        Command::List { resource } => {
            ensure_authenticated(session).await?;
            match resource {
                Resource::Processes => print_json(&session.processes.load_processes().await?)?,
                Resource::Policies => print_json(&session.policies.load_policies().await?)?,
                Resource::Rules => print_json(&session.policies.load_rules().await?)?,
            }
        }
        Command::Delete { resource, id } => {
            ensure_authenticated(session).await?;
            match resource {
                Resource::Processes => session.processes.delete_process(&id).await?,
                Resource::Policies => session.policies.delete_policy(&id).await?,
                Resource::Rules => session.policies.delete_rule(&id).await?,
            }
        }
        Command::Analyze { process, policies } => {
            ensure_authenticated(session).await?;
            let analysis = session
                .policies
                .analyze_compliance(&process, &policies)
                .await?;
            print_json(&analysis)?;
        }
    }

    for notification in session.notifications.drain() {
        match notification.level {
            NotificationLevel::Success => tracing::info!("{}", notification.message),
            NotificationLevel::Error => tracing::error!("{}", notification.message),
        }
    }
    Ok(())
}

async fn ensure_authenticated(session: &Session) -> anyhow::Result<()> {
    if session.auth.restore().await.is_none() {
        bail!("not logged in; run `process-studio login <email>` first");
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
