use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use sqlx::PgPool;

use ladder_bot_rust::logging::{init_tracing, TracingConfig};
use ladder_bot_rust::{
    create_pool, Config, DuplicateCheck, LadderClient, RegistrationOutcome, RegistrationRepo,
};

#[derive(Parser, Debug)]
#[command(name = "ladder-bot", version, about = "Manage ladder bot channel registrations")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered channels
    List,
    /// Report whether a channel or ladder id is already registered
    Check { channel: String, ladder_id: i64 },
    /// Register a channel against a ladder id
    Register { channel: String, ladder_id: i64 },
    /// Remove a channel registration
    Unregister { channel: String },
    /// GET a path from the ladder API and print the reply as JSON
    Lookup { path: String },
}

fn describe(check: DuplicateCheck) -> &'static str {
    match check {
        DuplicateCheck::NoMatch => "not registered",
        DuplicateCheck::ChannelConflict => "channel already registered",
        DuplicateCheck::IdConflict => "ladder id already registered to another channel",
    }
}

fn registrations(config: &Config) -> Result<RegistrationRepo<PgPool>> {
    let pool = create_pool(&config.pool).context("Failed to create database pool")?;
    Ok(RegistrationRepo::new(pool))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug })
        .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))?;

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::List => {
            for channel in registrations(&config)?.load_registered_users().await? {
                println!("{}", channel);
            }
        }
        Command::Check { channel, ladder_id } => {
            let check = registrations(&config)?
                .check_user_or_id_repeated(&channel, ladder_id)
                .await?;
            println!("{}", describe(check));
        }
        Command::Register { channel, ladder_id } => {
            match registrations(&config)?.register(&channel, ladder_id).await? {
                RegistrationOutcome::Registered => {
                    println!("Registered {} with ladder id {}", channel, ladder_id)
                }
                RegistrationOutcome::AlreadyRegistered(check) => println!("{}", describe(check)),
                RegistrationOutcome::Conflict { code } => {
                    println!("Already registered (code {})", code)
                }
            }
        }
        Command::Unregister { channel } => {
            let rows = registrations(&config)?
                .delete_registered_user(&channel)
                .await?;
            if rows == 0 {
                println!("{} was not registered", channel);
            } else {
                println!("Removed {}", channel);
            }
        }
        Command::Lookup { path } => {
            let client = LadderClient::new(&config.ladder)?;
            let response = client.make_ladder_request(&path).await?;
            println!("{}", serde_json::to_string_pretty(&response.to_reply())?);
        }
    }

    Ok(())
}
