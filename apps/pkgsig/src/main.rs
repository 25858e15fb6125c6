//! pkgsig - package signature validation
//!
//! Command line front end for the validation core: runs one validation
//! against a package on disk, manages the trusted certificate store and
//! inspects recorded signing states.

mod cli;
mod commands;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, GlobalArgs};
use crate::commands::{execute_command, CommandContext, CommandResult};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use pkgsig_config::Config;
use pkgsig_events::EventReceiver;
use pkgsig_state::SigningDatabase;
use std::process;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    let config = match load_config(&cli.global).await {
        Ok(config) => config,
        Err(e) => {
            report_error(&e, json_mode);
            process::exit(e.exit_code());
        }
    };

    logging::init_tracing(&config.logging, cli.global.debug);

    match run(cli, config).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            report_error(&e, json_mode);
            process::exit(e.exit_code());
        }
    }
}

/// Load configuration with proper precedence:
/// file (or defaults), then environment, then CLI flags
async fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(global.config.as_deref()).await?;
    config.merge_env()?;

    if let Some(db_path) = &global.db_path {
        config.state.db_path.clone_from(db_path);
    }

    Ok(config)
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<i32, CliError> {
    info!("Starting pkgsig v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = pkgsig_events::channel();
    let db = SigningDatabase::open(&config.state.db_path)
        .await?
        .with_event_sender(event_sender.clone());

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let ctx = CommandContext {
        config,
        db,
        tx: event_sender,
        cancel,
    };
    let mut event_handler = EventHandler::new(cli.global.json);

    let result =
        execute_command_with_events(cli.command, ctx, event_receiver, &mut event_handler).await?;

    OutputRenderer::new(cli.global.json).render_result(&result)?;

    info!("Command completed successfully");
    Ok(result.exit_code())
}

/// Cancel in-flight work on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    });
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: cli::Commands,
    ctx: CommandContext,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ctx));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

fn report_error(error: &CliError, json_mode: bool) {
    if json_mode {
        println!("{}", error.to_json());
    } else {
        eprintln!("Error: {error}");
    }
}
