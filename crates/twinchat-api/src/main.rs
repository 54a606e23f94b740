//! twinchat CLI and REST API entry point.
//!
//! Binary name: `twinchat`
//!
//! Parses CLI arguments, builds the configuration and services, then
//! dispatches to the command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use twinchat_core::chat::repository::ConversationRepository;
use twinchat_observe::tracing_setup::{LogFormat, TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "twinchat", &mut std::io::stdout());
        return Ok(());
    }

    // The server logs requests by default; one-shot commands stay quiet.
    let serving = matches!(cli.command, Commands::Serve { .. });
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if serving => "info",
        0 => "warn",
        1 => "info,twinchat=debug",
        _ => "trace",
    };

    init_tracing(&TracingOptions {
        default_filter: filter.to_string(),
        format: if cli.config.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        },
        enable_otel: cli.config.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.to_app_config()?;

    // History only reads the store: no persona or model credentials needed.
    if let Commands::History { session_id } = &cli.command {
        let store = state::open_store(&config, state::http_client(&config)?)?;
        let repository = ConversationRepository::new(store);
        return cli::chat::show_history(&repository, session_id, cli.json).await;
    }

    let state = AppState::init(config).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(
                addr = %addr,
                memory = state.config.storage.label(),
                model = %state.config.model.model_id,
                "twinchat API listening"
            );
            if !cli.quiet && !cli.json {
                println!(
                    "  {} twinchat API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet && !cli.json {
                println!("\n  Server stopped.");
            }
        }

        Commands::Chat { session, message } => {
            cli::chat::send_message(&state, session.as_deref(), &message, cli.json, cli.quiet)
                .await?;
        }

        Commands::History { .. } | Commands::Completions { .. } => {
            unreachable!("handled before state init")
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
