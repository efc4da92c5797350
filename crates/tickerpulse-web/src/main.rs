use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tickerpulse_core::{QuoteService, ReqwestHttpClient};
use tickerpulse_web::cli::Cli;
use tickerpulse_web::{app, obs, AppState, ServerError};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let cli = Cli::parse();
    obs::init_tracing(&cli.log_level, cli.log_format)?;

    let provider = cli.provider_config();
    let source = provider.build_source(Arc::new(ReqwestHttpClient::new()))?;
    let service = QuoteService::new(source, cli.service_config()?);
    tracing::info!(
        provider = %provider.provider,
        base_url = provider.base_url(),
        window = ?service.config().window,
        max_concurrency = service.config().max_concurrency,
        "quote service configured"
    );

    let router = app(
        AppState::new(service),
        cli.request_timeout(),
    );
    let listener = TcpListener::bind(cli.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: cli.bind,
            source,
        })?;
    tracing::info!(addr = %cli.bind, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
