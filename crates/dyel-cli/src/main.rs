use clap::Parser;
use dyel_db::{ErrorKind, RepoError};
use tokio_util::sync::CancellationToken;

mod cli;
mod commands;
mod context;
mod output;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("dyel error: {error:#}");
        std::process::exit(exit_code(&error));
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    let mut config = dyel_config::DyelConfig::load_with_dotenv()?;
    if let Some(timeout_ms) = flags.timeout_ms {
        config.requests.timeout_ms = timeout_ms;
    }

    let shutdown = CancellationToken::new();
    spawn_ctrl_c(shutdown.clone());

    let ctx = context::AppContext::init(config, shutdown).await?;
    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

/// Cancel in-flight work on the first Ctrl-C.
fn spawn_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            shutdown.cancel();
        }
    });
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("DYEL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Process exit status for a failed command.
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<RepoError>())
        .map_or(1, |repo_error| exit_code_for(repo_error.kind()))
}

const fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Conflict => 4,
        ErrorKind::Storage => 1,
        ErrorKind::Canceled => 130,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn repo_errors_map_to_distinct_exit_codes() {
        let not_found = anyhow::Error::new(RepoError::NotFound { id: "x".into() });
        assert_eq!(exit_code(&not_found), 3);

        let validation: anyhow::Result<()> =
            Err(RepoError::Validation("name must not be blank".into()))
                .context("failed to create program");
        assert_eq!(exit_code(&validation.unwrap_err()), 2);

        let canceled = anyhow::Error::new(RepoError::Canceled(dyel_db::CancelReason::Canceled));
        assert_eq!(exit_code(&canceled), 130);
    }

    #[test]
    fn other_errors_exit_with_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
        assert_eq!(exit_code_for(ErrorKind::Conflict), 4);
    }
}
