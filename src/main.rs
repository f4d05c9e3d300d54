//! Main entry point for ryc CLI

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;
use ryc::cli::output::OutputFormatter;
use ryc::cli::Args;
use ryc::config::{resolve_backend_url, SettingsStore};
use ryc::core::{Controller, Notifier};
use ryc::platform::BackendClient;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    debug!("Starting ryc with args: {:?}", args);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("❌ Error: {:#}", e).red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Run one invocation. Client failures are already rendered by the time
/// this returns, so they come back as an exit code rather than an error.
async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let started = Instant::now();
    let formatter = OutputFormatter::new(args.verbosity_level()).with_progress(!args.no_progress);

    if args.is_settings_command() {
        return manage_backend_url(&args, &formatter);
    }

    let url = match &args.url {
        Some(url) => url.clone(),
        None => bail!("No video URL given. Run with --help for usage"),
    };

    let persisted = load_persisted_backend_url();
    let backend_url = resolve_backend_url(args.backend_url.as_deref(), persisted.as_deref())
        .context("Invalid backend URL")?;
    let config = args.client_config(backend_url);
    info!("Using backend {}", config.backend_url);

    let client = BackendClient::from_config(&config).context("Failed to create HTTP client")?;

    let (notifier, mut events) = Notifier::channel();
    let renderer = tokio::spawn(async move {
        let mut formatter = formatter;
        while let Some(event) = events.recv().await {
            formatter.handle_event(&event);
        }
        formatter
    });

    let mut controller = Controller::new(Arc::new(client), &config, notifier);
    let mut interrupted = false;

    let result = tokio::select! {
        result = run_flow(&mut controller, &args, &url) => result,
        _ = tokio::signal::ctrl_c() => {
            interrupted = true;
            Ok(None)
        }
    };

    let result = if interrupted {
        warn!("Interrupted, stopping");
        controller.reset();
        // Ctrl-C while the completion state was on screen still counts as done
        Ok(controller.last_saved().map(|path| path.to_path_buf()))
    } else {
        result
    };

    // Dropping the controller closes the event channel
    drop(controller);
    let formatter = renderer.await.context("Output task failed")?;

    match result {
        Ok(Some(path)) => {
            debug!("Finished with {:?}", path);
            formatter.print_elapsed(started.elapsed());
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) if interrupted => {
            formatter.warning("Interrupted");
            Ok(ExitCode::from(130))
        }
        Ok(None) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            debug!("Flow failed: {} ({:?})", e, e.kind());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_flow(
    controller: &mut Controller<BackendClient>,
    args: &Args,
    url: &str,
) -> ryc::Result<Option<PathBuf>> {
    if args.list_formats {
        controller.submit_url(url).await?;
        return Ok(None);
    }

    controller.run(url, args.format.as_deref()).await
}

/// Handle `--set-backend-url` and `--clear-backend-url`
fn manage_backend_url(args: &Args, formatter: &OutputFormatter) -> anyhow::Result<ExitCode> {
    let store = SettingsStore::open_default()?;

    if let Some(raw) = &args.set_backend_url {
        let url = store
            .save_backend_url(raw)
            .with_context(|| format!("Failed to save backend URL {:?}", raw))?;
        formatter.success(&format!("Backend URL set to {} (takes effect on the next run)", url));
    } else {
        store
            .clear_backend_url()
            .context("Failed to clear backend URL")?;
        formatter.success("Backend URL reset to the default");
    }

    debug!("Settings file: {:?}", store.path());
    Ok(ExitCode::SUCCESS)
}

fn load_persisted_backend_url() -> Option<String> {
    let store = SettingsStore::open_default().ok()?;
    match store.load() {
        Ok(settings) => settings.backend_url,
        Err(e) => {
            warn!("Ignoring unreadable settings file {:?}: {}", store.path(), e);
            None
        }
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(verbose)
                .with_line_number(verbose)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
