use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use sensordash_cli::cli::Cli;
use sensordash_cli::config::{Config, default_config_path};
use sensordash_cli::format::FormatOptions;
use sensordash_core::{Dashboard, FetchClient, Scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the dashboard on stdout stays clean
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    config.validate()?;

    if cli.write_config {
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        config.save(&path)?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let client = FetchClient::with_timeout(&config.endpoint.url, config.endpoint.timeout())
        .context("Failed to create fetch client")?;
    let dashboard = Dashboard::new(config.dashboard_options());
    let mut scheduler = Scheduler::new(
        Arc::clone(&dashboard),
        Arc::new(client),
        config.scheduler_options(),
    );
    let opts = FormatOptions::new(cli.no_color, cli.format);

    if cli.once {
        scheduler.refresh_now().await;
        let snapshot = dashboard.snapshot().await;
        print!("{}", opts.render(&snapshot)?);
        if let Some(error) = snapshot.error {
            anyhow::bail!("Refresh failed: {}", error);
        }
        return Ok(());
    }

    info!("Polling {}", config.endpoint.url);
    if !cli.quiet {
        eprintln!("Press r + Enter to refresh, q + Enter or Ctrl-C to quit");
    }

    let mut events = dashboard.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    scheduler.start();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => debug!("Dashboard event: {:?}", event),
                    Err(RecvError::Lagged(skipped)) => debug!("Skipped {} dashboard events", skipped),
                    Err(RecvError::Closed) => break,
                }
                print!("{}", opts.render(&dashboard.snapshot().await)?);
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match line.trim() {
                        "r" => {
                            info!("Manual refresh");
                            let _ = scheduler.trigger_refresh();
                        }
                        "q" => break,
                        "" => {}
                        other => eprintln!("Unknown command '{}' (r = refresh, q = quit)", other),
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    scheduler.stop();
    Ok(())
}

/// Load the config file (explicit path or default) and apply CLI overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) if path.exists() || !cli.write_config => Config::load(path)?,
        Some(_) => Config::default(),
        None => Config::load_default()?,
    };
    cli.apply_overrides(&mut config);
    Ok(config)
}
