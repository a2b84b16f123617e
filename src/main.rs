use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video2mp3::cli::{Cli, Commands};
use video2mp3::config::Config;
use video2mp3::{server, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut config, config_path) = Config::load()?;

    init_tracing(cli.verbose, config.logging.json);
    if let Some(path) = &config_path {
        tracing::debug!("Loaded configuration from {}", path.display());
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            ffmpeg_path,
            yt_dlp_path,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = data_dir {
                config.storage.data_dir = Some(dir);
            }
            if let Some(path) = ffmpeg_path {
                config.tools.ffmpeg_path = path;
            }
            if let Some(path) = yt_dlp_path {
                config.tools.yt_dlp_path = path;
            }
            config.validate()?;

            // Missing tools only fail the requests that need them
            let missing_deps =
                utils::check_dependencies(&config.tools.ffmpeg_path, &config.tools.yt_dlp_path).await;
            for dep in missing_deps {
                tracing::warn!("External tool not available: {}", dep);
            }

            tracing::info!(version = env!("CARGO_PKG_VERSION"), "video2mp3 starting");
            server::serve(&config).await?;
        }
        Commands::Check => {
            let tools = [
                (config.tools.ffmpeg_path.as_str(), "-version"),
                (config.tools.yt_dlp_path.as_str(), "--version"),
            ];

            let mut all_found = true;
            for (tool, flag) in tools {
                if utils::check_command_available(tool, flag).await {
                    println!("  {} {}", style("✓").green(), tool);
                } else {
                    all_found = false;
                    println!("  {} {} (not found)", style("✗").red(), tool);
                }
            }

            if !all_found {
                anyhow::bail!("Some external tools are missing");
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration is read from ./config.yaml or <config dir>/video2mp3/config.yaml.");
                println!("Run with --show to print the effective values.");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "video2mp3=debug,tower_http=debug"
    } else {
        "video2mp3=info,tower_http=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
