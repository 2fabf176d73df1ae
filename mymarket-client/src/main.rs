/// Main entry point for the `mymarket` command-line tool.
///
/// Lists, shows and installs packages from a private catalog and local vsix
/// directories.

use clap::Parser;
use miette::Result;
use mymarket_client::cli::SourceCommands;
use mymarket_client::config::get_config_path;
use mymarket_client::{Cli, Commands, ConsoleNotifier, SourceFilter, commands};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MYMARKET_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    let log_level = if cli.verbose {
        "mymarket=debug,mymarket_client=debug"
    } else {
        "mymarket=info,mymarket_client=info"
    };
    let filter = if cli.verbose {
        EnvFilter::new(log_level)
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(log_level))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => get_config_path()?,
    };
    tracing::debug!("using config {}", config_path.display());

    let notifier = ConsoleNotifier;
    match cli.command {
        Commands::List(args) => {
            let filter = if args.api {
                SourceFilter::Catalog
            } else if args.dir {
                SourceFilter::Directories
            } else {
                SourceFilter::All
            };
            commands::list_packages(&config_path, filter, &notifier)?;
        }

        Commands::Show(args) => {
            commands::show_package(
                &config_path,
                &args.identifier,
                args.version.as_deref(),
                args.target.as_deref(),
                &notifier,
            )?;
        }

        Commands::Install(args) => {
            commands::install_package(
                &config_path,
                &args.identifier,
                args.version.as_deref(),
                args.target.as_deref(),
                &notifier,
            )?;
        }

        Commands::Source(SourceCommands::AddApi { url }) => {
            commands::add_api_source(&config_path, &url, &notifier)?;
        }

        Commands::Source(SourceCommands::AddDir { path }) => {
            commands::add_directory_source(&config_path, &path, &notifier)?;
        }

        Commands::Source(SourceCommands::List) => {
            commands::list_sources(&config_path)?;
        }

        Commands::Prerelease => {
            commands::toggle_prerelease(&config_path, &notifier)?;
        }

        Commands::Reveal(args) => {
            commands::reveal_package(&config_path, &args.identifier, args.version.as_deref(), &notifier)?;
        }
    }

    Ok(())
}
