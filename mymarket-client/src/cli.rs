/// Command-line interface for the private marketplace client.
///
/// Provides subcommands for:
/// - `mymarket list`: List packages from the configured sources
/// - `mymarket show`: Show the details of one package
/// - `mymarket install`: Install a package into the editor
/// - `mymarket source`: Manage catalog URLs and vsix directories
/// - `mymarket prerelease`: Toggle pre-release listings
/// - `mymarket reveal`: Reveal a local archive in the file manager

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Private extension marketplace client
#[derive(Parser, Debug)]
#[command(name = "mymarket")]
#[command(about = "Private Extension Marketplace", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the config file (defaults to ~/.mymarket/config.toml)
    #[arg(global = true, short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(global = true, long)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available packages
    List(ListArgs),

    /// Show package details and readme
    Show(PackageArgs),

    /// Install a package
    Install(PackageArgs),

    /// Manage package sources
    #[command(subcommand)]
    Source(SourceCommands),

    /// Toggle pre-release listings from the catalog
    Prerelease,

    /// Reveal a directory package in the file manager
    Reveal(RevealArgs),
}

/// Arguments for the `list` subcommand
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list catalog packages
    #[arg(long, conflicts_with = "dir")]
    pub api: bool,

    /// Only list directory packages
    #[arg(long)]
    pub dir: bool,
}

/// Arguments for `show` and `install`
#[derive(Parser, Debug)]
pub struct PackageArgs {
    /// Package identifier (`publisher.name`)
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// Exact version (defaults to the highest available)
    #[arg(short, long)]
    pub version: Option<String>,

    /// Platform target, e.g. `linux-x64`
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SourceCommands {
    /// Add a catalog base URL
    AddApi {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Add a directory of `.vsix` archives
    AddDir {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// List configured sources
    List,
}

/// Arguments for the `reveal` subcommand
#[derive(Parser, Debug)]
pub struct RevealArgs {
    /// Package identifier (`publisher.name`)
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// Exact version (defaults to the highest available)
    #[arg(short, long)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_command() {
        let args = vec!["mymarket", "list", "--dir"];
        let cli = Cli::try_parse_from(&args).unwrap();
        if let Commands::List(list_args) = cli.command {
            assert!(list_args.dir);
            assert!(!list_args.api);
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_list_filters_conflict() {
        let args = vec!["mymarket", "list", "--api", "--dir"];
        assert!(Cli::try_parse_from(&args).is_err());
    }

    #[test]
    fn test_parse_install_with_options() {
        let args = vec![
            "mymarket",
            "install",
            "acme.tool",
            "--version",
            "1.2.0",
            "--target",
            "linux-x64",
        ];
        let cli = Cli::try_parse_from(&args).unwrap();
        if let Commands::Install(install_args) = cli.command {
            assert_eq!(install_args.identifier, "acme.tool");
            assert_eq!(install_args.version, Some("1.2.0".to_string()));
            assert_eq!(install_args.target, Some("linux-x64".to_string()));
        } else {
            panic!("Expected Install command");
        }
    }

    #[test]
    fn test_parse_show_command() {
        let args = vec!["mymarket", "show", "acme.tool"];
        let cli = Cli::try_parse_from(&args).unwrap();
        if let Commands::Show(show_args) = cli.command {
            assert_eq!(show_args.identifier, "acme.tool");
            assert!(show_args.version.is_none());
        } else {
            panic!("Expected Show command");
        }
    }

    #[test]
    fn test_parse_source_commands() {
        let cli = Cli::try_parse_from(["mymarket", "source", "add-api", "https://m.example.com"]).unwrap();
        match cli.command {
            Commands::Source(SourceCommands::AddApi { url }) => assert_eq!(url, "https://m.example.com"),
            other => panic!("Expected source add-api, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["mymarket", "source", "add-dir", "/srv/vsix"]).unwrap();
        match cli.command {
            Commands::Source(SourceCommands::AddDir { path }) => assert_eq!(path, PathBuf::from("/srv/vsix")),
            other => panic!("Expected source add-dir, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_global_options() {
        let args = vec![
            "mymarket",
            "--verbose",
            "--config",
            "/etc/mymarket.toml",
            "prerelease",
        ];
        let cli = Cli::try_parse_from(&args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/mymarket.toml")));
        assert!(matches!(cli.command, Commands::Prerelease));
    }

    #[test]
    fn test_identifier_is_required() {
        assert!(Cli::try_parse_from(["mymarket", "install"]).is_err());
        assert!(Cli::try_parse_from(["mymarket", "reveal"]).is_err());
    }
}
