/// Command handlers for the mymarket subcommands.
///
/// Each handler loads the configuration at `config_path`, does its work, and
/// reports through the given notifier. Argument parsing lives in `cli`.

use std::path::Path;

use miette::Report;

use crate::config::ConfigManager;
use crate::descriptor::PackageDescriptor;
use crate::detail::DetailPanel;
use crate::install::{CommandInstaller, Installer};
use crate::notify::Notifier;
use crate::resolve::remote::fetch_readme;
use crate::reveal::reveal_in_os;
use crate::{Market, SourceFilter, select_package};

pub type CmdError = Report;

fn cmd_msg(message: impl Into<String>) -> CmdError {
    Report::msg(message.into())
}

/// List packages from the configured sources
pub fn list_packages(
    config_path: &Path,
    filter: SourceFilter,
    notifier: &dyn Notifier,
) -> Result<Vec<PackageDescriptor>, CmdError> {
    let manager = ConfigManager::load(config_path.to_path_buf())?;
    let config = manager.config();
    if config.primary_api_source().is_none() && config.directory_sources.is_empty() {
        notifier.info("No sources configured. Add one with `mymarket source add-api <url>` or `mymarket source add-dir <path>`");
        return Ok(Vec::new());
    }

    let packages = Market::from_config(config)?.resolve(filter, notifier);
    if packages.is_empty() {
        println!("No packages found");
    }
    for package in &packages {
        let source = package.source_label();
        if source.is_empty() {
            println!("{package}");
        } else {
            println!("{package}  [{source}]");
        }
    }
    Ok(packages)
}

/// Render the detail view of one package, readme included
pub fn show_package(
    config_path: &Path,
    identifier: &str,
    version: Option<&str>,
    target: Option<&str>,
    notifier: &dyn Notifier,
) -> Result<String, CmdError> {
    let manager = ConfigManager::load(config_path.to_path_buf())?;
    let market = Market::from_config(manager.config())?;
    let packages = market.resolve(SourceFilter::All, notifier);
    let package = select_package(&packages, identifier, version, target)
        .ok_or_else(|| not_found(identifier, version, target))?;

    let readme = match fetch_readme(market.client(), package) {
        Ok(readme) => readme,
        Err(err) => {
            tracing::warn!("readme for {} unavailable: {err}", package.identifier);
            String::new()
        }
    };

    let mut panel = DetailPanel::new();
    panel.show(package.clone());
    let text = panel
        .render(&readme)
        .ok_or_else(|| cmd_msg("Nothing to display"))?;
    println!("{text}");
    Ok(text)
}

/// Resolve a package and hand it to the editor
pub fn install_package(
    config_path: &Path,
    identifier: &str,
    version: Option<&str>,
    target: Option<&str>,
    notifier: &dyn Notifier,
) -> Result<(), CmdError> {
    let manager = ConfigManager::load(config_path.to_path_buf())?;
    let config = manager.config();
    let market = Market::from_config(config)?;
    let packages = market.resolve(SourceFilter::All, notifier);
    let package = select_package(&packages, identifier, version, target)
        .ok_or_else(|| not_found(identifier, version, target))?;

    let host = CommandInstaller::new(&config.install.command)?;
    let installer = Installer::new(config.scratch_dir()?, market.client().clone(), Box::new(host));
    installer.install(&package.identifier, &package.location, notifier)?;
    Ok(())
}

/// Add a catalog base URL
pub fn add_api_source(config_path: &Path, url: &str, notifier: &dyn Notifier) -> Result<bool, CmdError> {
    if !crate::url::is_http(url.trim()) {
        return Err(cmd_msg(format!("'{}' is not an http(s) URL", url.trim())));
    }

    let mut manager = ConfigManager::load(config_path.to_path_buf())?;
    if !manager.config_mut().add_api_source(url) {
        notifier.error(&format!("Source {} already exists", url.trim()));
        return Ok(false);
    }
    manager.save()?;
    notifier.info(&format!("Added catalog {}", url.trim()));
    Ok(true)
}

/// Add a directory of vsix archives
pub fn add_directory_source(config_path: &Path, dir: &Path, notifier: &dyn Notifier) -> Result<bool, CmdError> {
    if !dir.is_dir() {
        return Err(cmd_msg(format!("'{}' is not a directory", dir.display())));
    }

    let mut manager = ConfigManager::load(config_path.to_path_buf())?;
    if !manager.config_mut().add_directory_source(dir) {
        notifier.error(&format!("Source {} already exists", dir.display()));
        return Ok(false);
    }
    manager.save()?;
    notifier.info(&format!("Added directory {}", dir.display()));
    Ok(true)
}

/// Print the configured sources
pub fn list_sources(config_path: &Path) -> Result<(), CmdError> {
    let manager = ConfigManager::load(config_path.to_path_buf())?;
    let config = manager.config();

    println!("Sources in {}", manager.path().display());
    println!();
    println!("[api]");
    for (index, url) in config.api_sources.iter().enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        println!("{marker} {url}");
    }
    println!();
    println!("[directories]");
    for dir in &config.directory_sources {
        println!("  {}", dir.display());
    }
    println!();
    println!("prerelease = {}", config.prerelease);
    Ok(())
}

/// Flip the prerelease flag and persist it
pub fn toggle_prerelease(config_path: &Path, notifier: &dyn Notifier) -> Result<bool, CmdError> {
    let mut manager = ConfigManager::load(config_path.to_path_buf())?;
    let enabled = manager.config_mut().toggle_prerelease();
    manager.save()?;
    notifier.info(&format!(
        "Pre-release packages {}",
        if enabled { "enabled" } else { "disabled" }
    ));
    Ok(enabled)
}

/// Open the file manager at a directory package's archive
pub fn reveal_package(
    config_path: &Path,
    identifier: &str,
    version: Option<&str>,
    notifier: &dyn Notifier,
) -> Result<(), CmdError> {
    let manager = ConfigManager::load(config_path.to_path_buf())?;
    let packages = Market::from_config(manager.config())?.resolve(SourceFilter::Directories, notifier);
    let package = select_package(&packages, identifier, version, None)
        .ok_or_else(|| not_found(identifier, version, None))?;
    let archive = package
        .archive_path()
        .ok_or_else(|| cmd_msg(format!("{} is not a directory package", package.identifier)))?;

    reveal_in_os(archive)?;
    Ok(())
}

fn not_found(identifier: &str, version: Option<&str>, target: Option<&str>) -> CmdError {
    let mut message = format!("Package '{identifier}'");
    if let Some(version) = version {
        message.push_str(&format!(" v{version}"));
    }
    if let Some(target) = target {
        message.push_str(&format!(" ({target})"));
    }
    message.push_str(" not found in any configured source");
    cmd_msg(message)
}
