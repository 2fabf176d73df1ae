#![forbid(unsafe_code)]

use std::cmp::Ordering;

use reqwest::blocking::Client;

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod detail;
pub mod error;
pub mod install;
pub mod manifest;
pub mod normalize;
pub mod notify;
pub mod resolve;
pub mod reveal;
pub mod url;

pub use cli::{Cli, Commands};
pub use config::{ConfigManager, MarketConfig};
pub use descriptor::{Icon, PackageDescriptor, PackageOrigin, Readme};
pub use detail::DetailPanel;
pub use error::{PkgError, Result};
pub use install::{CommandInstaller, HostInstaller, Installer};
pub use notify::{ConsoleNotifier, Notifier, RecordingNotifier};
pub use resolve::{DirectorySource, PackageSource, RemoteSource};

/// Which configured sources to resolve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceFilter {
    #[default]
    All,
    Catalog,
    Directories,
}

/// The configured sources, ready to resolve.
pub struct Market {
    catalog: RemoteSource,
    directories: DirectorySource,
    client: Client,
}

impl Market {
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        let client = resolve::remote::http_client(Some(config.install.http_timeout))?;
        Ok(Market {
            catalog: RemoteSource::new(
                config.primary_api_source().map(str::to_string),
                config.prerelease,
                client.clone(),
            ),
            directories: DirectorySource::new(config.directory_sources.iter().cloned()),
            client,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Catalog packages first, then directory packages. Each source keeps its
    /// own de-duplication rule.
    pub fn resolve(&self, filter: SourceFilter, notifier: &dyn Notifier) -> Vec<PackageDescriptor> {
        let mut sources: Vec<&dyn PackageSource> = Vec::with_capacity(2);
        if filter != SourceFilter::Directories {
            sources.push(&self.catalog);
        }
        if filter != SourceFilter::Catalog {
            sources.push(&self.directories);
        }

        let mut found = Vec::new();
        for source in sources {
            tracing::debug!("resolving {} source", source.name());
            found.extend(source.resolve(notifier));
        }
        found
    }
}

/// Pick the package matching `identifier` (case-insensitive), optionally
/// pinned to a version and target. Without a pinned version the highest
/// semver wins; ties keep the earlier descriptor.
pub fn select_package<'a>(
    packages: &'a [PackageDescriptor],
    identifier: &str,
    version: Option<&str>,
    target: Option<&str>,
) -> Option<&'a PackageDescriptor> {
    packages
        .iter()
        .filter(|d| d.identifier.eq_ignore_ascii_case(identifier))
        .filter(|d| version.is_none_or(|v| d.version == v))
        .filter(|d| target.is_none_or(|t| d.target.eq_ignore_ascii_case(t)))
        .fold(None, |best: Option<&PackageDescriptor>, d| match best {
            Some(b) if compare_versions(d, b) != Ordering::Greater => Some(b),
            _ => Some(d),
        })
}

fn compare_versions(a: &PackageDescriptor, b: &PackageDescriptor) -> Ordering {
    match (a.semver(), b.semver()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.version.cmp(&b.version),
    }
}
