//! Remote catalog source.
//!
//! The catalog exposes `GET {base}/extension?prerelease={flag}`, answering
//! with a JSON array of packages. The whole source either resolves or yields
//! nothing; there is no partial result.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::descriptor::{PackageDescriptor, PackageOrigin, Readme};
use crate::error::{PkgError, Result};
use crate::normalize::describe_catalog_entry;
use crate::notify::Notifier;
use crate::resolve::PackageSource;
use crate::url::{catalog_endpoint, join_url};

const USER_AGENT: &str = concat!("mymarket/", env!("CARGO_PKG_VERSION"));

/// One record of the catalog listing.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogEntry {
    pub identifier: String,
    pub version: String,
    #[serde(default)]
    pub extensions: Vec<CatalogExtension>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogExtension {
    pub publisher: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub target: Option<String>,
    pub location: Option<String>,
    pub icon_path: Option<String>,
    pub readme_path: Option<String>,
    pub is_pre_release: bool,
    pub preview: bool,
}

pub fn http_client(timeout_secs: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = timeout_secs.filter(|secs| *secs > 0) {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| PkgError::Config(format!("failed to build HTTP client: {e}")))
}

pub struct RemoteSource {
    base_url: Option<String>,
    prerelease: bool,
    client: Client,
}

impl RemoteSource {
    pub fn new(base_url: Option<String>, prerelease: bool, client: Client) -> Self {
        RemoteSource {
            base_url: base_url.filter(|url| !url.trim().is_empty()),
            prerelease,
            client,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn fetch_catalog(&self, base_url: &str) -> Result<Vec<CatalogEntry>> {
        let url = catalog_endpoint(base_url, self.prerelease);
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| PkgError::network(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PkgError::NonSuccessStatus {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<CatalogEntry>>()
            .map_err(|e| PkgError::network(&url, &e))
    }
}

impl PackageSource for RemoteSource {
    fn name(&self) -> &str {
        "catalog"
    }

    fn resolve(&self, notifier: &dyn Notifier) -> Vec<PackageDescriptor> {
        let Some(base_url) = self.base_url.as_deref() else {
            return Vec::new();
        };

        let entries = match self.fetch_catalog(base_url) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("{err}");
                notifier.error(&format!(
                    "There was a problem connecting to {}, please re-validate the source or remove it from settings ({err})",
                    catalog_endpoint(base_url, self.prerelease)
                ));
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut descriptors = Vec::new();
        for entry in &entries {
            if !seen.insert(entry.identifier.as_str()) {
                tracing::debug!("skipping duplicate catalog entry {} v{}", entry.identifier, entry.version);
                continue;
            }
            match describe_catalog_entry(base_url, entry) {
                Some(descriptor) => descriptors.push(descriptor),
                None => tracing::warn!("catalog entry {} has no extension data", entry.identifier),
            }
        }

        tracing::info!("resolved {} package(s) from {base_url}", descriptors.len());
        descriptors
    }
}

/// Markdown for a descriptor's readme. Catalog readmes are fetched relative to
/// the catalog base URL; inline readmes are returned as-is.
pub fn fetch_readme(client: &Client, descriptor: &PackageDescriptor) -> Result<String> {
    let path = match &descriptor.readme {
        Readme::Inline(text) => return Ok(text.clone()),
        Readme::Remote(path) if path.trim().is_empty() => return Ok(String::new()),
        Readme::Remote(path) => path,
    };
    let url = match &descriptor.origin {
        PackageOrigin::Remote { base_url } => join_url(base_url, path),
        PackageOrigin::Directory(_) => path.clone(),
    };

    let response = client
        .get(&url)
        .send()
        .map_err(|e| PkgError::network(&url, &e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(PkgError::NonSuccessStatus {
            url,
            status: status.as_u16(),
        });
    }
    response.text().map_err(|e| PkgError::network(&url, &e))
}
