//! Resolved package descriptors: the plain data handed from the resolvers to
//! presentation and install.

use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;

/// Built-in icon shown for packages that do not ship one.
pub const DEFAULT_ICON: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHZpZXdCb3g9IjAgMCAxMjggMTI4Ij48cmVjdCB3aWR0aD0iMTI4IiBoZWlnaHQ9IjEyOCIgcng9IjE2IiBmaWxsPSIjNkI3MjgwIi8+PHBhdGggZD0iTTQwIDQwaDIwdjIwSDQwek02OCA0MGgyMHYyMEg2OHpNNDAgNjhoMjB2MjBINDB6TTY4IDY4aDIwdjIwSDY4eiIgZmlsbD0iI0ZGRiIvPjwvc3ZnPg==";

/// Where a descriptor was resolved from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackageOrigin {
    Remote { base_url: String },
    Directory(PathBuf),
}

impl PackageOrigin {
    pub fn is_remote(&self) -> bool {
        matches!(self, PackageOrigin::Remote { .. })
    }
}

/// Readme content. Directory packages carry the markdown itself; catalog
/// packages carry a path that is fetched when the readme is displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Readme {
    Inline(String),
    Remote(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icon {
    /// Image decoded from the archive, as a `data:` URI.
    DataUri(String),
    /// Image served by the catalog.
    Url(String),
    Placeholder,
}

impl Icon {
    /// Image source suitable for rendering; never empty.
    pub fn src(&self) -> &str {
        match self {
            Icon::DataUri(uri) | Icon::Url(uri) => uri,
            Icon::Placeholder => DEFAULT_ICON,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// `publisher.name`
    pub identifier: String,
    pub version: String,
    pub target: String,
    pub display_name: String,
    pub description: String,
    pub origin: PackageOrigin,
    /// Artifact to install: URL or filesystem path.
    pub location: String,
    pub readme: Readme,
    pub icon: Icon,
    pub is_pre_release: bool,
    pub is_preview: bool,
}

impl PackageDescriptor {
    /// Empty for catalog packages, the source directory otherwise.
    pub fn source_label(&self) -> String {
        match &self.origin {
            PackageOrigin::Remote { .. } => String::new(),
            PackageOrigin::Directory(dir) => dir.display().to_string(),
        }
    }

    pub fn is_platform_neutral(&self) -> bool {
        is_neutral_target(&self.target)
    }

    /// Archive path for directory packages.
    pub fn archive_path(&self) -> Option<&Path> {
        match self.origin {
            PackageOrigin::Directory(_) => Some(Path::new(&self.location)),
            PackageOrigin::Remote { .. } => None,
        }
    }

    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.identifier.clone(),
            self.version.clone(),
            self.target.clone(),
        )
    }

    pub fn semver(&self) -> Option<Version> {
        Version::parse(self.version.trim().trim_start_matches('v')).ok()
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.identifier, self.version)?;
        if !self.is_platform_neutral() {
            write!(f, " ({})", self.target)?;
        }
        if self.is_pre_release {
            write!(f, " [pre-release]")?;
        }
        Ok(())
    }
}

pub fn is_neutral_target(target: &str) -> bool {
    let target = target.trim();
    target.is_empty() || target.eq_ignore_ascii_case("any") || target.eq_ignore_ascii_case("neutral")
}
