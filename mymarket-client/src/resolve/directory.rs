use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::PackageArchive;
use crate::descriptor::PackageDescriptor;
use crate::error::{PkgError, Result};
use crate::normalize::{DescriptorSet, describe_archive};
use crate::notify::Notifier;
use crate::resolve::PackageSource;

pub const ARCHIVE_EXTENSION: &str = "vsix";

/// Scans local directories for `.vsix` archives.
#[derive(Clone, Debug, Default)]
pub struct DirectorySource {
    dirs: Vec<PathBuf>,
}

impl DirectorySource {
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        DirectorySource {
            dirs: dirs.into_iter().collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn scan_dir(&self, dir: &Path, found: &mut DescriptorSet) -> Result<()> {
        for path in list_archives(dir)? {
            let described = PackageArchive::open(&path)
                .and_then(|mut archive| describe_archive(&mut archive, dir));
            match described {
                Ok(descriptor) => {
                    found.insert(descriptor);
                }
                Err(err) => {
                    tracing::warn!("skipping {}: {err}", path.display());
                }
            }
        }
        Ok(())
    }
}

impl PackageSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    fn resolve(&self, notifier: &dyn Notifier) -> Vec<PackageDescriptor> {
        let mut found = DescriptorSet::new();

        for dir in &self.dirs {
            if let Err(err) = self.scan_dir(dir, &mut found) {
                tracing::warn!("{err}");
                notifier.error(&err.to_string());
            }
        }

        tracing::info!(
            "resolved {} package(s) from {} director{}",
            found.len(),
            self.dirs.len(),
            if self.dirs.len() == 1 { "y" } else { "ies" }
        );
        found.into_vec()
    }
}

/// Archive files directly inside `dir`, sorted by file name.
pub fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let unavailable = |source: std::io::Error| PkgError::SourceUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    let mut archives = Vec::new();
    for entry in fs::read_dir(dir).map_err(unavailable)? {
        let path = entry.map_err(unavailable)?.path();
        let is_archive = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
        if is_archive && path.is_file() {
            archives.push(path);
        }
    }

    archives.sort();
    Ok(archives)
}
