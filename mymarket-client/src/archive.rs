//! Read-only access to `.vsix` package archives.
//!
//! Entries are read straight out of the zip container; nothing is extracted
//! to disk.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{PkgError, Result};

/// Entry holding the plain JSON manifest.
pub const PACKAGE_JSON_ENTRY: &str = "extension/package.json";
/// Entry holding the rich XML manifest.
pub const VSIX_MANIFEST_ENTRY: &str = "extension.vsixmanifest";
/// Readme location used when no rich manifest declares one.
pub const DEFAULT_README_ENTRY: &str = "extension/README.md";
/// Largest entry read into memory.
pub const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

const INITIAL_ENTRY_CAPACITY: u64 = 64 * 1024;

pub struct PackageArchive {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl PackageArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PkgError::io(path, e))?;
        let zip = ZipArchive::new(file).map_err(|e| {
            PkgError::malformed(path.display().to_string(), format!("not a zip archive: {e}"))
        })?;
        Ok(PackageArchive {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_entry(&self, entry: &str) -> bool {
        self.zip.index_for_name(&normalize_entry(entry)).is_some()
    }

    pub fn read_binary(&mut self, entry: &str) -> Result<Vec<u8>> {
        let name = normalize_entry(entry);
        let mut file = match self.zip.by_name(&name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(PkgError::EntryNotFound {
                    archive: self.path.clone(),
                    entry: name,
                });
            }
            Err(e) => {
                return Err(PkgError::malformed(
                    self.path.display().to_string(),
                    format!("unreadable entry `{name}`: {e}"),
                ));
            }
        };

        // The declared size comes from the archive and is not trusted.
        let capacity = file.size().min(INITIAL_ENTRY_CAPACITY);
        read_limited(&mut file, capacity, MAX_ENTRY_BYTES)
            .map_err(|e| PkgError::io(self.path.join(&name), e))?
            .ok_or_else(|| {
                PkgError::malformed(
                    self.path.display().to_string(),
                    format!("entry `{name}` is larger than {MAX_ENTRY_BYTES} bytes"),
                )
            })
    }

    pub fn read_text(&mut self, entry: &str) -> Result<String> {
        let bytes = self.read_binary(entry)?;
        // Manifests written on Windows frequently carry a UTF-8 BOM.
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Read at most `limit` bytes; `None` when the reader holds more. `capacity`
/// is only a hint and never exceeds `limit`.
fn read_limited(reader: &mut impl Read, capacity: u64, limit: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::with_capacity(capacity.min(limit) as usize);
    reader.take(limit + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > limit {
        return Ok(None);
    }
    Ok(Some(buf))
}

/// Asset paths in manifests are written with either separator and sometimes a
/// leading slash; zip entry names use `/` and never start with one.
fn normalize_entry(entry: &str) -> String {
    entry.trim_start_matches(['/', '\\']).replace('\\', "/")
}
