//! Install executor.
//!
//! The artifact is staged in a scratch directory (downloaded when the
//! location is a URL, copied otherwise), handed to the host installer, and the
//! staged copy is removed whatever the outcome.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use reqwest::blocking::Client;

use crate::error::{PkgError, Result};
use crate::notify::Notifier;
use crate::url::{file_name_of, is_http};

/// Host-provided "install extension" operation.
pub trait HostInstaller {
    fn install(&self, artifact: &Path) -> std::result::Result<(), String>;
}

/// Runs an external command with the artifact path appended, e.g.
/// `code --install-extension <artifact>`.
#[derive(Clone, Debug)]
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
}

impl CommandInstaller {
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| PkgError::Config("install command is empty".to_string()))?;
        Ok(CommandInstaller {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl HostInstaller for CommandInstaller {
    fn install(&self, artifact: &Path) -> std::result::Result<(), String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(artifact)
            .output()
            .map_err(|e| format!("could not run `{}`: {e}", self.program))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!(
            "`{}` exited with {}: {}",
            self.program,
            output.status,
            stderr.trim()
        ))
    }
}

/// Removes the staged artifact when dropped.
struct ScratchFile {
    path: PathBuf,
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove {}: {err}", self.path.display());
            }
        }
    }
}

pub struct Installer {
    scratch_dir: PathBuf,
    client: Client,
    host: Box<dyn HostInstaller>,
}

impl Installer {
    pub fn new(scratch_dir: PathBuf, client: Client, host: Box<dyn HostInstaller>) -> Self {
        Installer {
            scratch_dir,
            client,
            host,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Install `identifier` from `location` and tell the user how it went.
    pub fn install(&self, identifier: &str, location: &str, notifier: &dyn Notifier) -> Result<()> {
        tracing::info!("installing {identifier} from {location}");

        match self.stage_and_install(identifier, location) {
            Ok(()) => {
                tracing::info!("installed {identifier}");
                notifier.info(&format!("Installed {identifier}"));
                Ok(())
            }
            Err(err) => {
                tracing::warn!("{err}");
                notifier.error(&format!("Failed to install {identifier} with error {err}"));
                Err(err)
            }
        }
    }

    fn stage_and_install(&self, identifier: &str, location: &str) -> Result<()> {
        fs::create_dir_all(&self.scratch_dir).map_err(|e| PkgError::io(&self.scratch_dir, e))?;

        let file_name = file_name_of(location).ok_or_else(|| PkgError::InstallError {
            identifier: identifier.to_string(),
            message: format!("cannot derive a file name from `{location}`"),
        })?;
        let scratch_path = self.scratch_dir.join(file_name);

        if !is_http(location) {
            let source = Path::new(location.strip_prefix("file://").unwrap_or(location));
            if same_file(source, &scratch_path) {
                // Already where it would be staged; the user's file must survive.
                tracing::debug!("{} is inside the scratch directory, installing in place", source.display());
                return self.hand_to_host(identifier, source);
            }
        }

        let staged = ScratchFile { path: scratch_path };
        if is_http(location) {
            self.download(location, &staged.path)?;
        } else {
            let source = Path::new(location.strip_prefix("file://").unwrap_or(location));
            fs::copy(source, &staged.path).map_err(|e| PkgError::io(source, e))?;
        }
        tracing::debug!("staged {} at {}", identifier, staged.path.display());

        self.hand_to_host(identifier, &staged.path)
    }

    fn hand_to_host(&self, identifier: &str, artifact: &Path) -> Result<()> {
        self.host
            .install(artifact)
            .map_err(|message| PkgError::InstallError {
                identifier: identifier.to_string(),
                message,
            })
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| PkgError::network(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PkgError::NonSuccessStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = fs::File::create(dest).map_err(|e| PkgError::io(dest, e))?;
        response
            .copy_to(&mut file)
            .map_err(|e| PkgError::network(url, &e))?;
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
