//! Reveal a package archive in the platform file manager.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{PkgError, Result};

/// Command line that opens the file manager at `path`.
pub fn reveal_command(path: &Path) -> (String, Vec<String>) {
    let path_arg = path.display().to_string();
    if cfg!(windows) {
        ("explorer".to_string(), vec![format!("/select,{path_arg}")])
    } else if cfg!(target_os = "macos") {
        ("open".to_string(), vec!["-R".to_string(), path_arg])
    } else {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ("xdg-open".to_string(), vec![dir.display().to_string()])
    }
}

pub fn reveal_in_os(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PkgError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        ));
    }

    let (program, args) = reveal_command(path);
    tracing::debug!("revealing {} with {program}", path.display());
    Command::new(&program)
        .args(&args)
        .spawn()
        .map_err(|e| PkgError::io(path, e))?;
    Ok(())
}
