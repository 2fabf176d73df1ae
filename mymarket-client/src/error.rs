//! Error taxonomy shared by the resolution pipeline and the install executor.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PkgError>;

#[derive(Debug, Error, Diagnostic)]
pub enum PkgError {
    #[error("package source {} is unavailable: {source}", path.display())]
    #[diagnostic(code(mymarket::source_unavailable))]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest in {origin}: {message}")]
    #[diagnostic(code(mymarket::manifest))]
    MalformedManifest { origin: String, message: String },

    #[error("archive {} has no entry `{entry}`", archive.display())]
    #[diagnostic(code(mymarket::archive::entry))]
    EntryNotFound { archive: PathBuf, entry: String },

    #[error("request to {url} failed: {message}")]
    #[diagnostic(code(mymarket::network))]
    NetworkFailure { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    #[diagnostic(code(mymarket::network::status))]
    NonSuccessStatus { url: String, status: u16 },

    #[error("failed to install {identifier}: {message}")]
    #[diagnostic(code(mymarket::install))]
    InstallError { identifier: String, message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(mymarket::config))]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(mymarket::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PkgError {
    pub(crate) fn malformed(origin: impl Into<String>, message: impl Into<String>) -> Self {
        PkgError::MalformedManifest {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PkgError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn network(url: impl Into<String>, err: &reqwest::Error) -> Self {
        PkgError::NetworkFailure {
            url: url.into(),
            message: err.to_string(),
        }
    }
}
