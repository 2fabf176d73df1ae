//! Package sources.
//!
//! Every source produces an ordered list of descriptors and never fails to
//! its caller: per-item problems are logged and skipped, source-level
//! problems are reported through the [`Notifier`].

pub mod directory;
pub mod remote;

use crate::descriptor::PackageDescriptor;
use crate::notify::Notifier;

pub use directory::DirectorySource;
pub use remote::RemoteSource;

pub trait PackageSource {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn resolve(&self, notifier: &dyn Notifier) -> Vec<PackageDescriptor>;
}
