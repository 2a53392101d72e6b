//! `extension_dirs` — Locate an extension's installation folder and data directory.
//!
//! Provides:
//! - `config` — The `extension.config.json` marker file and identity matching
//! - `resolver` — Upward search from a start directory for a matching marker
//! - `data_dir` — Derive and create `extensions-data/<company>-<name>/<network>`
//! - `locator` — Start directory, layout and filesystem bundled together
//! - `fs` — Blocking (`std::fs`) and async (`tokio::fs`) filesystem adapters
//!
//! The free functions below start from [`start_dir()`]; the [`nonblocking`]
//! module has async twins with identical semantics.

use std::path::{Path, PathBuf};

pub mod config;
pub mod data_dir;
pub mod error;
pub mod fs;
pub mod identity;
pub mod layout;
pub mod locator;
pub mod resolver;

pub use config::{MarkerConfig, MarkerProbe};
pub use error::{Error, ErrorKind, Result};
pub use fs::{AsyncFileSystem, FileSystem, StdFs, TokioFs};
pub use identity::{ExtensionIdentity, NetworkId};
pub use layout::Layout;
pub use locator::Locator;
pub use resolver::ResolvedFolder;

/// Marker file at the root of an extension's installation folder.
pub const MARKER_FILE_NAME: &str = "extension.config.json";

/// Shared container directory extensions may be installed into.
pub const CONTAINER_DIR_NAME: &str = "extensions";

/// Top-level directory holding all per-extension data.
pub const DATA_DIR_NAME: &str = "extensions-data";

/// Environment variable to override the directory resolution starts from.
pub const START_DIR_ENV: &str = "EXTENSION_DIRS_START_DIR";

/// Directory the upward search starts from, always absolute.
/// Respects `EXTENSION_DIRS_START_DIR` (relative values are taken from the
/// current directory), otherwise the current working directory.
pub fn start_dir() -> Result<PathBuf> {
    if let Some(override_path) = std::env::var_os(START_DIR_ENV).filter(|v| !v.is_empty()) {
        return resolver::absolute_start(Path::new(&override_path));
    }
    std::env::current_dir().map_err(Error::CurrentDir)
}

/// Whether the marker file at `marker_path` names `identity`.
pub fn marker_matches(marker_path: &Path, identity: &ExtensionIdentity) -> Result<bool> {
    resolver::marker_matches(&StdFs, marker_path, identity)
}

/// Installation folder of `identity`, falling back to [`start_dir()`].
pub fn resolve_folder(identity: &ExtensionIdentity) -> Result<PathBuf> {
    identity.validate()?;
    Locator::from_start_dir()?.resolve_folder(identity)
}

/// Contents of `identity`'s marker file, or `None` when no folder matches.
pub fn read_marker_config(identity: &ExtensionIdentity) -> Result<Option<MarkerConfig>> {
    identity.validate()?;
    Locator::from_start_dir()?.marker_config(identity)
}

/// Data directory for `identity` on `network_id`, created unless `skip_create`.
pub fn derive_data_path(
    identity: &ExtensionIdentity,
    network_id: impl Into<NetworkId>,
    skip_create: bool,
) -> Result<PathBuf> {
    let network_id = network_id.into();
    identity.validate()?;
    network_id.validate()?;
    Locator::from_start_dir()?.data_path(identity, network_id, skip_create)
}

/// Async entry points backed by `tokio::fs`.
pub mod nonblocking {
    use super::*;

    pub async fn marker_matches(marker_path: &Path, identity: &ExtensionIdentity) -> Result<bool> {
        resolver::marker_matches_async(&TokioFs, marker_path, identity).await
    }

    pub async fn resolve_folder(identity: &ExtensionIdentity) -> Result<PathBuf> {
        identity.validate()?;
        Locator::from_start_dir_async()?
            .resolve_folder_async(identity)
            .await
    }

    pub async fn read_marker_config(identity: &ExtensionIdentity) -> Result<Option<MarkerConfig>> {
        identity.validate()?;
        Locator::from_start_dir_async()?
            .marker_config_async(identity)
            .await
    }

    pub async fn derive_data_path(
        identity: &ExtensionIdentity,
        network_id: impl Into<NetworkId>,
        skip_create: bool,
    ) -> Result<PathBuf> {
        let network_id = network_id.into();
        identity.validate()?;
        network_id.validate()?;
        Locator::from_start_dir_async()?
            .data_path_async(identity, network_id, skip_create)
            .await
    }
}
