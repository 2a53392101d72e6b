//! A start directory, a [`Layout`] and a filesystem bundled together.
//!
//! ```no_run
//! use extension_dirs::{ExtensionIdentity, Locator};
//!
//! let locator = Locator::from_start_dir()?;
//! let widget = ExtensionIdentity::new("Acme", "Widget");
//! let data = locator.data_path(&widget, 42, false)?;
//! # Ok::<(), extension_dirs::Error>(())
//! ```

use crate::config::MarkerConfig;
use crate::data_dir;
use crate::error::Result;
use crate::fs::{AsyncFileSystem, FileSystem, StdFs, TokioFs};
use crate::identity::{ExtensionIdentity, NetworkId};
use crate::layout::Layout;
use crate::resolver::{self, ResolvedFolder};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Locator<F = StdFs> {
    start_dir: PathBuf,
    layout: Layout,
    fs: F,
}

impl Locator<StdFs> {
    /// Blocking locator rooted at `start_dir`.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(start_dir, StdFs)
    }

    /// Blocking locator rooted at [`crate::start_dir`].
    pub fn from_start_dir() -> Result<Self> {
        Ok(Self::new(crate::start_dir()?))
    }
}

impl Locator<TokioFs> {
    /// Async locator rooted at `start_dir`.
    pub fn new_async(start_dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(start_dir, TokioFs)
    }

    /// Async locator rooted at [`crate::start_dir`].
    pub fn from_start_dir_async() -> Result<Self> {
        Ok(Self::new_async(crate::start_dir()?))
    }
}

impl<F> Locator<F> {
    /// A relative `start_dir` is taken from the current directory at the
    /// time each lookup runs.
    pub fn with_fs(start_dir: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            start_dir: start_dir.into(),
            layout: Layout::default(),
            fs,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the layout with one read by [`Layout::load`].
    pub fn with_layout_file(self, path: &Path) -> Result<Self> {
        Ok(self.with_layout(Layout::load(path)?))
    }

    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl<F: FileSystem> Locator<F> {
    /// Whether the marker at `marker_path` names `identity`.
    pub fn marker_matches(&self, marker_path: &Path, identity: &ExtensionIdentity) -> Result<bool> {
        resolver::marker_matches(&self.fs, marker_path, identity)
    }

    pub fn locate(&self, identity: &ExtensionIdentity) -> Result<ResolvedFolder> {
        resolver::locate(&self.fs, &self.start_dir, identity, &self.layout)
    }

    /// Installation folder of `identity`, or the start directory if none is found.
    pub fn resolve_folder(&self, identity: &ExtensionIdentity) -> Result<PathBuf> {
        self.locate(identity).map(ResolvedFolder::into_path)
    }

    /// The matching marker file's contents, `None` if no folder matched.
    pub fn marker_config(&self, identity: &ExtensionIdentity) -> Result<Option<MarkerConfig>> {
        Ok(self.locate(identity)?.config)
    }

    pub fn data_path(
        &self,
        identity: &ExtensionIdentity,
        network_id: impl Into<NetworkId>,
        skip_create: bool,
    ) -> Result<PathBuf> {
        data_dir::derive_data_path(
            &self.fs,
            &self.start_dir,
            identity,
            &network_id.into(),
            &self.layout,
            skip_create,
        )
    }
}

impl<F: AsyncFileSystem> Locator<F> {
    pub async fn marker_matches_async(
        &self,
        marker_path: &Path,
        identity: &ExtensionIdentity,
    ) -> Result<bool> {
        resolver::marker_matches_async(&self.fs, marker_path, identity).await
    }

    pub async fn locate_async(&self, identity: &ExtensionIdentity) -> Result<ResolvedFolder> {
        resolver::locate_async(&self.fs, &self.start_dir, identity, &self.layout).await
    }

    pub async fn resolve_folder_async(&self, identity: &ExtensionIdentity) -> Result<PathBuf> {
        self.locate_async(identity).await.map(ResolvedFolder::into_path)
    }

    pub async fn marker_config_async(
        &self,
        identity: &ExtensionIdentity,
    ) -> Result<Option<MarkerConfig>> {
        Ok(self.locate_async(identity).await?.config)
    }

    pub async fn data_path_async(
        &self,
        identity: &ExtensionIdentity,
        network_id: impl Into<NetworkId>,
        skip_create: bool,
    ) -> Result<PathBuf> {
        let network_id = network_id.into();
        data_dir::derive_data_path_async(
            &self.fs,
            &self.start_dir,
            identity,
            &network_id,
            &self.layout,
            skip_create,
        )
        .await
    }
}
