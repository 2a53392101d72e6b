//! Upward search for an extension's installation folder.
//!
//! Starting at a directory, each level is checked for a marker file whose `id`
//! matches the requested extension. The first match wins. When the filesystem
//! root is passed without a match, the result falls back to the start
//! directory, never the root.
//!
//! The walk itself is `FolderWalk`, a small state machine that never does
//! I/O. [`locate`] and [`locate_async`] only feed it marker contents, so both
//! probe the same directories in the same order.
//!
//! A relative start directory is first made absolute against the current
//! directory and lexically normalised, so the walk always climbs real
//! ancestors up to the root.

use crate::config::{self, MarkerConfig, MarkerProbe};
use crate::error::{Error, Result};
use crate::fs::{AsyncFileSystem, FileSystem};
use crate::identity::ExtensionIdentity;
use crate::layout::Layout;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Outcome of a folder resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFolder {
    /// Directory holding the matching marker, or the start directory on fallback.
    pub path: PathBuf,
    /// The matching marker; `None` on fallback.
    pub config: Option<MarkerConfig>,
}

impl ResolvedFolder {
    /// True when no matching marker was found and `path` is the start directory.
    pub fn is_fallback(&self) -> bool {
        self.config.is_none()
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

pub(crate) struct FolderWalk<'a> {
    start: &'a Path,
    current: PathBuf,
    identity: &'a ExtensionIdentity,
    marker_file_name: &'a str,
    depth: usize,
}

impl<'a> FolderWalk<'a> {
    pub(crate) fn new(start: &'a Path, identity: &'a ExtensionIdentity, layout: &'a Layout) -> Self {
        Self {
            start,
            current: start.to_path_buf(),
            identity,
            marker_file_name: &layout.marker_file_name,
            depth: 0,
        }
    }

    /// Marker path to probe at the current level.
    pub(crate) fn marker_path(&self) -> PathBuf {
        self.current.join(self.marker_file_name)
    }

    /// Consume the contents read at [`Self::marker_path`]. Returns the result
    /// once the walk is over, `None` after ascending one level.
    pub(crate) fn step(&mut self, marker: &Path, contents: Option<&[u8]>) -> Option<ResolvedFolder> {
        if let MarkerProbe::Match(config) = log_probe(marker, config::probe(contents, self.identity)) {
            debug!(
                extension = %self.identity,
                folder = %self.current.display(),
                depth = self.depth,
                "resolved extension folder"
            );
            return Some(ResolvedFolder {
                path: self.current.clone(),
                config: Some(config),
            });
        }

        match self.current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                self.current = parent.to_path_buf();
                self.depth += 1;
                None
            }
            _ => {
                info!(
                    extension = %self.identity,
                    start = %self.start.display(),
                    "no extension marker found up to the filesystem root, using start directory"
                );
                Some(ResolvedFolder {
                    path: self.start.to_path_buf(),
                    config: None,
                })
            }
        }
    }
}

fn log_probe(marker: &Path, probe: MarkerProbe) -> MarkerProbe {
    match &probe {
        MarkerProbe::Absent => trace!(path = %marker.display(), "no marker file"),
        MarkerProbe::Malformed(reason) => {
            warn!(path = %marker.display(), error = %reason, "ignoring malformed marker file")
        }
        MarkerProbe::Unidentified => debug!(path = %marker.display(), "marker file has no usable id"),
        MarkerProbe::Foreign(other) => {
            debug!(path = %marker.display(), found = %other, "marker belongs to another extension")
        }
        MarkerProbe::Match(_) => {}
    }
    probe
}

/// Make `path` absolute against the current directory and drop `.` and `..`
/// components, so that every `parent()` is a real ancestor.
pub fn absolute_start(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_err(Error::CurrentDir)?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

fn read_error(path: PathBuf) -> impl FnOnce(std::io::Error) -> Error {
    move |source| Error::ReadMarker { path, source }
}

/// Check whether the marker file at `marker_path` names `identity`.
///
/// An absent or malformed file is `Ok(false)`. A file that exists but can't be
/// read is an error.
pub fn marker_matches<F: FileSystem + ?Sized>(
    fs: &F,
    marker_path: &Path,
    identity: &ExtensionIdentity,
) -> Result<bool> {
    identity.validate()?;
    let contents = fs
        .read_file(marker_path)
        .map_err(read_error(marker_path.to_path_buf()))?;
    Ok(log_probe(marker_path, config::probe(contents.as_deref(), identity)).is_match())
}

/// Async form of [`marker_matches`].
pub async fn marker_matches_async<F: AsyncFileSystem + ?Sized>(
    fs: &F,
    marker_path: &Path,
    identity: &ExtensionIdentity,
) -> Result<bool> {
    identity.validate()?;
    let contents = fs
        .read_file(marker_path)
        .await
        .map_err(read_error(marker_path.to_path_buf()))?;
    Ok(log_probe(marker_path, config::probe(contents.as_deref(), identity)).is_match())
}

/// Walk upward from `start` looking for `identity`'s marker file.
pub fn locate<F: FileSystem + ?Sized>(
    fs: &F,
    start: &Path,
    identity: &ExtensionIdentity,
    layout: &Layout,
) -> Result<ResolvedFolder> {
    identity.validate()?;
    layout.validate()?;
    let start = absolute_start(start)?;
    let mut walk = FolderWalk::new(&start, identity, layout);
    loop {
        let marker = walk.marker_path();
        let contents = fs.read_file(&marker).map_err(read_error(marker.clone()))?;
        if let Some(resolved) = walk.step(&marker, contents.as_deref()) {
            return Ok(resolved);
        }
    }
}

/// Async form of [`locate`]; yields only while reading marker files.
pub async fn locate_async<F: AsyncFileSystem + ?Sized>(
    fs: &F,
    start: &Path,
    identity: &ExtensionIdentity,
    layout: &Layout,
) -> Result<ResolvedFolder> {
    identity.validate()?;
    layout.validate()?;
    let start = absolute_start(start)?;
    let mut walk = FolderWalk::new(&start, identity, layout);
    loop {
        let marker = walk.marker_path();
        let contents = fs
            .read_file(&marker)
            .await
            .map_err(read_error(marker.clone()))?;
        if let Some(resolved) = walk.step(&marker, contents.as_deref()) {
            return Ok(resolved);
        }
    }
}
