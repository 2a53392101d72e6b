//! Per-extension, per-network data directory derivation.
//!
//! The data directory lives at
//! `<base>/<data_dir_name>/<company>-<name>/<network_id>`, where `<base>` is the
//! resolved installation folder. When that folder sits directly inside the
//! shared container directory (`extensions`), `<base>` is the container's
//! parent instead, so every extension installed there shares one data root:
//!
//! ```text
//! /opt/vendor/extensions/widget   ->  /opt/vendor/extensions-data/Acme-Widget/42
//! /home/user/proj                 ->  /home/user/proj/extensions-data/Acme-Widget/42
//! ```

use crate::error::{Error, Result};
use crate::fs::{AsyncFileSystem, FileSystem};
use crate::identity::{ExtensionIdentity, NetworkId};
use crate::layout::Layout;
use crate::resolver;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Folder the data directory is rooted at.
///
/// Only an exact one-level nesting under `container_dir_name` (compared
/// case-sensitively) moves the base; deeper nesting leaves `folder` as is.
pub fn data_path_base(folder: &Path, container_dir_name: &str) -> PathBuf {
    if let Some(up) = folder.parent() {
        if up.file_name().is_some_and(|name| name == container_dir_name) {
            if let Some(base) = up.parent() {
                return base.to_path_buf();
            }
        }
    }
    folder.to_path_buf()
}

/// Compose the data directory path for an already-resolved folder.
pub fn compose_data_path(
    folder: &Path,
    identity: &ExtensionIdentity,
    network_id: &NetworkId,
    layout: &Layout,
) -> PathBuf {
    data_path_base(folder, &layout.container_dir_name)
        .join(&layout.data_dir_name)
        .join(identity.data_folder_name())
        .join(network_id.as_str())
}

fn validate(identity: &ExtensionIdentity, network_id: &NetworkId) -> Result<()> {
    identity.validate()?;
    network_id.validate()
}

fn create_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    }
}

/// Resolve the extension folder from `start` and derive its data directory.
///
/// Unless `skip_create` is set, the full directory chain is created if
/// missing. Creating an existing directory is not an error.
pub fn derive_data_path<F: FileSystem + ?Sized>(
    fs: &F,
    start: &Path,
    identity: &ExtensionIdentity,
    network_id: &NetworkId,
    layout: &Layout,
    skip_create: bool,
) -> Result<PathBuf> {
    validate(identity, network_id)?;

    let folder = resolver::locate(fs, start, identity, layout)?;
    let path = compose_data_path(&folder.path, identity, network_id, layout);

    if skip_create {
        debug!(path = %path.display(), "skipping data directory creation");
    } else {
        fs.create_dir_all(&path).map_err(create_error(&path))?;
        debug!(path = %path.display(), "ensured data directory");
    }
    Ok(path)
}

/// Async form of [`derive_data_path`].
pub async fn derive_data_path_async<F: AsyncFileSystem + ?Sized>(
    fs: &F,
    start: &Path,
    identity: &ExtensionIdentity,
    network_id: &NetworkId,
    layout: &Layout,
    skip_create: bool,
) -> Result<PathBuf> {
    validate(identity, network_id)?;

    let folder = resolver::locate_async(fs, start, identity, layout).await?;
    let path = compose_data_path(&folder.path, identity, network_id, layout);

    if skip_create {
        debug!(path = %path.display(), "skipping data directory creation");
    } else {
        fs.create_dir_all(&path).await.map_err(create_error(&path))?;
        debug!(path = %path.display(), "ensured data directory");
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{StdFs, TokioFs};
    use std::io;

    const ACME: &str = r#"{"id": {"company": "Acme", "name": "Widget"}}"#;

    fn acme() -> ExtensionIdentity {
        ExtensionIdentity::new("Acme", "Widget")
    }

    /// Panics on any filesystem access.
    struct UntouchableFs;

    impl FileSystem for UntouchableFs {
        fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
            panic!("unexpected read of {}", path.display())
        }

        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            panic!("unexpected create of {}", path.display())
        }
    }

    #[test]
    fn test_base_inside_container() {
        assert_eq!(
            data_path_base(Path::new("/opt/vendor/extensions/myext"), "extensions"),
            PathBuf::from("/opt/vendor")
        );
    }

    #[test]
    fn test_base_outside_container() {
        assert_eq!(
            data_path_base(Path::new("/home/user/proj"), "extensions"),
            PathBuf::from("/home/user/proj")
        );
    }

    #[test]
    fn test_base_only_exact_one_level_nesting() {
        // two levels below the container: untouched
        assert_eq!(
            data_path_base(Path::new("/opt/extensions/group/myext"), "extensions"),
            PathBuf::from("/opt/extensions/group/myext")
        );
        // container name is case-sensitive
        assert_eq!(
            data_path_base(Path::new("/opt/Extensions/myext"), "extensions"),
            PathBuf::from("/opt/Extensions/myext")
        );
    }

    #[test]
    fn test_base_edge_paths() {
        assert_eq!(data_path_base(Path::new("/"), "extensions"), PathBuf::from("/"));
        assert_eq!(
            data_path_base(Path::new("/extensions/myext"), "extensions"),
            PathBuf::from("/")
        );
    }

    #[test]
    fn test_compose_examples() {
        let layout = Layout::default();
        let network = NetworkId::from(42);
        assert_eq!(
            compose_data_path(Path::new("/opt/vendor/extensions/myext"), &acme(), &network, &layout),
            PathBuf::from("/opt/vendor/extensions-data/Acme-Widget/42")
        );
        assert_eq!(
            compose_data_path(Path::new("/home/user/proj"), &acme(), &network, &layout),
            PathBuf::from("/home/user/proj/extensions-data/Acme-Widget/42")
        );
    }

    #[test]
    fn test_numeric_and_string_network_ids_agree() {
        let layout = Layout::default();
        let folder = Path::new("/srv/app");
        assert_eq!(
            compose_data_path(folder, &acme(), &NetworkId::from(7u32), &layout),
            compose_data_path(folder, &acme(), &NetworkId::from("7"), &layout)
        );
    }

    #[test]
    fn test_invalid_arguments_touch_nothing() {
        let layout = Layout::default();
        let start = Path::new("/srv/app");

        let err = derive_data_path(
            &UntouchableFs,
            start,
            &ExtensionIdentity::new("", "Widget"),
            &NetworkId::from(1),
            &layout,
            false,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: extension identity required");

        let err = derive_data_path(&UntouchableFs, start, &acme(), &NetworkId::from(""), &layout, false)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: network id required");
    }

    #[test]
    fn test_derive_creates_directory_under_resolved_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let proj = tmp.path().join("proj");
        let src = proj.join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(proj.join("extension.config.json"), ACME).unwrap();

        let path = derive_data_path(&StdFs, &src, &acme(), &NetworkId::from(42), &Layout::default(), false)
            .unwrap();
        assert_eq!(path, proj.join("extensions-data").join("Acme-Widget").join("42"));
        assert!(path.is_dir());
    }

    #[test]
    fn test_derive_inside_container_roots_at_container_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let ext = tmp.path().join("extensions").join("widget");
        std::fs::create_dir_all(&ext).unwrap();
        std::fs::write(ext.join("extension.config.json"), ACME).unwrap();

        let path = derive_data_path(&StdFs, &ext, &acme(), &NetworkId::from("9"), &Layout::default(), false)
            .unwrap();
        assert_eq!(
            path,
            tmp.path().join("extensions-data").join("Acme-Widget").join("9")
        );
        assert!(path.is_dir());
    }

    #[test]
    fn test_derive_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("extension.config.json"), ACME).unwrap();
        let layout = Layout::default();
        let network = NetworkId::from(3);

        let first = derive_data_path(&StdFs, tmp.path(), &acme(), &network, &layout, false).unwrap();
        std::fs::write(first.join("state.json"), "{}").unwrap();
        let second = derive_data_path(&StdFs, tmp.path(), &acme(), &network, &layout, false).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(second.join("state.json")).unwrap(), "{}");
    }

    #[test]
    fn test_skip_create_leaves_filesystem_alone() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("extension.config.json"), ACME).unwrap();

        let path = derive_data_path(&StdFs, tmp.path(), &acme(), &NetworkId::from(5), &Layout::default(), true)
            .unwrap();
        assert_eq!(path, tmp.path().join("extensions-data").join("Acme-Widget").join("5"));
        assert!(!path.exists());
        assert!(!tmp.path().join("extensions-data").exists());
    }

    #[test]
    fn test_create_failure_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("extension.config.json"), ACME).unwrap();
        // a file where the data root should be
        std::fs::write(tmp.path().join("extensions-data"), "").unwrap();

        let err = derive_data_path(&StdFs, tmp.path(), &acme(), &NetworkId::from(1), &Layout::default(), false)
            .unwrap_err();
        assert!(matches!(err, Error::CreateDir { .. }));
    }

    #[test]
    fn test_concurrent_creation_is_safe() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("extension.config.json"), ACME).unwrap();
        let layout = Layout::default();
        let identity = acme();
        let network = NetworkId::from(11);

        let paths: Vec<PathBuf> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        derive_data_path(&StdFs, tmp.path(), &identity, &network, &layout, false)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        assert!(paths.windows(2).all(|w| w[0] == w[1]));
        assert!(paths[0].is_dir());
    }

    #[tokio::test]
    async fn test_derive_async_matches_blocking() {
        let tmp = tempfile::tempdir().unwrap();
        let ext = tmp.path().join("extensions").join("widget");
        std::fs::create_dir_all(&ext).unwrap();
        std::fs::write(ext.join("extension.config.json"), ACME).unwrap();
        let layout = Layout::default();

        let skipped = derive_data_path_async(&TokioFs, &ext, &acme(), &NetworkId::from(8), &layout, true)
            .await
            .unwrap();
        assert!(!skipped.exists());

        let created = derive_data_path_async(&TokioFs, &ext, &acme(), &NetworkId::from(8), &layout, false)
            .await
            .unwrap();
        let blocking = derive_data_path(&StdFs, &ext, &acme(), &NetworkId::from("8"), &layout, true).unwrap();
        assert_eq!(created, skipped);
        assert_eq!(created, blocking);
        assert!(created.is_dir());
    }

    #[tokio::test]
    async fn test_concurrent_async_creation_is_safe() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("extension.config.json"), ACME).unwrap();
        let start = tmp.path().to_path_buf();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let start = start.clone();
                tokio::spawn(async move {
                    derive_data_path_async(
                        &TokioFs,
                        &start,
                        &acme(),
                        &NetworkId::from(12),
                        &Layout::default(),
                        false,
                    )
                    .await
                })
            })
            .collect();

        for handle in handles {
            let path = handle.await.unwrap().unwrap();
            assert!(path.is_dir());
        }
    }
}
