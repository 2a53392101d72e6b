//! Naming convention for marker files and data directories.
//!
//! The defaults match what installed extensions expect. A JSON layout file can
//! override any of them:
//!
//! ```json
//! { "data_dir_name": "ext-data" }
//! ```

use crate::error::{Error, Result};
use crate::identity::is_path_segment;
use crate::{CONTAINER_DIR_NAME, DATA_DIR_NAME, MARKER_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// File whose `id` marks an extension's installation folder.
    #[serde(default = "default_marker_file_name")]
    pub marker_file_name: String,
    /// Shared container folder; an extension installed directly inside it
    /// keeps its data next to the container instead of inside itself.
    #[serde(default = "default_container_dir_name")]
    pub container_dir_name: String,
    /// Top-level folder under which all extension data lives.
    #[serde(default = "default_data_dir_name")]
    pub data_dir_name: String,
}

fn default_marker_file_name() -> String {
    MARKER_FILE_NAME.to_string()
}

fn default_container_dir_name() -> String {
    CONTAINER_DIR_NAME.to_string()
}

fn default_data_dir_name() -> String {
    DATA_DIR_NAME.to_string()
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            marker_file_name: default_marker_file_name(),
            container_dir_name: default_container_dir_name(),
            data_dir_name: default_data_dir_name(),
        }
    }
}

impl Layout {
    /// Read a layout from a JSON file, returning `Layout::default()` if the
    /// file doesn't exist or is empty.
    ///
    /// Returns an error if the file exists but can't be read or parsed, or if
    /// any name is not a single path segment.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(Error::ReadLayout {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let layout: Self = serde_json::from_str(&content).map_err(|source| Error::ParseLayout {
            path: path.to_path_buf(),
            source,
        })?;
        layout.validate()?;
        Ok(layout)
    }

    /// Every name must be one ordinary path segment, otherwise a marker or
    /// data path could land outside the folder it is joined onto.
    pub fn validate(&self) -> Result<()> {
        let names = [
            &self.marker_file_name,
            &self.container_dir_name,
            &self.data_dir_name,
        ];
        if names.iter().all(|name| is_path_segment(name)) {
            Ok(())
        } else {
            Err(Error::InvalidArgument("layout names must be single path segments"))
        }
    }
}
