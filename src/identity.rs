//! Extension identity and network id types.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// True when `value` is exactly one ordinary path segment: non-empty, no
/// separators, and neither `.` nor `..`.
pub(crate) fn is_path_segment(value: &str) -> bool {
    if value.is_empty() || value.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// The (company, name) pair identifying an extension.
///
/// Matching is exact and case-sensitive on both fields; no trimming is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionIdentity {
    pub company: String,
    pub name: String,
}

impl ExtensionIdentity {
    pub fn new(company: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            name: name.into(),
        }
    }

    /// Fails with `InvalidArgument` when either field is empty or would not
    /// stay a single folder name under the data directory.
    pub fn validate(&self) -> Result<()> {
        if self.company.is_empty() || self.name.is_empty() {
            return Err(Error::InvalidArgument("extension identity required"));
        }
        if !is_path_segment(&self.company)
            || !is_path_segment(&self.name)
            || !is_path_segment(&self.data_folder_name())
        {
            return Err(Error::InvalidArgument(
                "extension identity must not contain path separators",
            ));
        }
        Ok(())
    }

    /// Folder segment used under the data directory: `<company>-<name>`.
    pub fn data_folder_name(&self) -> String {
        format!("{}-{}", self.company, self.name)
    }
}

impl fmt::Display for ExtensionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.company, self.name)
    }
}

/// Network the extension's data belongs to.
///
/// Built from either a string or an integer; `7` and `"7"` are the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fails with `InvalidArgument` when the id is empty or is not a single
    /// folder name.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::InvalidArgument("network id required"));
        }
        if !is_path_segment(&self.0) {
            return Err(Error::InvalidArgument("network id must be a single path segment"));
        }
        Ok(())
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NetworkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NetworkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&String> for NetworkId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

macro_rules! network_id_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NetworkId {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

network_id_from_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
