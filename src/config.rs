//! Extension marker file model and identity matching.
//!
//! An extension's installation folder carries a JSON marker file
//! (`extension.config.json` by default) whose `id` object names the extension:
//!
//! ```json
//! { "id": { "company": "Acme", "name": "Widget" }, "version": "1.2.0" }
//! ```
//!
//! Fields other than `id` are opaque here and are carried through unchanged.

use crate::identity::ExtensionIdentity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed marker file that carries a well-formed `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub id: ExtensionIdentity,
    /// Every other top-level field, verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarkerConfig {
    /// Look up an opaque top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// What was found at a candidate marker path.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerProbe {
    /// No regular file at the path.
    Absent,
    /// The file exists but is not a JSON object.
    Malformed(String),
    /// Valid JSON object without a usable `id`.
    Unidentified,
    /// A marker for some other extension.
    Foreign(ExtensionIdentity),
    Match(MarkerConfig),
}

impl MarkerProbe {
    pub fn is_match(&self) -> bool {
        matches!(self, MarkerProbe::Match(_))
    }

    pub fn into_config(self) -> Option<MarkerConfig> {
        match self {
            MarkerProbe::Match(config) => Some(config),
            _ => None,
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Classify marker file contents against `identity`.
///
/// `contents` is `None` when no file exists. Nothing here fails: every
/// unreadable shape degrades to a non-matching probe.
pub fn probe(contents: Option<&[u8]>, identity: &ExtensionIdentity) -> MarkerProbe {
    let Some(bytes) = contents else {
        return MarkerProbe::Absent;
    };
    // editors on Windows commonly save JSON with a byte order mark
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let map = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return MarkerProbe::Malformed("expected a JSON object".to_string()),
        Err(e) => return MarkerProbe::Malformed(e.to_string()),
    };

    let found = match map.get("id") {
        Some(id) => match ExtensionIdentity::deserialize(id) {
            Ok(found) => found,
            Err(_) => return MarkerProbe::Unidentified,
        },
        None => return MarkerProbe::Unidentified,
    };

    if found.name != identity.name || found.company != identity.company {
        return MarkerProbe::Foreign(found);
    }

    match serde_json::from_value::<MarkerConfig>(Value::Object(map)) {
        Ok(config) => MarkerProbe::Match(config),
        Err(_) => MarkerProbe::Unidentified,
    }
}
