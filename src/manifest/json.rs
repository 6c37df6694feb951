//! `manifest.json` loading for XPK packages.

use super::{ManifestDocument, ManifestError, read_manifest_file};
use serde_json::Value;
use std::path::Path;

/// Name of the manifest file at the top of an XPK tree.
pub const MANIFEST_FILENAME: &str = "manifest.json";

pub(super) fn load(root: &Path) -> Result<ManifestDocument, ManifestError> {
    let path = root.join(MANIFEST_FILENAME);
    let text = read_manifest_file(&path)?;
    let value: Value =
        serde_json::from_str(&text).map_err(|err| ManifestError::ParseError(err.to_string()))?;
    match value {
        Value::Object(map) => Ok(ManifestDocument::from_object(map)),
        other => Err(ManifestError::Unreadable {
            path,
            reason: format!("top-level value is {}, not an object", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
