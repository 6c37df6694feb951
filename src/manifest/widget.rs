//! `config.xml` loading for WGT packages.
//!
//! Only the `<widget>` element is read. Its five mandatory attributes are
//! copied into the document as-is and the identity attribute is split into
//! derived identifier fields.

use super::{ManifestDocument, ManifestError, read_manifest_file};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use std::path::Path;

/// Name of the widget configuration file at the top of a WGT tree.
pub const CONFIG_XML_FILENAME: &str = "config.xml";

/// Attribute carrying the `<package>.<name>` application identity.
pub const IDENTITY_ATTRIBUTE: &str = "tizen:application";

/// Attributes every `<widget>` element must carry, in reading order.
pub const REQUIRED_ATTRIBUTES: [&str; 5] =
    ["name", "description", "content", "icon", IDENTITY_ATTRIBUTE];

/// Document key holding the full identity value.
pub const APPLICATION_ID_KEY: &str = "application_id";

/// Document key holding the package portion of the identity.
pub const PACKAGE_ID_KEY: &str = "package_id";

const VERSION_ATTRIBUTE: &str = "version";
const WIDGET_ELEMENT: &[u8] = b"widget";

pub(super) fn load(root: &Path) -> Result<ManifestDocument, ManifestError> {
    let path = root.join(CONFIG_XML_FILENAME);
    let text = read_manifest_file(&path)?;
    parse_widget(&text)
}

/// Parse `config.xml` text into a manifest document.
///
/// Only the root element is considered, and it must be `<widget>`. Fails
/// on the first missing mandatory attribute; nothing partial is returned.
pub(super) fn parse_widget(text: &str) -> Result<ManifestDocument, ManifestError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element)) => {
                if element.name().as_ref() != WIDGET_ELEMENT {
                    return Err(no_top_level_widget());
                }
                return widget_document(&element);
            }
            Ok(Event::Eof) => return Err(no_top_level_widget()),
            Ok(_) => {}
            Err(err) => {
                return Err(ManifestError::ParseError(format!(
                    "malformed XML at byte {}: {err}",
                    reader.error_position()
                )));
            }
        }
    }
}

fn no_top_level_widget() -> ManifestError {
    ManifestError::ParseError("no top-level <widget> element".to_owned())
}

fn widget_document(element: &BytesStart<'_>) -> Result<ManifestDocument, ManifestError> {
    let attributes = collect_attributes(element)?;

    let mut entries = Map::new();
    for name in REQUIRED_ATTRIBUTES {
        let Some(value) = attributes.get(name) else {
            return Err(ManifestError::ParseError(format!(
                "<widget> is missing required attribute `{name}`"
            )));
        };
        entries.insert(name.to_owned(), value.clone());
    }

    if let Some(identity) = attributes.get(IDENTITY_ATTRIBUTE).and_then(Value::as_str) {
        let package = identity
            .split_once('.')
            .map_or(identity, |(package, _)| package);
        entries.insert(APPLICATION_ID_KEY.to_owned(), Value::from(identity));
        entries.insert(PACKAGE_ID_KEY.to_owned(), Value::from(package));
    }
    if let Some(version) = attributes.get(VERSION_ATTRIBUTE) {
        entries.insert(VERSION_ATTRIBUTE.to_owned(), version.clone());
    }

    Ok(ManifestDocument::from_object(entries))
}

fn collect_attributes(element: &BytesStart<'_>) -> Result<Map<String, Value>, ManifestError> {
    let mut attributes = Map::new();
    for attr in element.attributes() {
        let attr = attr
            .map_err(|err| ManifestError::ParseError(format!("bad <widget> attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| {
            ManifestError::ParseError(format!("bad value for attribute `{key}`: {err}"))
        })?;
        attributes.insert(key, Value::from(value.into_owned()));
    }
    Ok(attributes)
}
