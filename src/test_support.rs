//! Package builders for tests.
//!
//! Only compiled for this crate's own tests or with the `test-support`
//! feature. The builders produce byte-exact XPK and WGT files so that tests
//! exercise the real detection, extraction and loading code paths.

use crate::package::xpk::XPK_MAGIC;
use std::io::{self, Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Public key used by [`XpkBuilder`] unless overridden.
pub const DEFAULT_PUBLIC_KEY: &[u8] = b"-----test public key-----";

/// Signature used by [`XpkBuilder`] unless overridden.
pub const DEFAULT_SIGNATURE: &[u8] = b"-----test signature-----";

/// Build a `config.xml` document whose `<widget>` element carries `attrs`.
#[must_use]
pub fn widget_xml(attrs: &[(&str, &str)]) -> String {
    let rendered: String = attrs
        .iter()
        .map(|(key, value)| format!(" {key}=\"{value}\""))
        .collect();
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<!-- generated for tests -->\n",
            "<widget xmlns=\"http://www.w3.org/ns/widgets\" ",
            "xmlns:tizen=\"http://tizen.org/ns/widgets\"{}>\n",
            "  <content src=\"index.html\"/>\n",
            "</widget>\n"
        ),
        rendered
    )
}

/// The five widget attributes a WGT manifest must carry, with test values.
#[must_use]
pub fn complete_widget_attrs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Hello"),
        ("description", "A greeting"),
        ("content", "index.html"),
        ("icon", "icon.png"),
        ("tizen:application", "nrT4AQuzWO.Hello"),
    ]
}

fn zip_bytes(entries: &[(String, Vec<u8>)]) -> io::Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.as_str(), SimpleFileOptions::default())
                .map_err(io::Error::other)?;
            continue;
        }
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .map_err(io::Error::other)?;
        writer.write_all(contents)?;
    }
    Ok(writer.finish().map_err(io::Error::other)?.into_inner())
}

/// Builder for WGT packages.
#[derive(Debug, Clone, Default)]
pub struct WgtBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl WgtBuilder {
    /// Start an empty package.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `config.xml` with the given contents.
    #[must_use]
    pub fn with_config_xml(self, xml: &str) -> Self {
        self.with_entry("config.xml", xml.as_bytes())
    }

    /// Add an arbitrary entry. Names ending in `/` become directories.
    #[must_use]
    pub fn with_entry(mut self, name: &str, contents: &[u8]) -> Self {
        self.entries.push((name.to_owned(), contents.to_vec()));
        self
    }

    /// Serialise the package.
    ///
    /// # Errors
    ///
    /// Returns an error if the zip writer fails.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        zip_bytes(&self.entries)
    }

    /// Write the package to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the file write fails.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes()?)
    }
}

/// Builder for XPK packages.
#[derive(Debug, Clone)]
pub struct XpkBuilder {
    public_key: Vec<u8>,
    signature: Vec<u8>,
    entries: Vec<(String, Vec<u8>)>,
}

impl Default for XpkBuilder {
    fn default() -> Self {
        Self {
            public_key: DEFAULT_PUBLIC_KEY.to_vec(),
            signature: DEFAULT_SIGNATURE.to_vec(),
            entries: Vec::new(),
        }
    }
}

impl XpkBuilder {
    /// Start a package with the default key and signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the embedded public key.
    #[must_use]
    pub fn with_public_key(mut self, key: &[u8]) -> Self {
        self.public_key = key.to_vec();
        self
    }

    /// Replace the embedded signature.
    #[must_use]
    pub fn with_signature(mut self, signature: &[u8]) -> Self {
        self.signature = signature.to_vec();
        self
    }

    /// Add `manifest.json` with the given contents.
    #[must_use]
    pub fn with_manifest_json(self, json: &str) -> Self {
        self.with_entry("manifest.json", json.as_bytes())
    }

    /// Add an arbitrary entry. Names ending in `/` become directories.
    #[must_use]
    pub fn with_entry(mut self, name: &str, contents: &[u8]) -> Self {
        self.entries.push((name.to_owned(), contents.to_vec()));
        self
    }

    /// Serialise the package: signature section followed by the zip payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the zip writer fails or a section is too large
    /// for its length field.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let key_len = u32::try_from(self.public_key.len()).map_err(io::Error::other)?;
        let sig_len = u32::try_from(self.signature.len()).map_err(io::Error::other)?;

        let mut bytes = XPK_MAGIC.to_vec();
        bytes.extend_from_slice(&key_len.to_le_bytes());
        bytes.extend_from_slice(&sig_len.to_le_bytes());
        bytes.extend_from_slice(&self.public_key);
        bytes.extend_from_slice(&self.signature);
        bytes.extend_from_slice(&zip_bytes(&self.entries)?);
        Ok(bytes)
    }

    /// Write the package to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the file write fails.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes()?)
    }
}
