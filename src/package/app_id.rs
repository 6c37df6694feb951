//! Application identifier newtype.
//!
//! Every id that reaches an [`ApplicationDescriptor`](crate::ApplicationDescriptor)
//! passes through [`AppId`], whether it came from an XPK public key, a WGT
//! identity attribute, or the caller. Ids end up as directory names when an
//! installation is persisted, so the accepted alphabet is deliberately narrow.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Longest id accepted, in bytes.
const MAX_ID_LEN: usize = 128;

/// Number of digest bytes that feed an XPK id.
const ID_DIGEST_BYTES: usize = 16;

/// Errors arising from invalid application identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid application id \"{value}\": {reason}")]
pub struct AppIdError {
    /// The rejected id string.
    pub value: String,
    /// Description of the violated constraint.
    pub reason: String,
}

/// A validated application identifier.
///
/// # Examples
///
/// ```
/// use appkg::AppId;
///
/// let id = AppId::try_from("nrT4AQuzWO").expect("valid id");
/// assert_eq!(id.as_str(), "nrT4AQuzWO");
/// assert!(AppId::try_from("../escape").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Derive the stable id of an XPK package from its public key.
    ///
    /// The first 16 bytes of the key's SHA-256 digest are hex-encoded and
    /// each hex digit `0`-`f` is shifted into the range `a`-`p`, giving a
    /// 32-character id that is safe to use as a directory name.
    ///
    /// # Examples
    ///
    /// ```
    /// use appkg::AppId;
    ///
    /// let id = AppId::from_public_key(b"public key bytes");
    /// assert_eq!(id.as_str().len(), 32);
    /// assert!(id.as_str().chars().all(|c| ('a'..='p').contains(&c)));
    /// ```
    #[must_use]
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let digest = Sha256::digest(public_key);
        let mut id = String::with_capacity(ID_DIGEST_BYTES * 2);
        for byte in digest.iter().take(ID_DIGEST_BYTES) {
            id.push(shifted_nibble(byte >> 4));
            id.push(shifted_nibble(byte & 0x0f));
        }
        Self(id)
    }

    /// Return the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn shifted_nibble(nibble: u8) -> char {
    char::from(b'a' + nibble)
}

impl TryFrom<&str> for AppId {
    type Error = AppIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_app_id(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for AppId {
    type Error = AppIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_app_id(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_app_id(value: &str) -> Result<(), AppIdError> {
    let reject = |reason: String| AppIdError {
        value: value.to_owned(),
        reason,
    };

    if value.is_empty() {
        return Err(reject("id must not be empty".to_owned()));
    }
    if value.len() > MAX_ID_LEN {
        return Err(reject(format!(
            "id is {} bytes long; the maximum is {MAX_ID_LEN}",
            value.len()
        )));
    }
    if value.starts_with('.') {
        return Err(reject("id must not start with '.'".to_owned()));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(reject(format!("character '{bad}' is not allowed")));
    }
    Ok(())
}
