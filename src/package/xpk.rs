//! XPK signature section parsing.
//!
//! An XPK package is a zip archive prefixed by a signature section:
//!
//! ```text
//! "CrWk" | key_len: u32 LE | sig_len: u32 LE | public key | signature | zip payload
//! ```
//!
//! Only the layout is checked here. Whether the signature actually matches
//! the payload is decided by whoever consumes [`SignatureSection`].

use std::io::{self, Read};

/// Magic bytes at the start of every XPK package.
pub const XPK_MAGIC: [u8; 4] = *b"CrWk";

/// Largest public key accepted, in bytes.
pub const MAX_PUBLIC_KEY_LEN: u32 = 1 << 16;

/// Largest signature accepted, in bytes.
pub const MAX_SIGNATURE_LEN: u32 = 1 << 16;

/// Magic bytes of a zip local file header.
pub(crate) const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Fixed-size part of the header: magic plus two length words.
const FIXED_HEADER_LEN: u64 = 12;

/// The key and signature block of an XPK package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSection {
    public_key: Vec<u8>,
    signature: Vec<u8>,
}

impl SignatureSection {
    /// Return the embedded public key.
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Return the embedded signature.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Byte offset of the zip payload within the package file.
    #[must_use]
    pub fn payload_offset(&self) -> u64 {
        FIXED_HEADER_LEN + self.public_key.len() as u64 + self.signature.len() as u64
    }
}

/// Parse and bounds-check the signature section at the start of `reader`.
///
/// `file_len` is the total package size and is used to reject truncated
/// packages before any large allocation. On failure the returned string
/// describes the defect.
pub(crate) fn parse_signature_section<R: Read>(
    reader: &mut R,
    file_len: u64,
) -> Result<SignatureSection, String> {
    let magic = read_array(reader).map_err(|e| truncated("magic", &e))?;
    if magic != XPK_MAGIC {
        return Err("missing CrWk magic".to_owned());
    }

    let key_len = u32::from_le_bytes(read_array(reader).map_err(|e| truncated("key length", &e))?);
    let sig_len = u32::from_le_bytes(
        read_array(reader).map_err(|e| truncated("signature length", &e))?,
    );
    check_len("public key", key_len, MAX_PUBLIC_KEY_LEN)?;
    check_len("signature", sig_len, MAX_SIGNATURE_LEN)?;

    let required = FIXED_HEADER_LEN + u64::from(key_len) + u64::from(sig_len) + 4;
    if file_len < required {
        return Err(format!(
            "file is {file_len} bytes but the signature section needs {required}"
        ));
    }

    let public_key = read_vec(reader, key_len).map_err(|e| truncated("public key", &e))?;
    let signature = read_vec(reader, sig_len).map_err(|e| truncated("signature", &e))?;

    let payload_magic: [u8; 4] = read_array(reader).map_err(|e| truncated("payload", &e))?;
    if payload_magic != ZIP_LOCAL_HEADER {
        return Err("signature section is not followed by a zip payload".to_owned());
    }

    Ok(SignatureSection {
        public_key,
        signature,
    })
}

fn check_len(field: &str, len: u32, max: u32) -> Result<(), String> {
    if len == 0 {
        return Err(format!("{field} is empty"));
    }
    if len > max {
        return Err(format!("{field} is {len} bytes; the maximum is {max}"));
    }
    Ok(())
}

fn truncated(field: &str, err: &io::Error) -> String {
    format!("truncated while reading {field}: {err}")
}

fn read_array<R: Read>(reader: &mut R) -> io::Result<[u8; 4]> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_vec<R: Read>(reader: &mut R, len: u32) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(u64::from(len)).read_to_end(&mut buf)?;
    if buf.len() as u64 != u64::from(len) {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
    }
    Ok(buf)
}
