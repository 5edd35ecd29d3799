use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest extension (without the dot) accepted from an upload hint.
const MAX_EXTENSION_LEN: usize = 16;

/// Digest used to name content blobs.
///
/// `Sha256` is the default so that new blobs land next to the ones already
/// published under SHA-256 names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Digest length in bytes.
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha256 | Self::Blake3 => 32,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(TypeError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Hash-derived name of an immutable content blob: `hex(digest) + extension`.
///
/// Identical bytes always produce the same address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentAddress {
    digest: String,
    extension: String,
}

impl ContentAddress {
    /// Build an address from a finished digest and a raw extension hint.
    pub fn new(digest: &[u8], extension_hint: &str) -> Self {
        Self {
            digest: hex::encode(digest),
            extension: normalize_extension(extension_hint),
        }
    }

    /// Parse a hex digest produced by `algorithm`.
    pub fn from_hex(
        algorithm: DigestAlgorithm,
        hex_digest: &str,
        extension_hint: &str,
    ) -> Result<Self, TypeError> {
        let bytes = hex::decode(hex_digest).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != algorithm.digest_len() {
            return Err(TypeError::InvalidLength {
                algorithm: algorithm.to_string(),
                expected: algorithm.digest_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self::new(&bytes, extension_hint))
    }

    /// Lowercase hex digest.
    pub fn digest_hex(&self) -> &str {
        &self.digest
    }

    /// Normalized extension including the leading dot, or `""`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name used both locally and on the remote: `<digest><extension>`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.digest, self.extension)
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.digest.get(..8).unwrap_or(&self.digest);
        write!(f, "ContentAddress({}{})", short, self.extension)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.digest, self.extension)
    }
}

/// Normalize an extension hint such as `"JPG"`, `".png"` or `"photo.jpeg"`.
///
/// Only the part after the last dot is considered. The result is lowercased
/// and carries a leading dot. Hints containing anything but ASCII
/// alphanumerics, or longer than 16 characters, yield `""` so that a hint
/// can never smuggle a path separator into a blob name.
pub fn normalize_extension(hint: &str) -> String {
    let raw = match hint.rfind('.') {
        Some(pos) => &hint[pos + 1..],
        None => hint,
    };
    if raw.is_empty()
        || raw.len() > MAX_EXTENSION_LEN
        || !raw.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return String::new();
    }
    format!(".{}", raw.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_hex_plus_extension() {
        let addr = ContentAddress::new(&[0xab; 32], "JPG");
        assert_eq!(addr.file_name(), format!("{}.jpg", "ab".repeat(32)));
        assert_eq!(addr.to_string(), addr.file_name());
    }

    #[test]
    fn extension_normalization() {
        assert_eq!(normalize_extension(".png"), ".png");
        assert_eq!(normalize_extension("holiday.JPEG"), ".jpeg");
        assert_eq!(normalize_extension("webp"), ".webp");
        assert_eq!(normalize_extension(""), "");
        assert_eq!(normalize_extension("noext."), "");
        assert_eq!(normalize_extension("../../etc/passwd"), "");
        assert_eq!(normalize_extension(".a/b"), "");
        assert_eq!(normalize_extension(".averyveryverylongextension"), "");
    }

    #[test]
    fn from_hex_checks_length() {
        let err = ContentAddress::from_hex(DigestAlgorithm::Sha256, "abcd", ".png").unwrap_err();
        assert!(matches!(err, TypeError::InvalidLength { expected: 32, actual: 2, .. }));
        assert!(ContentAddress::from_hex(DigestAlgorithm::Sha256, "zz", "").is_err());
    }

    #[test]
    fn from_hex_accepts_full_digest() {
        let hex_digest = "01".repeat(32);
        let addr = ContentAddress::from_hex(DigestAlgorithm::Blake3, &hex_digest, "gif").unwrap();
        assert_eq!(addr.digest_hex(), hex_digest);
        assert_eq!(addr.extension(), ".gif");
    }

    #[test]
    fn algorithm_parsing() {
        assert_eq!("SHA256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("blake3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert!("md5".parse::<DigestAlgorithm>().is_err());
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn debug_shortens_digest() {
        let addr = ContentAddress::new(&[0xab; 32], "png");
        assert_eq!(format!("{addr:?}"), "ContentAddress(abababab.png)");
    }

    #[test]
    fn debug_tolerates_deserialized_non_ascii_digest() {
        let addr: ContentAddress =
            serde_json::from_str(r#"{"digest":"abcdefgéh","extension":".png"}"#).unwrap();
        assert_eq!(format!("{addr:?}"), "ContentAddress(abcdefgéh.png)");
    }

    #[test]
    fn algorithm_serde_is_lowercase() {
        let json = serde_json::to_string(&DigestAlgorithm::Blake3).unwrap();
        assert_eq!(json, "\"blake3\"");
    }
}
