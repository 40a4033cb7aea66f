use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};

/// SHA-1 digest addressing a blob by its own bytes.
///
/// Paths and the legacy `M:` fields use the hex view; the compact line
/// format uses unpadded standard base64. The two are intentionally kept apart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; ContentHash::LEN]);

impl ContentHash {
    pub const LEN: usize = 20;
    pub const HEX_LEN: usize = Self::LEN * 2;

    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// 27 characters: standard alphabet, trailing `=` dropped.
    pub fn to_base64(&self) -> String {
        STANDARD_NO_PAD.encode(self.0)
    }
}

/// Anything that names a file in a sharded blob tree.
pub trait BlobName {
    fn blob_name(&self) -> Cow<'_, str>;
}

impl BlobName for ContentHash {
    fn blob_name(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_hex())
    }
}

impl BlobName for str {
    fn blob_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentHashParseError {
    #[error("expected {expected} hex characters, got {0}", expected = ContentHash::HEX_LEN)]
    InvalidLength(usize),
    #[error("not a hex string")]
    InvalidCharacter,
}

impl FromStr for ContentHash {
    type Err = ContentHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(ContentHashParseError::InvalidLength(s.len()));
        }
        let mut bytes = [0_u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ContentHashParseError::InvalidCharacter)?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}
