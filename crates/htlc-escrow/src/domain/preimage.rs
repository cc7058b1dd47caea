//! # Pre-image Type
//!
//! Wrapper for HTLC pre-images that zeroizes memory on drop.
//!
//! The pre-image unlocks the escrow for the receiver until it is revealed
//! on claim, so it should not linger in memory or leak through logs.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A variable-length pre-image that zeroizes on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Preimage {
    inner: Vec<u8>,
}

impl Preimage {
    /// Wrap raw bytes. Any length is accepted, including empty.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Copy from a slice.
    pub fn from_slice(slice: &[u8]) -> Self {
        Self {
            inner: slice.to_vec(),
        }
    }

    /// Parse a hex string, with or without `0x`.
    pub fn from_hex(raw: &str) -> Result<Self, hex::FromHexError> {
        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        hex::decode(digits).map(Self::new)
    }

    /// Raw bytes. Use immediately and let go.
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the pre-image is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl AsRef<[u8]> for Preimage {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl std::fmt::Debug for Preimage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Preimage({} bytes, ***)", self.inner.len())
    }
}

impl Serialize for Preimage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(&self.inner))
    }
}

impl<'de> Deserialize<'de> for Preimage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
