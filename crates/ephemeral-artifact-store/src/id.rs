//! Opaque artifact handles.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::StoreError;

/// Random bytes behind every handle (128 bits).
pub const ID_BYTES: usize = 16;

/// Opaque handle issued by the store on insert.
///
/// Rendered as 32 lowercase hex characters. Parsing accepts either case and
/// rejects anything else as [`StoreError::NotFound`], so a malformed handle is
/// indistinguishable from one that was never issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Draw a fresh handle from the thread-local CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let raw: [u8; ID_BYTES] = rand::random();
        Self(hex::encode(raw))
    }

    /// Borrow the hex representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == ID_BYTES * 2 && s.bytes().all(|b| b.is_ascii_hexdigit());
        if well_formed {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(StoreError::NotFound { id: s.to_string() })
        }
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.0
    }
}
