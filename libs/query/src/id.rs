//! Structured identifiers and coercion of textual foreign keys.
//!
//! Documents are keyed by 12-byte identifiers rendered as 24 lowercase hex characters.
//! Some references (a schedule's `eventId`) are stored as free text and are only
//! usable for joins after coercion. Coercion never fails: a value that does not have
//! the identifier shape is kept as [`ForeignKey::Raw`] and joins nothing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const OBJECT_ID_LEN: usize = 12;
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("expected {OBJECT_ID_HEX_LEN} hex characters, got {0}")]
    Length(usize),

    #[error("identifier contains non-hex characters")]
    NotHex,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a 24-character hex identifier. Upper and lower case digits are accepted.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        if value.len() != OBJECT_ID_HEX_LEN {
            return Err(IdError::Length(value.chars().count()));
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(value, &mut bytes).map_err(|_| IdError::NotHex)?;
        Ok(Self(bytes))
    }

    pub fn bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// True when `value` has the shape of an identifier.
pub fn is_object_id(value: &str) -> bool {
    ObjectId::parse(value).is_ok()
}

/// Coerces a stored JSON value to an identifier.
///
/// Only strings with the identifier shape coerce. Null, numbers, empty and malformed
/// strings yield `None`.
pub fn coerce_object_id(value: &JsonValue) -> Option<ObjectId> {
    value.as_str().and_then(|s| ObjectId::parse(s).ok())
}

/// A reference stored as text that may or may not name a structured identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignKey {
    Coerced(ObjectId),
    Raw(String),
}

impl ForeignKey {
    pub fn from_stored(value: &str) -> Self {
        match ObjectId::parse(value) {
            Ok(id) => Self::Coerced(id),
            Err(_) => Self::Raw(value.to_string()),
        }
    }

    pub fn coerced(&self) -> Option<ObjectId> {
        match self {
            Self::Coerced(id) => Some(*id),
            Self::Raw(_) => None,
        }
    }
}
