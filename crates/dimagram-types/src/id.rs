use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Identifier of an [`AlbumItem`](crate::AlbumItem).
///
/// Persisted documents written by older editors contain both string ids
/// (`"12"`) and numeric ids (`12`). Both load into the same canonical
/// string form, and an `ItemId` always serializes as a JSON string, so a
/// document is migrated to string ids the first time it is saved.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Create an id from its canonical string form.
    ///
    /// Leading and trailing whitespace is trimmed; an empty result is rejected.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidItemId("id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ItemIdVisitor)
    }
}

struct ItemIdVisitor;

impl<'de> Visitor<'de> for ItemIdVisitor {
    type Value = ItemId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-empty string or an integer item id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
        ItemId::new(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
        Ok(ItemId(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ItemId, E> {
        Err(E::invalid_type(de::Unexpected::Float(v), &self))
    }
}
