//! Destination identifiers

use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Name of a downstream write target (a table, collection, topic...).
///
/// Buffers, log lines and metric labels all carry one, so the name is shared
/// behind an `Arc<str>`. Hashing and ordering follow the plain string, which
/// keeps `HashMap<DestinationId, _>` queryable with `&str`.
///
/// ```
/// use contracts::DestinationId;
///
/// let id: DestinationId = "warehouse.orders".into();
/// assert_eq!(id, "warehouse.orders");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub struct DestinationId(Arc<str>);

impl DestinationId {
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for DestinationId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DestinationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DestinationId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DestinationId {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

impl PartialEq<str> for DestinationId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for DestinationId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl Serialize for DestinationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
