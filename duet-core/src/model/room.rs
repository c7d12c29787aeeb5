use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Caller-supplied room name.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RoomKey(String);

impl RoomKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RoomKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets registries keyed by `RoomKey` be queried with a plain `&str`.
impl Borrow<str> for RoomKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
