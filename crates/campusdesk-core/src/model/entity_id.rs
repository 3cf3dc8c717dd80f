// ── Entity identity ──
//
// Every backend entity is keyed by a positive integer. Some endpoints send
// it as a JSON number, others as a string, so deserialization is lenient.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of any campusdesk entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    /// Wrap a raw id. Returns `None` for `0`, which the backend never issues.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an [`EntityId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id {0:?}: expected a positive integer")]
pub struct ParseEntityIdError(String);

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseEntityIdError(s.to_owned()))
    }
}

impl From<NonZeroU64> for EntityId {
    fn from(n: NonZeroU64) -> Self {
        Self(n)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = campusdesk_api::de::u64_lenient(deserializer)?;
        Self::new(raw).ok_or_else(|| serde::de::Error::custom("entity id must be positive"))
    }
}

/// Optional foreign key: `null`, `""` and `0` all mean "not set".
pub(crate) fn opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<EntityId>, D::Error> {
    Ok(campusdesk_api::de::opt_u64_lenient(deserializer)?.and_then(EntityId::new))
}
