// ── Domain model ──
//
// Entities as the backend returns them. Numeric columns are decoded
// leniently and every nested reference is optional, since list endpoints
// eager-load relations inconsistently.

mod access;
mod entity_id;
mod facility;
mod reference;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub use access::{Permission, Role, User};
pub use entity_id::{EntityId, ParseEntityIdError};
pub(crate) use entity_id::opt_id;
pub use facility::{Block, BlockRef, Building, Campus, Room};
pub use reference::{Department, DepartmentType, RoomFacility, RoomType};

/// A related entity embedded by id and name (`campus`, `role`, `created_by`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

pub type CampusRef = NamedRef;
pub type UserRef = NamedRef;

/// Parse the timestamp formats the backend emits: RFC 3339
/// (`2024-03-01T08:30:00.000000Z`) or a bare `2024-03-01 08:30:00` in UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Short date used in tables, e.g. `01 Mar, 2024`.
pub fn format_date(ts: Option<&DateTime<Utc>>) -> String {
    ts.map(|dt| dt.format("%d %b, %Y").to_string())
        .unwrap_or_default()
}

pub(crate) fn opt_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Name of an optional relation, or `N/A`.
pub(crate) fn ref_name(r: Option<&NamedRef>) -> String {
    r.map_or_else(|| "N/A".to_owned(), |r| r.name.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_in_both_formats() {
        let a = parse_timestamp("2024-03-01T08:30:00.000000Z").unwrap();
        let b = parse_timestamp("2024-03-01 08:30:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(format_date(Some(&a)), "01 Mar, 2024");
        assert!(parse_timestamp("yesterday").is_none());
        assert_eq!(format_date(None), "");
    }
}
