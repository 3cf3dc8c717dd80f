// ── Physical hierarchy: campus → block → building → room ──

use campusdesk_api::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CampusRef, EntityId, NamedRef, UserRef, opt_id, opt_timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campus {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub campus_id: Option<EntityId>,
    #[serde(default)]
    pub campus: Option<CampusRef>,
}

impl Block {
    /// Campus id from the embedded relation, falling back to the foreign key.
    pub fn campus_key(&self) -> Option<EntityId> {
        self.campus.as_ref().map(|c| c.id).or(self.campus_id)
    }
}

/// Block as embedded in a building, with its own campus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub campus: Option<CampusRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::f64_lenient")]
    pub length: f64,
    #[serde(default, deserialize_with = "de::f64_lenient")]
    pub width: f64,
    #[serde(default, deserialize_with = "de::u64_lenient")]
    pub floors: u64,
    #[serde(default, deserialize_with = "de::u64_lenient")]
    pub basements: u64,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub block_id: Option<EntityId>,
    #[serde(default)]
    pub block: Option<BlockRef>,
    #[serde(default)]
    pub created_by: Option<UserRef>,
    #[serde(default)]
    pub updated_by: Option<UserRef>,
}

impl Building {
    /// Footprint in square metres.
    pub fn area_value(&self) -> f64 {
        self.length * self.width
    }

    /// Footprint rendered as `"{area}m²"`.
    pub fn area(&self) -> String {
        format!("{}m²", self.area_value())
    }

    /// `"3 floors, 1 basement"` / `"3 floors, 2 basements"`.
    pub fn levels_label(&self) -> String {
        let plural = if self.basements == 1 { "" } else { "s" };
        format!("{} floors, {} basement{plural}", self.floors, self.basements)
    }

    pub fn block_key(&self) -> Option<EntityId> {
        self.block.as_ref().map(|b| b.id).or(self.block_id)
    }

    pub fn campus_name(&self) -> Option<&str> {
        self.block
            .as_ref()
            .and_then(|b| b.campus.as_ref())
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64_lenient")]
    pub capacity: Option<u64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub room_type_id: Option<EntityId>,
    #[serde(default, deserialize_with = "opt_id")]
    pub department_type_id: Option<EntityId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub building_id: Option<EntityId>,
    #[serde(default)]
    pub room_type: Option<NamedRef>,
    #[serde(default)]
    pub department_type: Option<NamedRef>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn building(length: f64, width: f64, basements: u64) -> Building {
        serde_json::from_value(json!({
            "id": 1, "name": "Science", "length": length, "width": width,
            "floors": 4, "basements": basements
        }))
        .unwrap()
    }

    #[test]
    fn area_and_levels() {
        let b = building(12.5, 4.0, 1);
        assert_eq!(b.area(), "50m²");
        assert_eq!(b.levels_label(), "4 floors, 1 basement");

        let b = building(10.0, 6.25, 0);
        assert_eq!(b.area(), "62.5m²");
        assert_eq!(b.levels_label(), "4 floors, 0 basements");
    }

    #[test]
    fn building_with_nested_block_and_strings() {
        let b: Building = serde_json::from_value(json!({
            "id": "3",
            "name": "Library",
            "length": "20.00",
            "width": "10",
            "floors": "2",
            "basements": null,
            "block_id": "5",
            "block": {"id": 5, "name": "Block A", "campus": {"id": 1, "name": "Main"}},
            "created_by": {"id": 9, "name": "Admin"},
            "updated_by": null
        }))
        .unwrap();
        assert_eq!(b.area(), "200m²");
        assert_eq!(b.basements, 0);
        assert_eq!(b.campus_name(), Some("Main"));
        assert_eq!(b.block_key().unwrap().get(), 5);
        assert!(b.updated_by.is_none());
    }

    #[test]
    fn block_campus_key_prefers_relation() {
        let block: Block = serde_json::from_value(json!({
            "id": 2, "name": "B", "campus_id": "", "campus": {"id": 4, "name": "Sidist Kilo"}
        }))
        .unwrap();
        assert_eq!(block.campus_key().unwrap().get(), 4);
        assert!(block.campus_id.is_none());
    }
}
