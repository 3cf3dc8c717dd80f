// ── Users, roles and permissions ──

use campusdesk_api::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, NamedRef, opt_id, opt_timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    /// `"1 permission"` / `"4 permissions"`.
    pub fn permissions_label(&self) -> String {
        let n = self.permissions.len();
        let plural = if n == 1 { "" } else { "s" };
        format!("{n} permission{plural}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "opt_id")]
    pub role_id: Option<EntityId>,
    #[serde(default, deserialize_with = "opt_id")]
    pub department_id: Option<EntityId>,
    #[serde(default, deserialize_with = "de::bool_lenient")]
    pub is_active: bool,
    #[serde(default)]
    pub role: Option<NamedRef>,
    #[serde(default)]
    pub department: Option<NamedRef>,
    #[serde(default, deserialize_with = "opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn status_label(&self) -> &'static str {
        if self.is_active { "Active" } else { "Inactive" }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn role_permission_count() {
        let role: Role = serde_json::from_value(json!({
            "id": 1, "name": "Admin",
            "permissions": [{"id": 1, "name": "create user"}]
        }))
        .unwrap();
        assert_eq!(role.permissions_label(), "1 permission");

        let bare: Role = serde_json::from_value(json!({"id": 2, "name": "Guest"})).unwrap();
        assert_eq!(bare.permissions_label(), "0 permissions");
    }

    #[test]
    fn user_flags_and_relations() {
        let user: User = serde_json::from_value(json!({
            "id": 4, "name": "Hana", "email": "hana@aau.edu.et",
            "role_id": "2", "department_id": null, "is_active": "1",
            "role": {"id": 2, "name": "Editor"},
            "created_at": "2024-05-02T10:00:00Z"
        }))
        .unwrap();
        assert!(user.is_active);
        assert_eq!(user.status_label(), "Active");
        assert_eq!(user.role_id.unwrap().get(), 2);
        assert!(user.department_id.is_none());
        assert!(user.created_at.is_some());
    }
}
