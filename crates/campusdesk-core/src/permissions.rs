// ── Permission catalogue ──
//
// The backend has no permissions endpoint; the catalogue is whatever the
// existing roles carry. The role form groups it by subject.

use indexmap::IndexMap;

use crate::model::{EntityId, Permission, Role};

/// Roles page size used to collect permissions.
pub const PERMISSION_SOURCE_LIMIT: u64 = 100;

/// Group name for permissions without a subject.
pub const OTHER_GROUP: &str = "other";

/// Union of every role's permissions, one per id (first seen wins),
/// sorted by id.
pub fn derive_permissions(roles: &[Role]) -> Vec<Permission> {
    let mut seen: IndexMap<EntityId, Permission> = IndexMap::new();
    for permission in roles.iter().flat_map(|r| &r.permissions) {
        seen.entry(permission.id)
            .or_insert_with(|| permission.clone());
    }
    let mut out: Vec<Permission> = seen.into_values().collect();
    out.sort_by_key(|p| p.id.get());
    out
}

/// Subject of a permission name: everything after the first word
/// (`"create room type"` → `"room type"`).
pub fn permission_group(name: &str) -> &str {
    name.trim()
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
        .unwrap_or(OTHER_GROUP)
}

/// Group permissions by subject, keeping first-seen group order.
pub fn group_permissions(permissions: &[Permission]) -> IndexMap<String, Vec<Permission>> {
    let mut groups: IndexMap<String, Vec<Permission>> = IndexMap::new();
    for permission in permissions {
        groups
            .entry(permission_group(&permission.name).to_owned())
            .or_default()
            .push(permission.clone());
    }
    groups
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn roles() -> Vec<Role> {
        serde_json::from_value(json!([
            {"id": 1, "name": "Admin", "permissions": [
                {"id": 5, "name": "delete user"},
                {"id": 2, "name": "create user"},
                {"id": 7, "name": "create room type"}
            ]},
            {"id": 2, "name": "Editor", "permissions": [
                {"id": 2, "name": "create user (dup)"},
                {"id": 9, "name": "dashboard"}
            ]},
            {"id": 3, "name": "Guest"}
        ]))
        .unwrap()
    }

    #[test]
    fn derive_dedupes_and_sorts() {
        let perms = derive_permissions(&roles());
        let names: Vec<&str> = perms.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["create user", "delete user", "create room type", "dashboard"]
        );
    }

    #[test]
    fn group_by_subject() {
        let groups = group_permissions(&derive_permissions(&roles()));
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["user", "room type", "other"]);
        assert_eq!(groups["user"].len(), 2);
    }

    #[test]
    fn group_name_edge_cases() {
        assert_eq!(permission_group("view"), "other");
        assert_eq!(permission_group("  update   building "), "building");
        assert_eq!(permission_group(""), "other");
    }
}
