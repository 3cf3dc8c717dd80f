// ── Resource descriptors ──
//
// Ties each model type to its endpoint kind, request body, table columns
// and form prefill, so list/edit/delete screens can be written once.

use campusdesk_api::ResourceKind;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{
    Block, Building, Campus, Department, DepartmentType, EntityId, Role, Room, RoomFacility,
    RoomType, User, format_date, ref_name,
};
use crate::request::{
    BlockRequest, BuildingRequest, DepartmentRequest, DescribedRequest, FormRequest, FormValues,
    RoleRequest, RoomRequest, UserRequest,
};
use crate::table::{Cell, Column};

/// Description column width in list tables.
pub const DESCRIPTION_WIDTH: usize = 50;
/// Remarks column width in the buildings table.
pub const REMARKS_WIDTH: usize = 30;

/// A managed entity type.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    /// Body sent on create and update.
    type Request: FormRequest;

    fn id(&self) -> EntityId;

    /// Name shown in confirmations and notices.
    fn display_name(&self) -> &str;

    fn columns() -> Vec<Column<Self>>;

    /// Current values, for prefilling an edit form.
    fn form_values(&self) -> FormValues;
}

fn text(s: Option<&String>) -> Cell {
    Cell::from(s.map(String::as_str))
}

fn name_column<T: Resource>() -> Column<T> {
    Column::new("name", "Name", |r: &T| Cell::from(r.display_name()))
}

// ── Facilities ──────────────────────────────────────────────────────

impl Resource for Campus {
    const KIND: ResourceKind = ResourceKind::Campus;
    type Request = DescribedRequest;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            name_column(),
            Column::new("description", "Description", |c: &Self| text(c.description.as_ref()))
                .truncate(DESCRIPTION_WIDTH),
        ]
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", &self.name)
            .with_opt("description", self.description.as_ref())
    }
}

impl Resource for Block {
    const KIND: ResourceKind = ResourceKind::Block;
    type Request = BlockRequest;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            name_column(),
            Column::new("description", "Description", |b: &Self| text(b.description.as_ref()))
                .truncate(DESCRIPTION_WIDTH),
            Column::new("campus", "Campus", |b: &Self| {
                Cell::from(b.campus.as_ref().map(|c| c.name.as_str()))
            }),
        ]
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", &self.name)
            .with_opt("description", self.description.as_ref())
            .with_opt("campus_id", self.campus_key())
    }
}

impl Resource for Building {
    const KIND: ResourceKind = ResourceKind::Building;
    type Request = BuildingRequest;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            name_column(),
            Column::new("description", "Description", |b: &Self| text(b.description.as_ref()))
                .truncate(DESCRIPTION_WIDTH),
            Column::new("block", "Block", |b: &Self| {
                Cell::from(b.block.as_ref().map(|r| r.name.as_str()))
            }),
            Column::new("campus", "Campus", |b: &Self| Cell::from(b.campus_name())),
            Column::new("area", "Area", |b: &Self| Cell::Number(b.area_value()))
                .render_with(Building::area),
            Column::new("floors", "Floors", |b: &Self| Cell::from(b.floors))
                .render_with(Building::levels_label),
            Column::new("created_by", "Created By", |b: &Self| {
                Cell::from(b.created_by.as_ref().map(|u| u.name.as_str()))
            }),
            Column::new("updated_by", "Updated By", |b: &Self| {
                Cell::from(b.updated_by.as_ref().map(|u| u.name.as_str()))
            }),
            Column::new("remarks", "Remarks", |b: &Self| text(b.remarks.as_ref()))
                .truncate(REMARKS_WIDTH),
        ]
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", &self.name)
            .with_opt("description", self.description.as_ref())
            .with("length", self.length.to_string())
            .with("width", self.width.to_string())
            .with("floors", self.floors.to_string())
            .with("basements", self.basements.to_string())
            .with_opt("remarks", self.remarks.as_ref())
            .with_opt("block_id", self.block_key())
    }
}

impl Resource for Room {
    const KIND: ResourceKind = ResourceKind::Room;
    type Request = RoomRequest;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Room Name", |r: &Self| Cell::from(r.name.as_str())),
            Column::new("code", "Code", |r: &Self| text(r.code.as_ref())),
            Column::new("type", "Type", |r: &Self| {
                Cell::from(r.room_type.as_ref().map(|t| t.name.as_str()))
            }),
            Column::new("capacity", "Capacity", |r: &Self| Cell::from(r.capacity)),
            Column::new("department_type", "Department Type", |r: &Self| {
                Cell::from(r.department_type.as_ref().map(|t| t.name.as_str()))
            }),
            Column::new("description", "Description", |r: &Self| text(r.description.as_ref()))
                .truncate(DESCRIPTION_WIDTH),
        ]
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", &self.name)
            .with_opt("code", self.code.as_ref())
            .with_opt("capacity", self.capacity)
            .with_opt("room_type_id", self.room_type_id)
            .with_opt("department_type_id", self.department_type_id)
            .with_opt("description", self.description.as_ref())
            .with_opt("building_id", self.building_id)
    }
}

// ── Reference data ──────────────────────────────────────────────────

macro_rules! described_resource {
    ($model:ty, $kind:expr) => {
        impl Resource for $model {
            const KIND: ResourceKind = $kind;
            type Request = DescribedRequest;

            fn id(&self) -> EntityId {
                self.id
            }

            fn display_name(&self) -> &str {
                &self.name
            }

            fn columns() -> Vec<Column<Self>> {
                vec![
                    name_column(),
                    Column::new("description", "Description", |r: &Self| {
                        text(r.description.as_ref())
                    })
                    .truncate(DESCRIPTION_WIDTH),
                ]
            }

            fn form_values(&self) -> FormValues {
                FormValues::new()
                    .with("name", &self.name)
                    .with_opt("description", self.description.as_ref())
            }
        }
    };
}

described_resource!(RoomType, ResourceKind::RoomType);
described_resource!(RoomFacility, ResourceKind::RoomFacility);
described_resource!(DepartmentType, ResourceKind::DepartmentType);

impl Resource for Department {
    const KIND: ResourceKind = ResourceKind::Department;
    type Request = DepartmentRequest;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            name_column(),
            Column::new("type", "Type", |d: &Self| {
                Cell::from(ref_name(d.department_type.as_ref()))
            }),
            Column::new("description", "Description", |d: &Self| text(d.description.as_ref()))
                .truncate(DESCRIPTION_WIDTH),
        ]
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", &self.name)
            .with_opt("department_type_id", self.department_type_id)
            .with_opt("description", self.description.as_ref())
    }
}

// ── Access control ──────────────────────────────────────────────────

impl Resource for Role {
    const KIND: ResourceKind = ResourceKind::Role;
    type Request = RoleRequest;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            name_column(),
            Column::new("description", "Description", |r: &Self| text(r.description.as_ref()))
                .truncate(DESCRIPTION_WIDTH),
            Column::new("permissions", "Permissions", |r: &Self| {
                Cell::from(r.permissions_label())
            })
            .unsortable(),
        ]
    }

    fn form_values(&self) -> FormValues {
        let ids: Vec<String> = self.permissions.iter().map(|p| p.id.to_string()).collect();
        FormValues::new()
            .with("name", &self.name)
            .with_opt("description", self.description.as_ref())
            .with("permissions", ids.join(","))
    }
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;
    type Request = UserRequest;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            name_column(),
            Column::new("email", "Email", |u: &Self| Cell::from(u.email.as_str())),
            Column::new("role", "Role", |u: &Self| Cell::from(ref_name(u.role.as_ref())))
                .unsortable(),
            Column::new("department", "Department", |u: &Self| {
                Cell::from(ref_name(u.department.as_ref()))
            })
            .unsortable(),
            Column::new("status", "Status", |u: &Self| Cell::from(u.status_label())).unsortable(),
            Column::new("created", "Created", |u: &Self| {
                // Sort on the raw timestamp; display the short date.
                u.created_at.map_or(Cell::Empty, |t| Cell::from(t.to_rfc3339()))
            })
            .render_with(|u: &Self| format_date(u.created_at.as_ref())),
        ]
    }

    fn form_values(&self) -> FormValues {
        FormValues::new()
            .with("name", &self.name)
            .with("email", &self.email)
            .with_opt("role_id", self.role_id)
            .with_opt("department_id", self.department_id)
            .with("is_active", self.is_active.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::request::FormMode;
    use crate::table::TableState;

    #[test]
    fn building_columns_render_derived_values() {
        let buildings: Vec<Building> = serde_json::from_value(json!([
            {"id": 1, "name": "Science", "length": 20, "width": 10, "floors": 3, "basements": 1,
             "remarks": "Renovated in 2019 after the east wing fire damaged it",
             "block": {"id": 2, "name": "Block A", "campus": {"id": 1, "name": "Main"}}},
            {"id": 2, "name": "Annex", "length": 5, "width": 5, "floors": 1, "basements": 0}
        ]))
        .unwrap();

        let columns = Building::columns();
        let mut table = TableState::client();
        table.toggle_sort(&columns[4]);
        let view = table.view(&buildings, &columns);

        let first = &view.rows[0].cells;
        assert_eq!(first[0], "Science");
        assert_eq!(first[2], "Block A");
        assert_eq!(first[3], "Main");
        assert_eq!(first[4], "200m²");
        assert_eq!(first[5], "3 floors, 1 basement");
        assert_eq!(first[8], "Renovated in 2019 after the ea...");
        assert_eq!(view.rows[1].cells[5], "1 floors, 0 basements");
    }

    #[test]
    fn form_values_round_into_requests() {
        let block: Block = serde_json::from_value(json!({
            "id": 3, "name": "Block C", "campus": {"id": 7, "name": "Lideta"}
        }))
        .unwrap();
        let request = BlockRequest::build(&block.form_values(), FormMode::Create).unwrap();
        assert_eq!(request.campus_id.unwrap().get(), 7);
        assert_eq!(request.name, "Block C");
    }

    #[test]
    fn role_permissions_prefill() {
        let role: Role = serde_json::from_value(json!({
            "id": 1, "name": "Admin",
            "permissions": [{"id": 4, "name": "create user"}, {"id": 9, "name": "delete user"}]
        }))
        .unwrap();
        assert_eq!(role.form_values().raw("permissions"), "4,9");
        let columns = Role::columns();
        assert!(!columns[2].sortable);
    }

    #[test]
    fn user_relations_default_to_na() {
        let user: User = serde_json::from_value(json!({
            "id": 1, "name": "Sara", "email": "sara@aau.edu.et", "is_active": false
        }))
        .unwrap();
        let columns = User::columns();
        let cells: Vec<String> = columns.iter().map(|c| c.display(&user)).collect();
        assert_eq!(cells, vec!["Sara", "sara@aau.edu.et", "N/A", "N/A", "Inactive", ""]);
    }
}
