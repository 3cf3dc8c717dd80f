// Endpoint descriptors for every managed entity.
//
// The backend grew one resource at a time, so updates and deletes do not
// follow a single convention. Each `ResourceKind` records its own.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// How an update request is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStyle {
    /// `PUT {collection}` with the id merged into the body.
    PutCollection,
    /// `PUT {collection}/{id}` with the body as given.
    PutById,
    /// `PATCH {collection}/{id}` with the id also merged into the body.
    PatchById,
}

/// How a delete request is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStyle {
    /// `DELETE {collection}` with `{"id": …}` as the body.
    CollectionWithBody,
    /// `DELETE {collection}/{id}`.
    ById,
}

/// Every entity the dashboard manages.
///
/// `Display`/`FromStr` use the kebab-case slug (`room-type`), which is also
/// the CLI subcommand name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Campus,
    Block,
    Building,
    Room,
    RoomType,
    RoomFacility,
    DepartmentType,
    Department,
    Role,
    User,
}

impl ResourceKind {
    /// Collection path relative to the API base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Campus => "v1/campuses",
            Self::Block => "v1/blocks",
            Self::Building => "v1/buildings",
            Self::Room => "v1/rooms",
            Self::RoomType => "v1/room-types",
            Self::RoomFacility => "v1/room-facilities",
            Self::DepartmentType => "v1/department-types",
            Self::Department => "v1/departments",
            Self::Role => "v1/roles",
            Self::User => "v1/users",
        }
    }

    /// Lower-case singular label used in messages ("room type").
    pub const fn label(self) -> &'static str {
        match self {
            Self::Campus => "campus",
            Self::Block => "block",
            Self::Building => "building",
            Self::Room => "room",
            Self::RoomType => "room type",
            Self::RoomFacility => "room facility",
            Self::DepartmentType => "department type",
            Self::Department => "department",
            Self::Role => "role",
            Self::User => "user",
        }
    }

    /// Title-case plural used for headings ("Room Types").
    pub const fn plural_title(self) -> &'static str {
        match self {
            Self::Campus => "Campuses",
            Self::Block => "Blocks",
            Self::Building => "Buildings",
            Self::Room => "Rooms",
            Self::RoomType => "Room Types",
            Self::RoomFacility => "Room Facilities",
            Self::DepartmentType => "Department Types",
            Self::Department => "Departments",
            Self::Role => "Roles",
            Self::User => "Users",
        }
    }

    /// Label with the first letter capitalised ("Room type").
    pub fn title(self) -> String {
        let label = self.label();
        let mut chars = label.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }

    pub const fn update_style(self) -> UpdateStyle {
        match self {
            Self::Campus | Self::Block | Self::Building | Self::DepartmentType => {
                UpdateStyle::PutCollection
            }
            Self::Room | Self::RoomType | Self::RoomFacility => UpdateStyle::PutById,
            Self::Department | Self::Role | Self::User => UpdateStyle::PatchById,
        }
    }

    pub const fn delete_style(self) -> DeleteStyle {
        match self {
            Self::Room | Self::RoomType | Self::RoomFacility => DeleteStyle::ById,
            Self::Campus
            | Self::Block
            | Self::Building
            | Self::DepartmentType
            | Self::Department
            | Self::Role
            | Self::User => DeleteStyle::CollectionWithBody,
        }
    }

    /// Path of a single entity (`v1/roles/7`).
    pub fn item_path(self, id: u64) -> String {
        format!("{}/{id}", self.path())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn slugs_round_trip() {
        for kind in ResourceKind::iter() {
            let slug = kind.to_string();
            assert_eq!(slug.parse::<ResourceKind>().unwrap(), kind);
        }
        assert_eq!(ResourceKind::RoomFacility.to_string(), "room-facility");
    }

    #[test]
    fn conventions_per_resource() {
        assert_eq!(ResourceKind::Campus.update_style(), UpdateStyle::PutCollection);
        assert_eq!(ResourceKind::RoomType.update_style(), UpdateStyle::PutById);
        assert_eq!(ResourceKind::User.update_style(), UpdateStyle::PatchById);
        assert_eq!(ResourceKind::Building.delete_style(), DeleteStyle::CollectionWithBody);
        assert_eq!(ResourceKind::RoomFacility.delete_style(), DeleteStyle::ById);
    }

    #[test]
    fn titles() {
        assert_eq!(ResourceKind::DepartmentType.title(), "Department type");
        assert_eq!(ResourceKind::Campus.title(), "Campus");
        assert_eq!(ResourceKind::Role.item_path(7), "v1/roles/7");
    }
}
