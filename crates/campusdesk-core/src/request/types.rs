use campusdesk_api::ResourceKind;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use super::{
    FieldErrors, FieldKind, FieldSpec, FormMode, FormRequest, FormValues, Lookup, push_error,
};
use crate::model::EntityId;

const NAME: FieldSpec = FieldSpec::required("name", "Name", FieldKind::Text);
const DESCRIPTION: FieldSpec =
    FieldSpec::optional("description", "Description", FieldKind::LongText);

fn require_name(name: &str, errors: &mut FieldErrors) {
    if name.trim().is_empty() {
        push_error(errors, "name", "Name is required");
    }
}

fn require_id(id: Option<EntityId>, key: &str, label: &str, errors: &mut FieldErrors) {
    if id.is_none() {
        push_error(errors, key, format!("{label} is required"));
    }
}

fn parsed<T>(value: T, errors: FieldErrors) -> Result<T, FieldErrors> {
    if errors.is_empty() { Ok(value) } else { Err(errors) }
}

// ── Name + description ──────────────────────────────────────────────

/// Body shared by entities that only carry a name and a description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DescribedRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub type CampusRequest = DescribedRequest;
pub type RoomTypeRequest = DescribedRequest;
pub type RoomFacilityRequest = DescribedRequest;
pub type DepartmentTypeRequest = DescribedRequest;

impl FormRequest for DescribedRequest {
    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[NAME, DESCRIPTION];
        FIELDS
    }

    fn from_values(values: &FormValues) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: values.text("name"),
            description: values.opt_text("description"),
        })
    }

    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_name(&self.name, &mut errors);
        errors
    }
}

// ── Block ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus_id: Option<EntityId>,
}

impl FormRequest for BlockRequest {
    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            NAME,
            DESCRIPTION,
            FieldSpec::required(
                "campus_id",
                "Campus",
                FieldKind::Choice(Lookup::Resource(ResourceKind::Campus)),
            ),
        ];
        FIELDS
    }

    fn from_values(values: &FormValues) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let campus_id = values.id("campus_id", "Campus", &mut errors);
        parsed(
            Self {
                name: values.text("name"),
                description: values.opt_text("description"),
                campus_id,
            },
            errors,
        )
    }

    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_name(&self.name, &mut errors);
        require_id(self.campus_id, "campus_id", "Campus", &mut errors);
        errors
    }
}

// ── Building ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildingRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub length: f64,
    pub width: f64,
    pub floors: u64,
    pub basements: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<EntityId>,
}

impl FormRequest for BuildingRequest {
    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            NAME,
            DESCRIPTION,
            FieldSpec::optional("length", "Length (m)", FieldKind::Decimal),
            FieldSpec::optional("width", "Width (m)", FieldKind::Decimal),
            FieldSpec::optional("floors", "Floors", FieldKind::Count),
            FieldSpec::optional("basements", "Basements", FieldKind::Count),
            FieldSpec::optional("remarks", "Remarks", FieldKind::LongText),
            FieldSpec::required(
                "block_id",
                "Block",
                FieldKind::Choice(Lookup::Resource(ResourceKind::Block)),
            ),
        ];
        FIELDS
    }

    fn from_values(values: &FormValues) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let request = Self {
            name: values.text("name"),
            description: values.opt_text("description"),
            length: values.decimal("length", "Length", &mut errors),
            width: values.decimal("width", "Width", &mut errors),
            floors: values.count("floors", "Floors", &mut errors).unwrap_or(0),
            basements: values
                .count("basements", "Basements", &mut errors)
                .unwrap_or(0),
            remarks: values.opt_text("remarks"),
            block_id: values.id("block_id", "Block", &mut errors),
        };
        parsed(request, errors)
    }

    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_name(&self.name, &mut errors);
        if self.length < 0.0 {
            push_error(&mut errors, "length", "Length must not be negative");
        }
        if self.width < 0.0 {
            push_error(&mut errors, "width", "Width must not be negative");
        }
        require_id(self.block_id, "block_id", "Block", &mut errors);
        errors
    }
}

// ── Room ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_type_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_id: Option<EntityId>,
}

impl FormRequest for RoomRequest {
    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            NAME,
            FieldSpec::required("code", "Code", FieldKind::Text),
            FieldSpec::optional("capacity", "Capacity", FieldKind::Count),
            FieldSpec::optional(
                "room_type_id",
                "Room type",
                FieldKind::Choice(Lookup::Resource(ResourceKind::RoomType)),
            ),
            FieldSpec::optional(
                "department_type_id",
                "Department type",
                FieldKind::Choice(Lookup::Resource(ResourceKind::DepartmentType)),
            ),
            DESCRIPTION,
            FieldSpec::required(
                "building_id",
                "Building",
                FieldKind::Choice(Lookup::Resource(ResourceKind::Building)),
            ),
        ];
        FIELDS
    }

    fn from_values(values: &FormValues) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let request = Self {
            name: values.text("name"),
            code: values.opt_text("code"),
            capacity: values.count("capacity", "Capacity", &mut errors),
            room_type_id: values.id("room_type_id", "Room type", &mut errors),
            department_type_id: values.id("department_type_id", "Department type", &mut errors),
            description: values.opt_text("description"),
            building_id: values.id("building_id", "Building", &mut errors),
        };
        parsed(request, errors)
    }

    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_name(&self.name, &mut errors);
        if self.code.is_none() {
            push_error(&mut errors, "code", "Code is required");
        }
        require_id(self.building_id, "building_id", "Building", &mut errors);
        errors
    }
}

// ── Department ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepartmentRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_type_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FormRequest for DepartmentRequest {
    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            NAME,
            FieldSpec::required(
                "department_type_id",
                "Department type",
                FieldKind::Choice(Lookup::Resource(ResourceKind::DepartmentType)),
            ),
            DESCRIPTION,
        ];
        FIELDS
    }

    fn from_values(values: &FormValues) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let department_type_id = values.id("department_type_id", "Department type", &mut errors);
        parsed(
            Self {
                name: values.text("name"),
                department_type_id,
                description: values.opt_text("description"),
            },
            errors,
        )
    }

    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_name(&self.name, &mut errors);
        require_id(
            self.department_type_id,
            "department_type_id",
            "Department type",
            &mut errors,
        );
        errors
    }
}

// ── Role ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Permission ids granted to the role.
    pub permissions: Vec<EntityId>,
}

impl FormRequest for RoleRequest {
    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            NAME,
            DESCRIPTION,
            FieldSpec::optional(
                "permissions",
                "Permissions",
                FieldKind::MultiChoice(Lookup::Permissions),
            ),
        ];
        FIELDS
    }

    fn from_values(values: &FormValues) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let permissions = values.ids("permissions", "Permissions", &mut errors);
        parsed(
            Self {
                name: values.text("name"),
                description: values.opt_text("description"),
                permissions,
            },
            errors,
        )
    }

    fn validate(&self, _mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_name(&self.name, &mut errors);
        errors
    }
}

// ── User ────────────────────────────────────────────────────────────

#[allow(clippy::ref_option)]
fn expose_opt<S: Serializer>(value: &Option<SecretString>, s: S) -> Result<S::Ok, S::Error> {
    value.as_ref().map(ExposeSecret::expose_secret).serialize(s)
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "expose_opt")]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "expose_opt")]
    pub password_confirmation: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<EntityId>,
    pub is_active: bool,
}

impl FormRequest for UserRequest {
    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            NAME,
            FieldSpec::required("email", "Email", FieldKind::Email),
            FieldSpec::on_create("password", "Password", FieldKind::Password),
            FieldSpec::on_create(
                "password_confirmation",
                "Confirm password",
                FieldKind::Password,
            ),
            FieldSpec::required(
                "role_id",
                "Role",
                FieldKind::Choice(Lookup::Resource(ResourceKind::Role)),
            ),
            FieldSpec::optional(
                "department_id",
                "Department",
                FieldKind::Choice(Lookup::Resource(ResourceKind::Department)),
            ),
            FieldSpec::optional("is_active", "Active", FieldKind::Toggle),
        ];
        FIELDS
    }

    fn from_values(values: &FormValues) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let request = Self {
            name: values.text("name"),
            email: values.text("email"),
            password: values.opt_secret("password").map(SecretString::from),
            password_confirmation: values
                .opt_secret("password_confirmation")
                .map(SecretString::from),
            role_id: values.id("role_id", "Role", &mut errors),
            department_id: values.id("department_id", "Department", &mut errors),
            is_active: values.flag("is_active", true),
        };
        parsed(request, errors)
    }

    fn validate(&self, mode: FormMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_name(&self.name, &mut errors);
        if self.email.trim().is_empty() {
            push_error(&mut errors, "email", "Email is required");
        }

        let password = self.password.as_ref().map(ExposeSecret::expose_secret);
        let confirmation = self
            .password_confirmation
            .as_ref()
            .map(ExposeSecret::expose_secret);
        if mode.is_create() && password.is_none() {
            push_error(&mut errors, "password", "Password is required");
        }
        if (mode.is_create() || password.is_some()) && password != confirmation {
            push_error(&mut errors, "password_confirmation", "Passwords don't match");
        }

        require_id(self.role_id, "role_id", "Role", &mut errors);
        errors
    }

    /// On edit, blank passwords are dropped so the current one is kept.
    fn finalize(mut self, mode: FormMode) -> Self {
        if !mode.is_create() && self.password.is_none() {
            self.password_confirmation = None;
        }
        self
    }
}
