// ── Create/update payloads ──
//
// One request type per entity. Optional fields are only serialized when
// set. `validate` mirrors the checks the dashboard forms perform before
// anything is sent.

mod form;
mod types;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::EntityId;

pub use form::{FieldKind, FieldSpec, FormValues, Lookup, Requirement};
pub(crate) use form::push_error;
pub use types::{
    BlockRequest, BuildingRequest, CampusRequest, DepartmentRequest, DepartmentTypeRequest,
    DescribedRequest, RoleRequest, RoomFacilityRequest, RoomRequest, RoomTypeRequest,
    UserRequest,
};

/// Field key → first error message for that field.
pub type FieldErrors = BTreeMap<String, String>;

/// Whether a form creates a new entity or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

impl FormMode {
    pub fn is_create(self) -> bool {
        matches!(self, Self::Create)
    }

    pub fn edit_id(self) -> Option<EntityId> {
        match self {
            Self::Edit(id) => Some(id),
            Self::Create => None,
        }
    }
}

/// A request body that can be filled from a form.
pub trait FormRequest: Serialize + Sized + Send + Sync {
    /// Fields in display order.
    fn fields() -> &'static [FieldSpec];

    /// Parse raw input. Fails only on malformed values (non-numeric
    /// dimensions, bad ids); missing values are left to [`validate`](Self::validate).
    fn from_values(values: &FormValues) -> Result<Self, FieldErrors>;

    /// Check required fields and cross-field rules. Empty means valid.
    fn validate(&self, mode: FormMode) -> FieldErrors;

    /// Last adjustments before sending.
    fn finalize(self, _mode: FormMode) -> Self {
        self
    }

    /// Parse, validate and finalize in one step.
    fn build(values: &FormValues, mode: FormMode) -> Result<Self, FieldErrors> {
        let request = Self::from_values(values)?;
        let errors = request.validate(mode);
        if errors.is_empty() {
            Ok(request.finalize(mode))
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn form_mode_helpers() {
        let id = EntityId::new(5).unwrap();
        assert!(FormMode::Create.is_create());
        assert_eq!(FormMode::Edit(id).edit_id(), Some(id));
        assert_eq!(FormMode::Create.edit_id(), None);
    }
}
