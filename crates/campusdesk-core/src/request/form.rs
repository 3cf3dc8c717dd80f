// ── Declarative form fields ──
//
// Each request type publishes a list of `FieldSpec`s. The CLI turns them
// into prompts and flags, the TUI into an edit form. Raw input travels as
// `FormValues` (field key → text) and is parsed into the typed request.

use std::collections::BTreeMap;

use campusdesk_api::ResourceKind;

use super::{FieldErrors, FormMode};
use crate::model::EntityId;

/// Where a choice field takes its options from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Resource(ResourceKind),
    Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Email,
    Password,
    /// Non-negative decimal (metres).
    Decimal,
    /// Non-negative whole number.
    Count,
    /// Single related entity, entered as its id.
    Choice(Lookup),
    /// Several related entities, entered as comma-separated ids.
    MultiChoice(Lookup),
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Always,
    /// Required when creating, optional when editing (passwords).
    OnCreate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
}

impl FieldSpec {
    pub const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            requirement: Requirement::Always,
        }
    }

    pub const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            requirement: Requirement::Optional,
        }
    }

    pub const fn on_create(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            requirement: Requirement::OnCreate,
        }
    }

    pub fn is_required(&self, mode: FormMode) -> bool {
        match self.requirement {
            Requirement::Always => true,
            Requirement::OnCreate => mode.is_create(),
            Requirement::Optional => false,
        }
    }

    pub fn is_secret(&self) -> bool {
        self.kind == FieldKind::Password
    }
}

/// Raw text input keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Store an optional value, leaving the key unset for `None`.
    #[must_use]
    pub fn with_opt(mut self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        if let Some(v) = value {
            self.set(key, v.to_string());
        }
        self
    }

    /// Raw value exactly as entered (empty when unset).
    pub fn raw(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Trimmed text, empty when unset.
    pub fn text(&self, key: &str) -> String {
        self.raw(key).trim().to_owned()
    }

    /// Trimmed text, `None` when blank.
    pub fn opt_text(&self, key: &str) -> Option<String> {
        let t = self.raw(key).trim();
        (!t.is_empty()).then(|| t.to_owned())
    }

    /// Secret text is not trimmed; blank is `None`.
    pub fn opt_secret(&self, key: &str) -> Option<String> {
        let raw = self.raw(key);
        (!raw.is_empty()).then(|| raw.to_owned())
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.raw(key).trim().to_ascii_lowercase().as_str() {
            "" => default,
            "1" | "true" | "yes" | "y" | "on" | "active" => true,
            _ => false,
        }
    }

    pub(crate) fn id(&self, key: &str, label: &str, errors: &mut FieldErrors) -> Option<EntityId> {
        let raw = self.raw(key).trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse().map_or_else(
            |_| {
                push_error(errors, key, format!("{label} must be a valid id"));
                None
            },
            Some,
        )
    }

    pub(crate) fn ids(&self, key: &str, label: &str, errors: &mut FieldErrors) -> Vec<EntityId> {
        let mut out = Vec::new();
        for part in self
            .raw(key)
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
        {
            match part.parse::<EntityId>() {
                Ok(id) if !out.contains(&id) => out.push(id),
                Ok(_) => {}
                Err(_) => push_error(errors, key, format!("{label} must be a list of ids")),
            }
        }
        out
    }

    /// Decimal; blank reads as `0`.
    pub(crate) fn decimal(&self, key: &str, label: &str, errors: &mut FieldErrors) -> f64 {
        let raw = self.raw(key).trim();
        if raw.is_empty() {
            return 0.0;
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => {
                push_error(errors, key, format!("{label} must be a number"));
                0.0
            }
        }
    }

    pub(crate) fn count(&self, key: &str, label: &str, errors: &mut FieldErrors) -> Option<u64> {
        let raw = self.raw(key).trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<u64>().map_or_else(
            |_| {
                push_error(
                    errors,
                    key,
                    format!("{label} must be a non-negative whole number"),
                );
                None
            },
            Some,
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Record an error unless the field already has one.
pub(crate) fn push_error(errors: &mut FieldErrors, key: &str, message: impl Into<String>) {
    errors
        .entry(key.to_owned())
        .or_insert_with(|| message.into());
}
