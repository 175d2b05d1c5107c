//! Ware creation requests and their validation.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, DomainResult, WareId};

/// Everything an operator supplied to create a ware.
///
/// The basic fields are optional so that a partially filled request can be
/// reported back with every missing field at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateWare {
    pub name: Option<String>,
    pub id: Option<String>,
    pub kind: Option<String>,
    pub amount: Option<i64>,
    /// Constructor shape index (0 is the basic shape).
    #[serde(default)]
    pub shape: usize,
    /// One value per parameter of the chosen shape.
    #[serde(default)]
    pub extras: Vec<JsonValue>,
}

impl CreateWare {
    /// Request using the basic constructor shape.
    pub fn new(kind: impl Into<String>, name: impl Into<String>, id: impl Into<String>, amount: i64) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id.into()),
            kind: Some(kind.into()),
            amount: Some(amount),
            shape: 0,
            extras: Vec::new(),
        }
    }

    /// Use constructor shape `shape` with its parameter values.
    pub fn with_shape(mut self, shape: usize, extras: Vec<JsonValue>) -> Self {
        self.shape = shape;
        self.extras = extras;
        self
    }

    /// Names of the basic fields that were not supplied.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.as_deref().is_none_or(|s| s.trim().is_empty()) {
            missing.push("id");
        }
        if self.name.as_deref().is_none_or(|s| s.trim().is_empty()) {
            missing.push("name");
        }
        if self.kind.as_deref().is_none_or(|s| s.trim().is_empty()) {
            missing.push("type");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        missing
    }

    /// Check completeness, then the id rules.
    pub fn validate(&self) -> DomainResult<ValidatedWare> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing information: {}",
                missing.join(", ")
            )));
        }

        match (&self.name, &self.id, &self.kind, self.amount) {
            (Some(name), Some(id), Some(kind), Some(amount)) => Ok(ValidatedWare {
                name: name.clone(),
                id: WareId::parse(id)?,
                kind: kind.clone(),
                amount,
                shape: self.shape,
                extras: self.extras.clone(),
            }),
            _ => Err(DomainError::invariant("request changed during validation")),
        }
    }
}

/// A creation request with every basic field present and a well-formed id.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWare {
    pub name: String,
    pub id: WareId,
    pub kind: String,
    pub amount: i64,
    pub shape: usize,
    pub extras: Vec<JsonValue>,
}

impl ValidatedWare {
    /// Values in registry build order: name, id, amount, then the extras.
    pub fn build_values(&self) -> Vec<JsonValue> {
        let mut values = Vec::with_capacity(3 + self.extras.len());
        values.push(JsonValue::from(self.name.as_str()));
        values.push(JsonValue::from(self.id.as_str()));
        values.push(JsonValue::from(self.amount));
        values.extend(self.extras.iter().cloned());
        values
    }
}
