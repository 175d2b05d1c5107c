//! Field alteration against a single ware.
//!
//! The field is located by persistence key in the ware's merged metadata. Unknown
//! keys and immutable fields are silent no-ops; everything else is coerced to the
//! field's declared type first and only then assigned, so a failed alteration
//! leaves the previous value in place.

use stockroom_core::DomainResult;

use crate::command::AlterPayload;
use crate::field::FieldTable;
use crate::value::{FieldValue, coerce, coerce_list};
use crate::ware::Ware;

/// What an alteration did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlterOutcome {
    Applied,
    /// No field of the ware's kind has this key; nothing changed.
    UnknownField,
    /// The field is unique/immutable (the id); nothing changed.
    Immutable,
}

impl AlterOutcome {
    pub fn changed(self) -> bool {
        self == AlterOutcome::Applied
    }
}

/// An alteration checked against a kind's metadata, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedAlter {
    /// Store `value` under `key`.
    Assign { key: &'static str, value: FieldValue },
    /// Nothing to store; the alteration ends with this outcome.
    Skip(AlterOutcome),
}

/// Locate `key` in `fields` and coerce `payload` to the field's type.
///
/// Shared by every backend so they agree on which alterations are no-ops.
pub fn prepare(fields: &FieldTable, key: &str, payload: &AlterPayload) -> DomainResult<PreparedAlter> {
    let Some(descriptor) = fields.by_key(key) else {
        return Ok(PreparedAlter::Skip(AlterOutcome::UnknownField));
    };
    if descriptor.unique {
        return Ok(PreparedAlter::Skip(AlterOutcome::Immutable));
    }

    let value = match payload {
        AlterPayload::Single(value) => coerce(descriptor.field_type, value)?,
        AlterPayload::Many(values) => coerce_list(descriptor.field_type, values)?,
    };
    Ok(PreparedAlter::Assign {
        key: descriptor.key,
        value,
    })
}

pub fn alter(ware: &mut Ware, key: &str, payload: &AlterPayload) -> DomainResult<AlterOutcome> {
    match prepare(ware.field_table(), key, payload)? {
        PreparedAlter::Skip(outcome) => {
            tracing::debug!(id = %ware.ware_id(), key, kind = %ware.kind(), ?outcome, "alteration ignored");
            Ok(outcome)
        }
        PreparedAlter::Assign { key, value } => {
            ware.assign(key, value)?;
            Ok(AlterOutcome::Applied)
        }
    }
}
