use serde::{Deserialize, Deserializer, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, WareId};

use crate::field::{
    FieldTable, KEY_AMOUNT, KEY_BOILING_POINT, KEY_CATEGORY, KEY_FLASH_POINT, KEY_ID,
    KEY_INFORMATION, KEY_MIN_TEMP, KEY_NAME,
};
use crate::kind::WareKind;
use crate::value::{FieldValue, normalize_category};

/// Fields shared by every ware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WareBase {
    pub id: WareId,
    pub name: String,
    pub amount: i64,
    pub information: Option<String>,
}

impl WareBase {
    pub fn new(name: impl Into<String>, id: WareId, amount: i64) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            information: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidProps {
    pub min_temp: Option<f64>,
    pub boiling_point: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombustibleProps {
    pub liquid: LiquidProps,
    #[serde(default, deserialize_with = "normalized_category")]
    category: Option<u8>,
    pub flash_points: Option<Vec<f64>>,
}

impl CombustibleProps {
    pub fn category(&self) -> Option<u8> {
        self.category
    }

    /// Out-of-range categories are stored as unset.
    pub fn set_category(&mut self, raw: Option<i64>) {
        self.category = raw.and_then(normalize_category);
    }
}

fn normalized_category<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(normalize_category))
}

/// Variant-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WareDetails {
    Liquid(LiquidProps),
    CombustibleLiquid(CombustibleProps),
    Electronic,
}

/// A tracked inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ware {
    base: WareBase,
    details: WareDetails,
}

impl Ware {
    pub fn liquid(base: WareBase) -> Self {
        Self {
            base,
            details: WareDetails::Liquid(LiquidProps::default()),
        }
    }

    pub fn combustible_liquid(base: WareBase) -> Self {
        Self {
            base,
            details: WareDetails::CombustibleLiquid(CombustibleProps::default()),
        }
    }

    pub fn electronic(base: WareBase) -> Self {
        Self {
            base,
            details: WareDetails::Electronic,
        }
    }

    pub fn kind(&self) -> WareKind {
        match self.details {
            WareDetails::Liquid(_) => WareKind::Liquid,
            WareDetails::CombustibleLiquid(_) => WareKind::CombustibleLiquid,
            WareDetails::Electronic => WareKind::Electronic,
        }
    }

    pub fn ware_id(&self) -> &WareId {
        &self.base.id
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn amount(&self) -> i64 {
        self.base.amount
    }

    pub fn information(&self) -> Option<&str> {
        self.base.information.as_deref()
    }

    pub fn details(&self) -> &WareDetails {
        &self.details
    }

    /// Liquid properties, for liquids and everything derived from them.
    pub fn liquid_props(&self) -> Option<&LiquidProps> {
        match &self.details {
            WareDetails::Liquid(props) => Some(props),
            WareDetails::CombustibleLiquid(props) => Some(&props.liquid),
            WareDetails::Electronic => None,
        }
    }

    pub fn combustible_props(&self) -> Option<&CombustibleProps> {
        match &self.details {
            WareDetails::CombustibleLiquid(props) => Some(props),
            _ => None,
        }
    }

    pub fn field_table(&self) -> &'static FieldTable {
        FieldTable::for_kind(self.kind())
    }

    /// Current value of the field with persistence key `key`.
    ///
    /// `None` when this ware's kind has no such field.
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.field_table().by_key(key)?;
        let value = match key {
            KEY_NAME => FieldValue::Text(self.base.name.clone()),
            KEY_ID => FieldValue::Text(self.base.id.to_string()),
            KEY_AMOUNT => FieldValue::Integer(self.base.amount),
            KEY_INFORMATION => text_or_null(self.base.information.as_deref()),
            KEY_MIN_TEMP => float_or_null(self.liquid_props()?.min_temp),
            KEY_BOILING_POINT => float_or_null(self.liquid_props()?.boiling_point),
            KEY_CATEGORY => self
                .combustible_props()?
                .category
                .map_or(FieldValue::Null, FieldValue::Category),
            KEY_FLASH_POINT => self
                .combustible_props()?
                .flash_points
                .clone()
                .map_or(FieldValue::Null, FieldValue::FloatList),
            _ => return None,
        };
        Some(value)
    }

    /// Assign an already-coerced value to a mutable field.
    ///
    /// Fails without touching the ware if the field is unknown, immutable,
    /// or the value does not match the field's type.
    pub fn assign(&mut self, key: &str, value: FieldValue) -> DomainResult<()> {
        let descriptor = self
            .field_table()
            .by_key(key)
            .ok_or_else(|| DomainError::validation(format!("{} has no field {key}", self.kind())))?;
        if descriptor.unique {
            return Err(DomainError::invariant(format!("{key} cannot be changed")));
        }

        let wrong_type = |value: &FieldValue| {
            DomainError::conversion(format!("{value:?} does not fit {key} ({})", descriptor.field_type))
        };

        match (key, value) {
            (KEY_NAME, FieldValue::Text(s)) => self.base.name = s,
            (KEY_AMOUNT, FieldValue::Integer(n)) => self.base.amount = n,
            (KEY_INFORMATION, FieldValue::Text(s)) => self.base.information = Some(s),
            (KEY_INFORMATION, FieldValue::Null) => self.base.information = None,
            (KEY_MIN_TEMP, v @ (FieldValue::Float(_) | FieldValue::Null)) => {
                let slot = &mut self.liquid_props_mut().ok_or_else(|| wrong_type(&v))?.min_temp;
                *slot = float_of(&v);
            }
            (KEY_BOILING_POINT, v @ (FieldValue::Float(_) | FieldValue::Null)) => {
                let slot = &mut self.liquid_props_mut().ok_or_else(|| wrong_type(&v))?.boiling_point;
                *slot = float_of(&v);
            }
            (KEY_CATEGORY, v @ (FieldValue::Category(_) | FieldValue::Null)) => {
                let props = self.combustible_props_mut().ok_or_else(|| wrong_type(&v))?;
                let raw = match v {
                    FieldValue::Category(c) => Some(i64::from(c)),
                    _ => None,
                };
                props.set_category(raw);
            }
            (KEY_FLASH_POINT, v @ (FieldValue::FloatList(_) | FieldValue::Null)) => {
                let props = self.combustible_props_mut().ok_or_else(|| wrong_type(&v))?;
                props.flash_points = match v {
                    FieldValue::FloatList(items) => Some(items),
                    _ => None,
                };
            }
            (_, other) => return Err(wrong_type(&other)),
        }
        Ok(())
    }

    /// Apply a signed change to the amount.
    pub fn adjust_amount(&mut self, delta: i64) -> DomainResult<i64> {
        let new_amount = self
            .base
            .amount
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("amount overflow"))?;
        self.base.amount = new_amount;
        Ok(new_amount)
    }

    fn liquid_props_mut(&mut self) -> Option<&mut LiquidProps> {
        match &mut self.details {
            WareDetails::Liquid(props) => Some(props),
            WareDetails::CombustibleLiquid(props) => Some(&mut props.liquid),
            WareDetails::Electronic => None,
        }
    }

    fn combustible_props_mut(&mut self) -> Option<&mut CombustibleProps> {
        match &mut self.details {
            WareDetails::CombustibleLiquid(props) => Some(props),
            _ => None,
        }
    }
}

impl Entity for Ware {
    type Id = WareId;

    fn id(&self) -> &Self::Id {
        &self.base.id
    }
}

fn text_or_null(value: Option<&str>) -> FieldValue {
    value.map_or(FieldValue::Null, |s| FieldValue::Text(s.to_string()))
}

fn float_or_null(value: Option<f64>) -> FieldValue {
    value.map_or(FieldValue::Null, FieldValue::Float)
}

fn float_of(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Float(f) => Some(*f),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Ware {
        Ware::liquid(WareBase::new("Water", WareId::new("ID-55t"), 25))
    }

    #[test]
    fn reads_follow_the_kind_metadata() {
        let ware = water();
        assert_eq!(ware.field(KEY_NAME), Some(FieldValue::Text("Water".into())));
        assert_eq!(ware.field(KEY_AMOUNT), Some(FieldValue::Integer(25)));
        assert_eq!(ware.field(KEY_BOILING_POINT), Some(FieldValue::Null));
        assert_eq!(ware.field(KEY_CATEGORY), None);
        assert_eq!(ware.field("colour"), None);
    }

    #[test]
    fn assign_rejects_the_id_and_foreign_fields() {
        let mut ware = water();
        assert!(ware.assign(KEY_ID, FieldValue::Text("ID-66t".into())).is_err());
        assert!(ware.assign(KEY_FLASH_POINT, FieldValue::FloatList(vec![1.0])).is_err());
        assert_eq!(ware.ware_id().as_str(), "ID-55t");
    }

    #[test]
    fn assign_rejects_mismatched_values_without_changes() {
        let mut ware = water();
        let err = ware.assign(KEY_AMOUNT, FieldValue::Text("many".into())).unwrap_err();
        assert!(matches!(err, DomainError::Conversion(_)));
        assert_eq!(ware.amount(), 25);
    }

    #[test]
    fn combustible_liquids_inherit_liquid_fields() {
        let mut ware = Ware::combustible_liquid(WareBase::new("FOOF", WareId::new("ID-5q1"), 10));
        ware.assign(KEY_MIN_TEMP, FieldValue::Float(-163.0)).unwrap();
        ware.assign(KEY_CATEGORY, FieldValue::Category(1)).unwrap();
        assert_eq!(ware.liquid_props().unwrap().min_temp, Some(-163.0));
        assert_eq!(ware.combustible_props().unwrap().category(), Some(1));

        ware.assign(KEY_CATEGORY, FieldValue::Category(9)).unwrap();
        assert_eq!(ware.field(KEY_CATEGORY), Some(FieldValue::Null));
    }

    #[test]
    fn amount_adjustments_are_checked() {
        let mut ware = water();
        assert_eq!(ware.adjust_amount(5).unwrap(), 30);
        assert_eq!(ware.adjust_amount(-40).unwrap(), -10);
        assert!(ware.adjust_amount(i64::MAX).is_ok());
        assert!(ware.adjust_amount(i64::MAX).is_err());
    }

    #[test]
    fn deserialized_categories_are_normalized() {
        let ware = Ware::combustible_liquid(WareBase::new("FOOF", WareId::new("ID-5q1"), 10));
        let mut raw = serde_json::to_value(&ware).unwrap();
        raw["details"]["category"] = serde_json::json!(9);

        let read: Ware = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(read.combustible_props().unwrap().category(), None);
        assert_eq!(read.field(KEY_CATEGORY), Some(FieldValue::Null));

        raw["details"]["category"] = serde_json::json!(3);
        let read: Ware = serde_json::from_value(raw).unwrap();
        assert_eq!(read.field(KEY_CATEGORY), Some(FieldValue::Category(3)));
    }
}
