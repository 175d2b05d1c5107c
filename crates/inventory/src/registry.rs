//! Ware kind registry: which kinds exist, how each can be constructed, and
//! dynamic construction from ordered generic values.
//!
//! Each kind registers a blank constructor plus an ordered list of constructor
//! shapes. A shape names the extra parameters (beyond `name`, `id`, `amount`)
//! accepted by one way of building the kind; shape 0 is always the basic one
//! with no extras. Building never needs the concrete type at the call site:
//! values are coerced through field metadata and assigned onto the blank ware.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use stockroom_core::{DomainError, DomainResult, WareId};

use crate::field::{
    BASE_KEYS, FieldTable, FieldType, KEY_BOILING_POINT, KEY_CATEGORY, KEY_FLASH_POINT,
    KEY_INFORMATION, KEY_MIN_TEMP,
};
use crate::kind::{WareKind, normalize_kind_name};
use crate::value::{coerce, coerce_integer, coerce_text};
use crate::ware::{Ware, WareBase};

/// Errors that can occur during registry construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate ware kind: {0}")]
    DuplicateKind(String),

    #[error("Kind {0} must declare the basic (empty) shape first")]
    MissingBasicShape(String),

    #[error("Kind {kind} declares shape {index} twice")]
    DuplicateShape { kind: String, index: usize },

    #[error("Kind {kind} has no optional field {key} for shape parameter {param}")]
    UnknownShapeField {
        kind: String,
        param: String,
        key: String,
    },
}

/// One parameter of a constructor shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeParam {
    /// Parameter name shown when prompting for the value.
    pub name: &'static str,
    /// Persistence key of the field the parameter fills.
    pub key: &'static str,
    pub field_type: FieldType,
}

/// Ordered extra parameters of one way to construct a kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConstructorShape {
    params: Vec<ShapeParam>,
}

impl ConstructorShape {
    pub fn params(&self) -> &[ShapeParam] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `(parameter name, parameter type)` pairs in order.
    pub fn signature(&self) -> Vec<(&'static str, FieldType)> {
        self.params.iter().map(|p| (p.name, p.field_type)).collect()
    }

    /// Number of values `build` expects for this shape (base fields included).
    pub fn arity(&self) -> usize {
        BASE_KEYS.len() + self.params.len()
    }
}

/// Creates a ware of one kind with default variant state.
pub type BlankConstructor = fn(WareBase) -> Ware;

/// A registered kind.
#[derive(Debug)]
pub struct VariantDef {
    kind: WareKind,
    shapes: Vec<ConstructorShape>,
    construct: BlankConstructor,
}

impl VariantDef {
    pub fn kind(&self) -> WareKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    /// All shapes, basic shape first.
    pub fn shapes(&self) -> &[ConstructorShape] {
        &self.shapes
    }

    /// Shapes offered for interactive entry (the basic shape excluded).
    pub fn extra_shapes(&self) -> &[ConstructorShape] {
        self.shapes.get(1..).unwrap_or(&[])
    }

    pub fn fields(&self) -> &'static FieldTable {
        FieldTable::for_kind(self.kind)
    }
}

/// Which column of the field metadata to report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NameColumn {
    Display,
    Key,
}

/// The Registry provides runtime lookup of ware kinds.
/// It is immutable after construction.
#[derive(Debug)]
pub struct WareRegistry {
    /// Variants in registration order.
    variants: Vec<VariantDef>,
    /// Normalized kind name → index into `variants`.
    by_name: HashMap<String, usize>,
}

impl WareRegistry {
    /// Registry of every kind compiled into the program.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut builder = WareRegistryBuilder::new();

        builder
            .add_variant(WareKind::Liquid, Ware::liquid)
            .shape(&[])
            .shape(&[("information", KEY_INFORMATION)])
            .shape(&[("minTemp", KEY_MIN_TEMP), ("boilingPoint", KEY_BOILING_POINT)])
            .shape(&[
                ("information", KEY_INFORMATION),
                ("minTemp", KEY_MIN_TEMP),
                ("boilingPoint", KEY_BOILING_POINT),
            ])
            .done()?;

        builder
            .add_variant(WareKind::CombustibleLiquid, Ware::combustible_liquid)
            .shape(&[])
            .shape(&[("information", KEY_INFORMATION)])
            .shape(&[("minTemp", KEY_MIN_TEMP), ("boilingPoint", KEY_BOILING_POINT)])
            .shape(&[
                ("information", KEY_INFORMATION),
                ("minTemp", KEY_MIN_TEMP),
                ("boilingPoint", KEY_BOILING_POINT),
            ])
            .shape(&[
                ("minTemp", KEY_MIN_TEMP),
                ("category", KEY_CATEGORY),
                ("boilingPoint", KEY_BOILING_POINT),
                ("flashPoint", KEY_FLASH_POINT),
            ])
            .shape(&[
                ("information", KEY_INFORMATION),
                ("minTemp", KEY_MIN_TEMP),
                ("category", KEY_CATEGORY),
                ("boilingPoint", KEY_BOILING_POINT),
                ("flashPoint", KEY_FLASH_POINT),
            ])
            .done()?;

        builder
            .add_variant(WareKind::Electronic, Ware::electronic)
            .shape(&[])
            .shape(&[("information", KEY_INFORMATION)])
            .done()?;

        builder.build()
    }

    // ==================== Kind Lookups ====================

    /// Display names of every registered kind, in registration order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.variants.iter().map(VariantDef::name).collect()
    }

    /// Look up a kind by name (whitespace and ASCII case are ignored).
    pub fn variant(&self, name: &str) -> DomainResult<&VariantDef> {
        self.by_name
            .get(&normalize_kind_name(name))
            .map(|idx| &self.variants[*idx])
            .ok_or_else(|| DomainError::unknown_kind(name))
    }

    pub fn variant_of(&self, kind: WareKind) -> Option<&VariantDef> {
        self.variants.iter().find(|v| v.kind == kind)
    }

    pub fn resolve(&self, name: &str) -> DomainResult<WareKind> {
        self.variant(name).map(VariantDef::kind)
    }

    // ==================== Shapes & Fields ====================

    /// Every constructor shape of a kind (shape 0 is the basic one).
    pub fn shapes(&self, name: &str) -> DomainResult<&[ConstructorShape]> {
        Ok(self.variant(name)?.shapes())
    }

    /// Shapes to offer interactively (without the basic one).
    pub fn extra_shapes(&self, name: &str) -> DomainResult<&[ConstructorShape]> {
        Ok(self.variant(name)?.extra_shapes())
    }

    pub fn has_alternate_shapes(&self, name: &str) -> DomainResult<bool> {
        Ok(!self.variant(name)?.extra_shapes().is_empty())
    }

    /// Non-base fields of a kind as `(persistence key, type)`.
    pub fn optional_fields(&self, name: &str) -> DomainResult<Vec<(&'static str, FieldType)>> {
        Ok(self
            .variant(name)?
            .fields()
            .optional_fields()
            .map(|f| (f.key, f.field_type))
            .collect())
    }

    /// De-duplicated names of every field of every kind.
    pub fn searchable_names(&self, column: NameColumn) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for variant in &self.variants {
            for field in variant.fields().fields() {
                let name = match column {
                    NameColumn::Display => field.display_name,
                    NameColumn::Key => field.key,
                };
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    // ==================== Construction ====================

    /// Build a ware of kind `name` using constructor shape `shape`.
    ///
    /// `values` holds `name`, `id`, `amount` followed by one value per shape
    /// parameter. All values are coerced before anything is constructed.
    pub fn build(&self, name: &str, shape: usize, values: &[JsonValue]) -> DomainResult<Ware> {
        let variant = self.variant(name)?;
        let chosen = variant
            .shapes
            .get(shape)
            .ok_or_else(|| DomainError::UnknownShape {
                kind: variant.name().to_string(),
                index: shape,
            })?;

        if values.len() != chosen.arity() {
            return Err(DomainError::Arity {
                expected: chosen.arity(),
                actual: values.len(),
            });
        }

        let (base, extras) = values.split_at(BASE_KEYS.len());
        let ware_name = coerce_text(&base[0])?;
        let id = WareId::new(coerce_text(&base[1])?);
        let amount = coerce_integer(&base[2])?;

        let extras = chosen
            .params
            .iter()
            .zip(extras)
            .map(|(param, value)| -> DomainResult<_> {
                Ok((param.key, coerce(param.field_type, value)?))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let mut ware = (variant.construct)(WareBase::new(ware_name, id, amount));
        for (key, value) in extras {
            ware.assign(key, value)?;
        }

        tracing::debug!(kind = %variant.kind, shape, id = %ware.ware_id(), "ware built");
        Ok(ware)
    }
}

/// Builder for constructing an immutable WareRegistry.
#[derive(Debug, Default)]
pub struct WareRegistryBuilder {
    variants: Vec<VariantDef>,
}

impl WareRegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind together with its blank constructor.
    pub fn add_variant(&mut self, kind: WareKind, construct: BlankConstructor) -> VariantBuilder<'_> {
        VariantBuilder {
            builder: self,
            kind,
            construct,
            shapes: Vec::new(),
        }
    }

    /// Build the registry. A kind registered twice is rejected here.
    pub fn build(self) -> Result<WareRegistry, RegistryError> {
        let mut by_name = HashMap::with_capacity(self.variants.len());
        for (idx, variant) in self.variants.iter().enumerate() {
            if by_name.insert(normalize_kind_name(variant.name()), idx).is_some() {
                return Err(RegistryError::DuplicateKind(variant.name().to_string()));
            }
        }
        Ok(WareRegistry {
            variants: self.variants,
            by_name,
        })
    }
}

/// Builder for one kind's constructor shapes.
pub struct VariantBuilder<'a> {
    builder: &'a mut WareRegistryBuilder,
    kind: WareKind,
    construct: BlankConstructor,
    shapes: Vec<Vec<(&'static str, &'static str)>>,
}

impl VariantBuilder<'_> {
    /// Add a shape as `(parameter name, field key)` pairs.
    pub fn shape(mut self, params: &[(&'static str, &'static str)]) -> Self {
        self.shapes.push(params.to_vec());
        self
    }

    /// Validate the shapes and register the kind.
    pub fn done(self) -> Result<WareKind, RegistryError> {
        let kind_name = self.kind.display_name().to_string();
        if self.shapes.first().is_none_or(|basic| !basic.is_empty()) {
            return Err(RegistryError::MissingBasicShape(kind_name));
        }

        let table = FieldTable::for_kind(self.kind);
        let mut shapes: Vec<ConstructorShape> = Vec::with_capacity(self.shapes.len());
        for (index, raw) in self.shapes.iter().enumerate() {
            let params = raw
                .iter()
                .map(|(param, key)| {
                    table
                        .by_key(key)
                        .filter(|f| !BASE_KEYS.contains(&f.key))
                        .map(|f| ShapeParam {
                            name: *param,
                            key: f.key,
                            field_type: f.field_type,
                        })
                        .ok_or_else(|| RegistryError::UnknownShapeField {
                            kind: kind_name.clone(),
                            param: param.to_string(),
                            key: key.to_string(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let shape = ConstructorShape { params };
            if shapes.contains(&shape) {
                return Err(RegistryError::DuplicateShape {
                    kind: kind_name,
                    index,
                });
            }
            shapes.push(shape);
        }

        self.builder.variants.push(VariantDef {
            kind: self.kind,
            shapes,
            construct: self.construct,
        });
        Ok(self.kind)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::value::FieldValue;

    fn registry() -> WareRegistry {
        WareRegistry::standard().unwrap()
    }

    #[test]
    fn lists_every_concrete_kind() {
        assert_eq!(
            registry().kinds(),
            vec!["Liquid", "Combustible Liquid", "Electronic"]
        );
    }

    #[test]
    fn shapes_exclude_base_parameters() {
        let reg = registry();
        let shapes = reg.shapes("Liquid").unwrap();
        assert_eq!(shapes.len(), 4);
        assert!(shapes[0].is_empty());
        assert_eq!(
            shapes[2].signature(),
            vec![("minTemp", FieldType::OptionalFloat), ("boilingPoint", FieldType::OptionalFloat)]
        );
        for shape in shapes {
            assert!(shape.params().iter().all(|p| !BASE_KEYS.contains(&p.key)));
        }
    }

    #[test]
    fn extra_shapes_skip_the_basic_one() {
        let reg = registry();
        assert_eq!(reg.extra_shapes("Electronic").unwrap().len(), 1);
        assert_eq!(reg.extra_shapes("CombustibleLiquid").unwrap().len(), 5);
        assert!(reg.has_alternate_shapes("Electronic").unwrap());
    }

    #[test]
    fn builds_without_naming_the_concrete_type() {
        let ware = registry()
            .build("Liquid", 0, &[json!("Water"), json!("ID-55t"), json!(25)])
            .unwrap();
        assert_eq!(ware.kind(), WareKind::Liquid);
        assert_eq!(ware.name(), "Water");
        assert_eq!(ware.amount(), 25);
    }

    #[test]
    fn out_of_range_category_is_normalized_at_build() {
        let ware = registry()
            .build(
                "CombustibleLiquid",
                4,
                &[json!("FOOF"), json!("ID-5q1"), json!(10), json!(-163), json!(9), json!(-57), json!([1.5])],
            )
            .unwrap();
        assert_eq!(ware.field(KEY_CATEGORY), Some(FieldValue::Null));
        assert_eq!(ware.field(KEY_MIN_TEMP), Some(FieldValue::Float(-163.0)));
        assert_eq!(ware.field(KEY_FLASH_POINT), Some(FieldValue::FloatList(vec![1.5])));
    }

    #[test]
    fn build_errors() {
        let reg = registry();
        assert_eq!(
            reg.build("Gas", 0, &[]).unwrap_err(),
            DomainError::unknown_kind("Gas")
        );
        assert_eq!(
            reg.build("Liquid", 2, &[json!("Water"), json!("ID-55t"), json!(25)]).unwrap_err(),
            DomainError::Arity { expected: 5, actual: 3 }
        );
        assert!(matches!(
            reg.build("Liquid", 9, &[]).unwrap_err(),
            DomainError::UnknownShape { index: 9, .. }
        ));
        assert!(matches!(
            reg.build("Liquid", 0, &[json!("Water"), json!("ID-55t"), json!("lots")]).unwrap_err(),
            DomainError::Conversion(_)
        ));
    }

    #[test]
    fn optional_fields_drive_relational_prompts() {
        let fields = registry().optional_fields("Combustible Liquid").unwrap();
        let keys: Vec<_> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["information", "minTemp", "boilingPoint", "dangerCategory", "flashPoint"]
        );
    }

    #[test]
    fn searchable_names_are_deduplicated() {
        let names = registry().searchable_names(NameColumn::Display);
        assert_eq!(names.iter().filter(|n| **n == "Name").count(), 1);
        assert!(names.contains(&"Flash Point"));
        let keys = registry().searchable_names(NameColumn::Key);
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn builder_rejects_malformed_variants() {
        let mut builder = WareRegistryBuilder::new();
        assert_eq!(
            builder
                .add_variant(WareKind::Electronic, Ware::electronic)
                .shape(&[("information", KEY_INFORMATION)])
                .done(),
            Err(RegistryError::MissingBasicShape("Electronic".into()))
        );
        assert!(matches!(
            builder
                .add_variant(WareKind::Electronic, Ware::electronic)
                .shape(&[])
                .shape(&[("boilingPoint", KEY_BOILING_POINT)])
                .done(),
            Err(RegistryError::UnknownShapeField { .. })
        ));
        assert!(matches!(
            builder
                .add_variant(WareKind::Electronic, Ware::electronic)
                .shape(&[])
                .shape(&[])
                .done(),
            Err(RegistryError::DuplicateShape { index: 1, .. })
        ));
    }

    #[test]
    fn build_rejects_a_kind_registered_twice() {
        let mut builder = WareRegistryBuilder::new();
        for _ in 0..2 {
            builder
                .add_variant(WareKind::Electronic, Ware::electronic)
                .shape(&[])
                .done()
                .unwrap();
        }
        assert!(matches!(
            builder.build(),
            Err(RegistryError::DuplicateKind(name)) if name == "Electronic"
        ));
    }
}
