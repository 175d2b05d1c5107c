//! Read-only views over a set of wares: summaries, details and attribute search.

use serde::Serialize;

use stockroom_core::{DomainError, DomainResult, WareId};
use stockroom_inventory::{FieldValue, Ware};

/// Pseudo-attribute that yields the kind display name in searches.
pub const TYPE_ATTRIBUTE: &str = "Type";

/// Basic facts about one ware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WareSummary {
    pub name: String,
    pub id: WareId,
    pub amount: i64,
    pub kind: &'static str,
}

impl core::fmt::Display for WareSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({}) x{} [{}]", self.name, self.id, self.amount, self.kind)
    }
}

/// Requested attributes of one ware, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: WareId,
    pub values: Vec<(String, FieldValue)>,
}

pub fn summaries(wares: &[Ware]) -> Vec<WareSummary> {
    wares
        .iter()
        .map(|ware| WareSummary {
            name: ware.name().to_string(),
            id: ware.ware_id().clone(),
            amount: ware.amount(),
            kind: ware.kind().display_name(),
        })
        .collect()
}

/// Every metadata field of ware `id` as (display name, value).
pub fn details(wares: &[Ware], id: &WareId) -> DomainResult<Vec<(&'static str, FieldValue)>> {
    let ware = wares
        .iter()
        .find(|ware| ware.ware_id() == id)
        .ok_or(DomainError::NotFound)?;

    Ok(ware
        .field_table()
        .fields()
        .iter()
        .filter_map(|descriptor| {
            ware.field(descriptor.key)
                .map(|value| (descriptor.display_name, value))
        })
        .collect())
}

/// For each ware, the values of the requested display names it has.
///
/// [`TYPE_ATTRIBUTE`] always resolves; names the ware's kind lacks are skipped.
pub fn search(wares: &[Ware], names: &[&str]) -> Vec<SearchHit> {
    wares
        .iter()
        .map(|ware| {
            let values = names
                .iter()
                .filter_map(|name| {
                    if *name == TYPE_ATTRIBUTE {
                        let kind = FieldValue::Text(ware.kind().display_name().to_string());
                        return Some((name.to_string(), kind));
                    }
                    let descriptor = ware.field_table().by_display_name(name)?;
                    ware.field(descriptor.key).map(|value| (name.to_string(), value))
                })
                .collect();
            SearchHit {
                id: ware.ware_id().clone(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use stockroom_inventory::WareBase;

    use super::*;

    fn wares() -> Vec<Ware> {
        let mut tv = Ware::electronic(WareBase::new("TV", WareId::new("ID-tv4"), 512));
        tv.assign("information", FieldValue::Text("This is an ordinary television.".into()))
            .unwrap();
        vec![
            Ware::liquid(WareBase::new("Water", WareId::new("ID-55t"), 25)),
            tv,
        ]
    }

    #[test]
    fn summaries_carry_kind_display_names() {
        let rows = summaries(&wares());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].kind, "Electronic");
        assert_eq!(rows[0].to_string(), "Water (ID-55t) x25 [Liquid]");
    }

    #[test]
    fn details_list_every_field_of_the_kind() {
        let fields = details(&wares(), &WareId::new("ID-55t")).unwrap();
        let names: Vec<_> = fields.iter().map(|(name, _)| *name).collect();
        assert!(names.contains(&"Boiling Point"));
        assert!(fields.contains(&("Amount", FieldValue::Integer(25))));

        assert_eq!(
            details(&wares(), &WareId::new("ID-none")).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn search_resolves_type_and_skips_missing_attributes() {
        let hits = search(&wares(), &["Name", TYPE_ATTRIBUTE, "Boiling Point"]);
        assert_eq!(hits[0].values.len(), 3);
        assert_eq!(
            hits[1].values,
            vec![
                ("Name".to_string(), FieldValue::Text("TV".into())),
                ("Type".to_string(), FieldValue::Text("Electronic".into())),
            ]
        );
    }
}
