use serde::{Deserialize, Serialize};

/// Concrete ware variant.
///
/// The abstract base ("ware") is not a kind: every kind extends it, and its
/// fields are the root of every metadata table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WareKind {
    Liquid,
    CombustibleLiquid,
    Electronic,
}

impl WareKind {
    /// Every kind, in declaration order.
    pub const ALL: [WareKind; 3] = [
        WareKind::Liquid,
        WareKind::CombustibleLiquid,
        WareKind::Electronic,
    ];

    /// Human-readable name, also stored in the relational `type` column.
    pub fn display_name(self) -> &'static str {
        match self {
            WareKind::Liquid => "Liquid",
            WareKind::CombustibleLiquid => "Combustible Liquid",
            WareKind::Electronic => "Electronic",
        }
    }

    /// The kind this one extends, if any (the abstract base is implied).
    pub fn parent(self) -> Option<WareKind> {
        match self {
            WareKind::CombustibleLiquid => Some(WareKind::Liquid),
            WareKind::Liquid | WareKind::Electronic => None,
        }
    }

    /// Ancestor chain from the root-most kind down to `self`.
    pub fn lineage(self) -> Vec<WareKind> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Look up a kind by name, ignoring whitespace and ASCII case.
    pub fn from_name(name: &str) -> Option<WareKind> {
        let wanted = normalize_kind_name(name);
        Self::ALL
            .into_iter()
            .find(|kind| normalize_kind_name(kind.display_name()) == wanted)
    }
}

impl core::fmt::Display for WareKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// "Combustible Liquid", "combustibleliquid" and "CombustibleLiquid" compare equal.
pub(crate) fn normalize_kind_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_spacing_and_case() {
        assert_eq!(WareKind::from_name("CombustibleLiquid"), Some(WareKind::CombustibleLiquid));
        assert_eq!(WareKind::from_name("Combustible Liquid"), Some(WareKind::CombustibleLiquid));
        assert_eq!(WareKind::from_name(" electronic "), Some(WareKind::Electronic));
        assert_eq!(WareKind::from_name("Gas"), None);
    }

    #[test]
    fn lineage_starts_at_the_root() {
        assert_eq!(
            WareKind::CombustibleLiquid.lineage(),
            vec![WareKind::Liquid, WareKind::CombustibleLiquid]
        );
        assert_eq!(WareKind::Electronic.lineage(), vec![WareKind::Electronic]);
    }
}
