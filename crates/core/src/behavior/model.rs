//! Record type identities and their inheritance chain.

use std::hash::{Hash, Hasher};

/// Identity of a record type, optionally derived from a parent type.
///
/// Model types are declared as statics so that the hierarchy lives for the
/// whole process:
///
/// ```
/// use invoicing_core::ModelType;
///
/// static LEDGER_ITEM: ModelType = ModelType::root("LedgerItem");
/// static INVOICE: ModelType = ModelType::derived("Invoice", &LEDGER_ITEM);
///
/// assert!(INVOICE.is_a(LEDGER_ITEM));
/// ```
///
/// Two model types are equal when their names are equal.
#[derive(Debug, Clone, Copy)]
pub struct ModelType {
    name: &'static str,
    parent: Option<&'static ModelType>,
}

impl ModelType {
    /// Declares a type without a parent.
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Declares a type inheriting from `parent`.
    #[must_use]
    pub const fn derived(name: &'static str, parent: &'static ModelType) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// Type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Direct parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<ModelType> {
        self.parent.copied()
    }

    /// This type followed by its ancestors, nearest first.
    pub fn lineage(self) -> impl Iterator<Item = ModelType> {
        std::iter::successors(Some(self), ModelType::parent)
    }

    /// Ancestors only, nearest first.
    pub fn ancestors(self) -> impl Iterator<Item = ModelType> {
        self.lineage().skip(1)
    }

    /// Returns true if `other` is this type or one of its ancestors.
    #[must_use]
    pub fn is_a(self, other: ModelType) -> bool {
        self.lineage().any(|t| t == other)
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ModelType {}

impl Hash for ModelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BASE: ModelType = ModelType::root("Base");
    static MIDDLE: ModelType = ModelType::derived("Middle", &BASE);
    static LEAF: ModelType = ModelType::derived("Leaf", &MIDDLE);

    #[test]
    fn test_lineage_nearest_first() {
        let names: Vec<_> = LEAF.lineage().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Leaf", "Middle", "Base"]);
    }

    #[test]
    fn test_ancestors_exclude_self() {
        let names: Vec<_> = LEAF.ancestors().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Middle", "Base"]);
        assert_eq!(BASE.ancestors().count(), 0);
    }

    #[test]
    fn test_is_a() {
        assert!(LEAF.is_a(BASE));
        assert!(LEAF.is_a(LEAF));
        assert!(!BASE.is_a(LEAF));
    }

    #[test]
    fn test_equality_by_name() {
        assert_eq!(ModelType::root("Leaf"), LEAF);
        assert_eq!(LEAF.to_string(), "Leaf");
    }
}
