//! Ledger domain types and the record contracts ledger behaviors need.
//!
//! A ledger item owns its line items; a line item only holds a snapshot of
//! the ledger item it belongs to, enough to resolve its currency.

use serde::{Deserialize, Serialize};

use crate::behavior::{ModelType, Record};

/// Kind of ledger document, taken from the `subtype` option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtype {
    /// Sales invoice.
    Invoice,
    /// Credit note cancelling (part of) an invoice.
    CreditNote,
    /// Payment, possibly without line items.
    Payment,
    /// Custom document kind; has no built-in debit policy.
    #[serde(untagged)]
    Other(String),
}

impl Subtype {
    /// Parses a subtype name; unknown names become [`Subtype::Other`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "invoice" => Self::Invoice,
            "credit_note" => Self::CreditNote,
            "payment" => Self::Payment,
            other => Self::Other(other.to_string()),
        }
    }

    /// Option value for this subtype.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Invoice => "invoice",
            Self::CreditNote => "credit_note",
            Self::Payment => "payment",
            Self::Other(name) => name,
        }
    }

    /// Whether the document is a debit for the party that sent it.
    ///
    /// Invoices and credit notes are; payments are not. Custom subtypes have
    /// no policy and must set `debit_when_sent_by_self` themselves.
    #[must_use]
    pub fn debit_when_sent_by_self(&self) -> Option<bool> {
        match self {
            Self::Invoice | Self::CreditNote => Some(true),
            Self::Payment => Some(false),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for Subtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a line item knows about the ledger item it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerItemRef {
    /// Type of the owning ledger item.
    pub model_type: ModelType,
    /// Currency of the owning ledger item, if known.
    pub currency_code: Option<String>,
}

/// A record that acts as a ledger item and owns line items.
pub trait LedgerItemRecord: Record {
    /// Number of associated line items.
    fn line_item_count(&self) -> usize;

    /// Mutable access to every associated line item.
    fn line_items_mut(&mut self) -> Vec<&mut dyn LineItemRecord>;
}

/// A record that contributes net and tax amounts to a ledger item.
pub trait LineItemRecord: Record {
    /// Sets the back-reference to the owning ledger item.
    fn assign_ledger_item(&mut self, ledger_item: LedgerItemRef);

    /// The owning ledger item, once assigned.
    fn ledger_item(&self) -> Option<&LedgerItemRef>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("invoice", Subtype::Invoice, Some(true))]
    #[case("credit_note", Subtype::CreditNote, Some(true))]
    #[case("payment", Subtype::Payment, Some(false))]
    #[case("order", Subtype::Other("order".into()), None)]
    fn test_subtype_policy(
        #[case] name: &str,
        #[case] expected: Subtype,
        #[case] policy: Option<bool>,
    ) {
        let subtype = Subtype::parse(name);
        assert_eq!(subtype, expected);
        assert_eq!(subtype.as_str(), name);
        assert_eq!(subtype.debit_when_sent_by_self(), policy);
    }

    #[test]
    fn test_subtype_serde() {
        assert_eq!(serde_json::to_string(&Subtype::CreditNote).unwrap(), "\"credit_note\"");
        let parsed: Subtype = serde_json::from_str("\"payment\"").unwrap();
        assert_eq!(parsed, Subtype::Payment);
        let custom: Subtype = serde_json::from_str("\"order\"").unwrap();
        assert_eq!(custom, Subtype::Other("order".into()));
    }
}
