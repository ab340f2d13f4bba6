//! The record capability contract behaviors operate on.
//!
//! Persistence lives outside this crate. A record only has to expose its
//! attributes by name and answer a few typed capability queries; behaviors
//! never probe for methods.

use std::collections::BTreeMap;
use std::str::FromStr;

use invoicing_shared::types::CurrencyDescriptor;
use rust_decimal::Decimal;

use super::model::ModelType;
use crate::ledger::LedgerItemRecord;

/// A stored attribute value. Absence is `Option::None`, never a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Exact decimal (amounts).
    Decimal(Decimal),
    /// Integer (identifiers, counters).
    Integer(i64),
    /// Text (codes, identifiers, raw input).
    Text(String),
    /// Boolean flag.
    Bool(bool),
    /// Nested details, e.g. a party's address block.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Interprets the value as an exact decimal.
    ///
    /// Text is parsed (plain or scientific notation); anything else that is
    /// not numeric yields `None`.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            Self::Integer(i) => Some(Decimal::from(*i)),
            Self::Text(s) => parse_decimal(s),
            Self::Bool(_) | Self::Map(_) => None,
        }
    }

    /// Borrows the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the nested map, if this is a map value.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Everything except `false` counts as set.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Bool(false))
    }
}

/// Parses a textual number into an exact decimal.
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Map(m) => {
                f.write_str("{")?;
                for (i, (key, value)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Map(value)
    }
}

/// What a persisted record must offer to carry behaviors.
///
/// Attribute names are the stored (possibly renamed) names; alias
/// resolution happens in the behaviors before these methods are called.
pub trait Record {
    /// The record's type.
    fn model_type(&self) -> ModelType;

    /// Returns true if the record exposes `name`, even when its value is absent.
    fn has_attribute(&self, name: &str) -> bool;

    /// Reads a stored value.
    fn read_attribute(&self, name: &str) -> Option<Value>;

    /// Stores a value; `None` clears it.
    fn write_attribute(&mut self, name: &str, value: Option<Value>);

    /// Raw textual input as it arrived, before any conversion.
    fn attribute_before_type_cast(&self, name: &str) -> Option<String> {
        self.read_attribute(name).map(|value| value.to_string())
    }

    /// Currency code known from context rather than from an attribute
    /// (a line item inherits it from its ledger item, for instance).
    fn currency_code(&self) -> Option<String> {
        None
    }

    /// Currency lookup hook. Returns the euro descriptor unless overridden.
    fn currency_descriptor(&self, currency_code: Option<&str>) -> Option<CurrencyDescriptor> {
        let _ = currency_code;
        Some(CurrencyDescriptor::default_currency())
    }

    /// Ledger item view of this record, if it is one.
    fn as_ledger_item(&self) -> Option<&dyn LedgerItemRecord> {
        None
    }

    /// Mutable ledger item view of this record, if it is one.
    fn as_ledger_item_mut(&mut self) -> Option<&mut dyn LedgerItemRecord> {
        None
    }
}
