//! In-memory records implementing the capability contract.
//!
//! Used wherever no persistence engine is attached: tests, the report
//! binary, and callers that compute totals before handing records to
//! their own store.

use std::collections::BTreeMap;
use std::sync::Arc;

use invoicing_shared::types::{CurrencyDescriptor, CurrencyTable};

use crate::behavior::{ModelType, Record, Value};
use crate::ledger::{LedgerItemRecord, LedgerItemRef, LineItemRecord};

/// A record holding its attributes in a map.
///
/// Without a currency table the record uses the default euro descriptor;
/// with one, the descriptor is looked up by code and an unknown or missing
/// code yields no descriptor.
#[derive(Debug, Clone)]
pub struct InMemoryRecord {
    model_type: ModelType,
    attributes: BTreeMap<String, Option<Value>>,
    currency_table: Option<Arc<CurrencyTable>>,
}

impl InMemoryRecord {
    /// Creates a record without attributes.
    #[must_use]
    pub fn new(model_type: ModelType) -> Self {
        Self {
            model_type,
            attributes: BTreeMap::new(),
            currency_table: None,
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), Some(value.into()));
        self
    }

    /// Declares an attribute without a value.
    #[must_use]
    pub fn with_absent_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), None);
        self
    }

    /// Resolves currencies through `table`.
    #[must_use]
    pub fn with_currency_table(mut self, table: impl Into<Arc<CurrencyTable>>) -> Self {
        self.currency_table = Some(table.into());
        self
    }

    /// Attribute names with their values, in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }
}

impl Record for InMemoryRecord {
    fn model_type(&self) -> ModelType {
        self.model_type
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    fn read_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned().flatten()
    }

    fn write_attribute(&mut self, name: &str, value: Option<Value>) {
        self.attributes.insert(name.to_string(), value);
    }

    fn currency_descriptor(&self, currency_code: Option<&str>) -> Option<CurrencyDescriptor> {
        match &self.currency_table {
            None => Some(CurrencyDescriptor::default_currency()),
            Some(table) => currency_code.and_then(|code| table.get(code).cloned()),
        }
    }
}

/// Forwards the attribute part of [`Record`] to an inner `record` field.
macro_rules! delegate_record {
    () => {
        fn model_type(&self) -> ModelType {
            self.record.model_type()
        }

        fn has_attribute(&self, name: &str) -> bool {
            self.record.has_attribute(name)
        }

        fn read_attribute(&self, name: &str) -> Option<Value> {
            self.record.read_attribute(name)
        }

        fn write_attribute(&mut self, name: &str, value: Option<Value>) {
            self.record.write_attribute(name, value);
        }

        fn currency_descriptor(&self, currency_code: Option<&str>) -> Option<CurrencyDescriptor> {
            self.record.currency_descriptor(currency_code)
        }
    };
}

/// An in-memory ledger item owning its line items.
#[derive(Debug, Clone)]
pub struct InMemoryLedgerItem {
    record: InMemoryRecord,
    line_items: Vec<InMemoryLineItem>,
}

impl InMemoryLedgerItem {
    /// Creates a ledger item without attributes or line items.
    #[must_use]
    pub fn new(model_type: ModelType) -> Self {
        Self {
            record: InMemoryRecord::new(model_type),
            line_items: Vec::new(),
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record = self.record.with_attribute(name, value);
        self
    }

    /// Resolves currencies through `table`.
    #[must_use]
    pub fn with_currency_table(mut self, table: impl Into<Arc<CurrencyTable>>) -> Self {
        self.record = self.record.with_currency_table(table);
        self
    }

    /// Appends a line item.
    #[must_use]
    pub fn with_line_item(mut self, line_item: InMemoryLineItem) -> Self {
        self.line_items.push(line_item);
        self
    }

    /// Appends a line item.
    pub fn push_line_item(&mut self, line_item: InMemoryLineItem) {
        self.line_items.push(line_item);
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn line_items(&self) -> &[InMemoryLineItem] {
        &self.line_items
    }

    /// The underlying attribute record.
    #[must_use]
    pub fn record(&self) -> &InMemoryRecord {
        &self.record
    }
}

impl Record for InMemoryLedgerItem {
    delegate_record!();

    fn as_ledger_item(&self) -> Option<&dyn LedgerItemRecord> {
        Some(self)
    }

    fn as_ledger_item_mut(&mut self) -> Option<&mut dyn LedgerItemRecord> {
        Some(self)
    }
}

impl LedgerItemRecord for InMemoryLedgerItem {
    fn line_item_count(&self) -> usize {
        self.line_items.len()
    }

    fn line_items_mut(&mut self) -> Vec<&mut dyn LineItemRecord> {
        self.line_items
            .iter_mut()
            .map(|line| line as &mut dyn LineItemRecord)
            .collect()
    }
}

/// An in-memory line item.
#[derive(Debug, Clone)]
pub struct InMemoryLineItem {
    record: InMemoryRecord,
    ledger_item: Option<LedgerItemRef>,
}

impl InMemoryLineItem {
    /// Creates a line item without attributes.
    #[must_use]
    pub fn new(model_type: ModelType) -> Self {
        Self {
            record: InMemoryRecord::new(model_type),
            ledger_item: None,
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record = self.record.with_attribute(name, value);
        self
    }

    /// Resolves currencies through `table`.
    #[must_use]
    pub fn with_currency_table(mut self, table: impl Into<Arc<CurrencyTable>>) -> Self {
        self.record = self.record.with_currency_table(table);
        self
    }
}

impl Record for InMemoryLineItem {
    delegate_record!();

    fn currency_code(&self) -> Option<String> {
        self.ledger_item.as_ref()?.currency_code.clone()
    }
}

impl LineItemRecord for InMemoryLineItem {
    fn assign_ledger_item(&mut self, ledger_item: LedgerItemRef) {
        self.ledger_item = Some(ledger_item);
    }

    fn ledger_item(&self) -> Option<&LedgerItemRef> {
        self.ledger_item.as_ref()
    }
}
