//! Ledger documents as read from a JSON file.
//!
//! Amounts may be given as strings or numbers; strings keep every digit.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use invoicing_core::behavior::ModelType;
use invoicing_core::memory::{InMemoryLedgerItem, InMemoryLineItem};
use invoicing_core::{Subtype, Value};
use invoicing_shared::types::CurrencyTable;
use invoicing_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Top-level shape of the input file.
#[derive(Debug, Deserialize)]
pub struct DocumentFile {
    /// Documents in report order.
    pub documents: Vec<Document>,
}

/// One ledger document.
#[derive(Debug, Deserialize)]
pub struct Document {
    /// Document kind.
    pub kind: Subtype,
    /// Currency code; the configured default applies when absent.
    #[serde(default)]
    pub currency: Option<String>,
    /// Sender party id.
    #[serde(default)]
    pub sender_id: Option<serde_json::Value>,
    /// Sender details; `is_self` marks the operating party.
    #[serde(default)]
    pub sender_details: Option<serde_json::Value>,
    /// Recipient party id.
    #[serde(default)]
    pub recipient_id: Option<serde_json::Value>,
    /// Recipient details.
    #[serde(default)]
    pub recipient_details: Option<serde_json::Value>,
    /// Prior total, kept for payments without line items.
    #[serde(default)]
    pub total_amount: Option<serde_json::Value>,
    /// Prior tax amount.
    #[serde(default)]
    pub tax_amount: Option<serde_json::Value>,
    /// Lines contributing to the totals.
    #[serde(default)]
    pub line_items: Vec<LineDocument>,
}

/// One line of a document.
#[derive(Debug, Deserialize)]
pub struct LineDocument {
    /// Net amount of the line.
    #[serde(default)]
    pub net_amount: Option<serde_json::Value>,
    /// Tax amount of the line.
    #[serde(default)]
    pub tax_amount: Option<serde_json::Value>,
}

/// Reads and parses a document file.
pub fn read_documents(path: &Path) -> AppResult<DocumentFile> {
    let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => AppError::NotFound(path.display().to_string()),
        _ => AppError::Internal(format!("{}: {err}", path.display())),
    })?;
    serde_json::from_str(&text).map_err(|err| AppError::Parse(err.to_string()))
}

/// Converts a JSON value into a record value; `null` is absence.
pub fn json_to_value(json: &serde_json::Value) -> Option<Value> {
    match json {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => n.as_i64().map(Value::Integer).or_else(|| {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .map(Value::Decimal)
        }),
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Array(_) => Some(Value::Text(json.to_string())),
        serde_json::Value::Object(entries) => Some(Value::Map(
            entries
                .iter()
                .filter_map(|(key, value)| json_to_value(value).map(|v| (key.clone(), v)))
                .collect(),
        )),
    }
}

fn attribute(json: Option<&serde_json::Value>) -> Option<Value> {
    json.and_then(json_to_value)
}

/// Model types documents and lines are declared as.
#[derive(Debug, Clone, Copy)]
pub struct DocumentTypes {
    /// Type for kinds without a dedicated type.
    pub document: ModelType,
    /// Invoice type.
    pub invoice: ModelType,
    /// Credit note type.
    pub credit_note: ModelType,
    /// Payment type.
    pub payment: ModelType,
    /// Line item type.
    pub line: ModelType,
}

impl DocumentTypes {
    /// Model type for a document kind.
    pub fn for_kind(&self, kind: &Subtype) -> ModelType {
        match kind {
            Subtype::Invoice => self.invoice,
            Subtype::CreditNote => self.credit_note,
            Subtype::Payment => self.payment,
            Subtype::Other(_) => self.document,
        }
    }
}

impl Document {
    /// Builds the in-memory record for this document.
    pub fn to_record(
        &self,
        types: &DocumentTypes,
        table: &Arc<CurrencyTable>,
    ) -> InMemoryLedgerItem {
        let mut record = InMemoryLedgerItem::new(types.for_kind(&self.kind))
            .with_currency_table(Arc::clone(table));

        let attributes = [
            ("currency", self.currency.clone().map(Value::Text)),
            ("sender_id", attribute(self.sender_id.as_ref())),
            ("sender_details", attribute(self.sender_details.as_ref())),
            ("recipient_id", attribute(self.recipient_id.as_ref())),
            ("recipient_details", attribute(self.recipient_details.as_ref())),
            ("total_amount", attribute(self.total_amount.as_ref())),
            ("tax_amount", attribute(self.tax_amount.as_ref())),
        ];
        for (name, value) in attributes {
            if let Some(value) = value {
                record = record.with_attribute(name, value);
            }
        }

        for line in &self.line_items {
            let mut line_item = InMemoryLineItem::new(types.line)
                .with_currency_table(Arc::clone(table));
            if let Some(net) = attribute(line.net_amount.as_ref()) {
                line_item = line_item.with_attribute("net_amount", net);
            }
            if let Some(tax) = attribute(line.tax_amount.as_ref()) {
                line_item = line_item.with_attribute("tax_amount", tax);
            }
            record.push_line_item(line_item);
        }
        record
    }
}
