//! Integration tests for the ledger item lifecycle.
//!
//! Declares record types the way an application does at startup, then
//! drives in-memory documents through the save hooks and formats the
//! results from different viewpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use invoicing_core::behavior::{BehaviorError, LifecycleCallback, LifecycleHook};
use invoicing_core::currency::CurrencyValue;
use invoicing_core::memory::{InMemoryLedgerItem, InMemoryLineItem};
use invoicing_core::{
    BehaviorRegistry, FormatOptions, LedgerItem, LineItem, ModelType, Record, SignDisplay, Value,
    options,
};
use invoicing_shared::types::{CurrencyTable, NegativeStyle};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

static BILLING_DOCUMENT: ModelType = ModelType::root("BillingDocument");
static SALES_INVOICE: ModelType = ModelType::derived("SalesInvoice", &BILLING_DOCUMENT);
static SALES_CREDIT_NOTE: ModelType = ModelType::derived("SalesCreditNote", &BILLING_DOCUMENT);
static CUSTOMER_PAYMENT: ModelType = ModelType::derived("CustomerPayment", &BILLING_DOCUMENT);
static BILLING_LINE: ModelType = ModelType::root("BillingLine");

const SUPPLIER: i64 = 1;
const CUSTOMER: i64 = 2;

/// Fills in a missing tax amount at 20% of the net amount.
fn default_tax(_: &BehaviorRegistry, record: &mut dyn Record) -> Result<(), BehaviorError> {
    if record.read_attribute("tax_amount").is_none() {
        let net = record
            .read_attribute("net")
            .and_then(|v| v.as_decimal())
            .unwrap_or_default();
        record.write_attribute("tax_amount", Some(Value::Decimal(net * dec!(0.2))));
    }
    Ok(())
}

fn declare() -> BehaviorRegistry {
    let registry = BehaviorRegistry::new();
    LedgerItem::acts_as(
        &registry,
        BILLING_DOCUMENT,
        vec![options([("total_amount", "gross_amount"), ("currency", "currency_code")]).into()],
    );
    LedgerItem::acts_as_invoice(&registry, SALES_INVOICE, Vec::new());
    LedgerItem::acts_as_credit_note(&registry, SALES_CREDIT_NOTE, Vec::new());
    LedgerItem::acts_as_payment(&registry, CUSTOMER_PAYMENT, Vec::new());

    LineItem::acts_as(&registry, BILLING_LINE, vec![options([("net_amount", "net")]).into()]);
    registry.register_callback(
        BILLING_LINE,
        LifecycleCallback::new(LifecycleHook::BeforeValidation, "default_tax", default_tax),
    );
    registry
}

fn party(is_self: bool) -> Value {
    let mut details = BTreeMap::new();
    details.insert("is_self".to_string(), Value::Bool(is_self));
    Value::Map(details)
}

fn document(
    model_type: ModelType,
    currency: &str,
    table: &Arc<CurrencyTable>,
) -> InMemoryLedgerItem {
    InMemoryLedgerItem::new(model_type)
        .with_attribute("currency_code", currency)
        .with_attribute("sender_id", SUPPLIER)
        .with_attribute("sender_details", party(true))
        .with_attribute("recipient_id", CUSTOMER)
        .with_attribute("recipient_details", party(false))
        .with_currency_table(Arc::clone(table))
}

fn line(net: &str, table: &Arc<CurrencyTable>) -> InMemoryLineItem {
    InMemoryLineItem::new(BILLING_LINE)
        .with_attribute("net", net)
        .with_currency_table(Arc::clone(table))
}

// ============================================================================
// Test 1: Save computes totals through line item callbacks
// ============================================================================
#[test]
fn test_invoice_save_computes_rounded_totals() {
    let registry = declare();
    let table = Arc::new(CurrencyTable::builtin());
    let mut invoice = document(SALES_INVOICE, "USD", &table)
        .with_line_item(line("100.004", &table))
        .with_line_item(line("49.999", &table).with_attribute("tax_amount", "0"));

    registry.prepare_for_save(&mut invoice).expect("save hooks should pass");

    // net 100.00 + 50.00, tax 20.00 (defaulted) + 0
    assert_eq!(invoice.read_attribute("gross_amount"), Some(Value::Decimal(dec!(170.00))));
    assert_eq!(invoice.read_attribute("tax_amount"), Some(Value::Decimal(dec!(20.00))));
    assert_eq!(LedgerItem::net_amount(&registry, &invoice), Some(dec!(150.00)));

    // the line item callback ran during aggregation
    let defaulted = invoice.line_items()[0].read_attribute("tax_amount");
    assert_eq!(defaulted.and_then(|v| v.as_decimal()), Some(dec!(20.0008)));
}

// ============================================================================
// Test 2: Formatting from both parties' points of view
// ============================================================================
#[test]
fn test_invoice_formatting_by_viewer() {
    let registry = declare();
    let table = Arc::new(CurrencyTable::builtin());
    let mut invoice = document(SALES_INVOICE, "USD", &table).with_line_item(line("1000", &table));
    registry.prepare_for_save(&mut invoice).unwrap();

    let as_supplier = FormatOptions::new()
        .debit(SignDisplay::Negative)
        .self_id(SUPPLIER)
        .negative(NegativeStyle::Brackets);
    assert_eq!(
        LedgerItem::formatted(&registry, &invoice, "total_amount_formatted", &as_supplier).unwrap(),
        "($1,200.00)"
    );

    let as_customer = FormatOptions::new().debit(SignDisplay::Negative).self_id(CUSTOMER);
    assert_eq!(
        LedgerItem::formatted(&registry, &invoice, "total_amount_formatted", &as_customer).unwrap(),
        "$1,200.00"
    );

    // the operating party itself, recognized by its details
    let as_self = FormatOptions::new().credit(SignDisplay::Negative);
    assert_eq!(
        LedgerItem::formatted(&registry, &invoice, "tax_amount_formatted", &as_self).unwrap(),
        "$200.00"
    );
}

// ============================================================================
// Test 3: Payments and credit notes
// ============================================================================
#[test]
fn test_payment_and_credit_note_directions() {
    let registry = declare();
    let table = Arc::new(CurrencyTable::builtin());

    let mut payment = document(CUSTOMER_PAYMENT, "EUR", &table)
        .with_attribute("gross_amount", dec!(1200))
        .with_attribute("tax_amount", Decimal::ZERO);
    registry.prepare_for_save(&mut payment).unwrap();
    assert_eq!(LedgerItem::total_amount(&registry, &payment), Some(dec!(1200)));

    let supplier = Value::Integer(SUPPLIER);
    assert!(!LedgerItem::is_debit(&registry, &payment, Some(&supplier)).unwrap());

    let credit_note = document(SALES_CREDIT_NOTE, "EUR", &table);
    assert!(LedgerItem::is_debit(&registry, &credit_note, Some(&supplier)).unwrap());
    let customer = Value::Integer(CUSTOMER);
    assert!(!LedgerItem::is_debit(&registry, &credit_note, Some(&customer)).unwrap());
}

// ============================================================================
// Test 4: Currency without a descriptor and malformed input
// ============================================================================
#[test]
fn test_unknown_currency_and_malformed_input() {
    let registry = declare();
    let table = Arc::new(CurrencyTable::builtin());

    let mut invoice = document(SALES_INVOICE, "XAU", &table)
        .with_line_item(line("1.23456", &table));
    registry.prepare_for_save(&mut invoice).unwrap();
    // no descriptor: nothing is rounded and formatting falls back to plain text
    assert_eq!(LedgerItem::total_amount(&registry, &invoice), Some(dec!(1.481472)));
    assert_eq!(
        LedgerItem::formatted(&registry, &invoice, "total_amount", &FormatOptions::new()).unwrap(),
        "1.481472"
    );

    let garbled = document(SALES_INVOICE, "EUR", &table).with_attribute("gross_amount", "twelve");
    assert_eq!(
        LedgerItem::formatted(&registry, &garbled, "total_amount_formatted", &FormatOptions::new())
            .unwrap(),
        ""
    );
}

// ============================================================================
// Test 5: The process-wide registry
// ============================================================================
#[test]
fn test_global_registry_inherits_declarations() {
    static GLOBAL_DOCUMENT: ModelType = ModelType::root("GlobalDocument");
    static GLOBAL_INVOICE: ModelType = ModelType::derived("GlobalInvoice", &GLOBAL_DOCUMENT);

    let registry = BehaviorRegistry::global();
    LedgerItem::acts_as(registry, GLOBAL_DOCUMENT, vec![options([("tax_amount", "vat")]).into()]);
    LedgerItem::acts_as_invoice(registry, GLOBAL_INVOICE, Vec::new());

    let governed: Vec<String> = CurrencyValue::governed_attributes(registry, GLOBAL_INVOICE)
        .into_iter()
        .map(|g| g.formatted_name)
        .collect();
    assert_eq!(governed, vec!["total_amount_formatted", "vat_formatted"]);
    assert!(LedgerItem::is_invoice(registry, GLOBAL_INVOICE));
    assert!(!LedgerItem::is_invoice(registry, GLOBAL_DOCUMENT));
}
