//! Property-based tests for ledger items.
//!
//! - Aggregation: total is the sum of net and tax, tax is the sum of tax
//! - Payments without line items keep their totals
//! - Perspective symmetry: sender and recipient see opposite directions

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::item::LedgerItem;
use super::line_item::LineItem;
use crate::behavior::{BehaviorRegistry, ModelType, Record, Value};
use crate::memory::{InMemoryLedgerItem, InMemoryLineItem};

static LEDGER: ModelType = ModelType::root("PropLedgerItem");
static INVOICE: ModelType = ModelType::derived("PropInvoice", &LEDGER);
static CREDIT_NOTE: ModelType = ModelType::derived("PropCreditNote", &LEDGER);
static PAYMENT: ModelType = ModelType::derived("PropPayment", &LEDGER);
static LINE: ModelType = ModelType::root("PropLineItem");

fn declare() -> BehaviorRegistry {
    let registry = BehaviorRegistry::new();
    LedgerItem::acts_as(&registry, LEDGER, Vec::new());
    LedgerItem::acts_as_invoice(&registry, INVOICE, Vec::new());
    LedgerItem::acts_as_credit_note(&registry, CREDIT_NOTE, Vec::new());
    LedgerItem::acts_as_payment(&registry, PAYMENT, Vec::new());
    LineItem::acts_as(&registry, LINE, Vec::new());
    registry
}

/// Strategy for whole-cent amounts (-100,000.00 to 100,000.00).
fn cents() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|v| Decimal::new(v, 2))
}

/// Strategy for a line item's amounts; either may be absent.
fn line_amounts() -> impl Strategy<Value = (Option<Decimal>, Option<Decimal>)> {
    (prop::option::of(cents()), prop::option::of(cents()))
}

fn ledger_type() -> impl Strategy<Value = ModelType> {
    prop_oneof![Just(INVOICE), Just(CREDIT_NOTE), Just(PAYMENT)]
}

fn line(net: Option<Decimal>, tax: Option<Decimal>) -> InMemoryLineItem {
    let mut line = InMemoryLineItem::new(LINE);
    if let Some(net) = net {
        line = line.with_attribute("net_amount", net);
    }
    if let Some(tax) = tax {
        line = line.with_attribute("tax_amount", tax);
    }
    line
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of line items, `total_amount == Σnet + Σtax` and
    /// `tax_amount == Σtax`, absent amounts counting as nothing.
    #[test]
    fn prop_totals_are_line_sums(
        model_type in ledger_type(),
        lines in prop::collection::vec(line_amounts(), 1..8),
    ) {
        let registry = declare();
        let mut item = InMemoryLedgerItem::new(model_type);
        for (net, tax) in &lines {
            item.push_line_item(line(*net, *tax));
        }

        let net_sum: Decimal = lines.iter().filter_map(|(net, _)| *net).sum();
        let tax_sum: Decimal = lines.iter().filter_map(|(_, tax)| *tax).sum();

        let net = LedgerItem::calculate_total_amount(&registry, &mut item).unwrap();
        prop_assert_eq!(net, Some(net_sum));
        prop_assert_eq!(LedgerItem::total_amount(&registry, &item), Some(net_sum + tax_sum));
        prop_assert_eq!(LedgerItem::tax_amount(&registry, &item), Some(tax_sum));
        prop_assert_eq!(LedgerItem::net_amount(&registry, &item), Some(net_sum));
    }

    /// *For any* prior totals, a payment without line items keeps them.
    #[test]
    fn prop_payment_without_lines_is_untouched(total in cents(), tax in cents()) {
        let registry = declare();
        let mut item = InMemoryLedgerItem::new(PAYMENT)
            .with_attribute("total_amount", total)
            .with_attribute("tax_amount", tax);

        registry.prepare_for_save(&mut item).unwrap();
        prop_assert_eq!(item.read_attribute("total_amount"), Some(Value::Decimal(total)));
        prop_assert_eq!(item.read_attribute("tax_amount"), Some(Value::Decimal(tax)));
    }

    /// *For any* document between two distinct parties, the sender and the
    /// recipient see opposite directions.
    #[test]
    fn prop_perspective_is_symmetric(
        model_type in ledger_type(),
        sender in 1i64..1000,
        offset in 1i64..1000,
    ) {
        let registry = declare();
        let recipient = sender + offset;
        let item = InMemoryLedgerItem::new(model_type)
            .with_attribute("sender_id", sender)
            .with_attribute("recipient_id", recipient);

        let sender_view =
            LedgerItem::is_debit(&registry, &item, Some(&Value::Integer(sender))).unwrap();
        let recipient_view =
            LedgerItem::is_debit(&registry, &item, Some(&Value::Integer(recipient))).unwrap();
        prop_assert_eq!(sender_view, !recipient_view);
    }
}
