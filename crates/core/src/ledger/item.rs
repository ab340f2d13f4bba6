//! Ledger item behavior: total aggregation and subtype policy.
//!
//! Canonical attribute names are `total_amount`, `tax_amount`, `currency`,
//! `sender_id`, `sender_details`, `recipient_id` and `recipient_details`.
//! Each can be renamed by passing an option keyed by the canonical name.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::line_item::LineItem;
use super::types::{LedgerItemRecord, LedgerItemRef, Subtype};
use crate::behavior::{
    Behavior, BehaviorArg, BehaviorConfig, BehaviorError, BehaviorFamily, BehaviorRegistry,
    LifecycleCallback, LifecycleHook, ModelType, Options, Record, Value,
};
use crate::currency::{CurrencyValue, FORMATTED_SUFFIX, FormatOptions};

/// Name the perspective formatter is registered under.
pub const PERSPECTIVE_FORMATTER: &str = "value_for_formatting";

/// The ledger item behavior.
pub struct LedgerItem;

impl Behavior for LedgerItem {
    const FAMILY: BehaviorFamily = BehaviorFamily::LedgerItem;

    fn included(registry: &BehaviorRegistry, model_type: ModelType) {
        registry.register_callback(
            model_type,
            LifecycleCallback::new(
                LifecycleHook::BeforeValidation,
                "calculate_total_amount",
                calculate_total_amount,
            ),
        );
        registry.register_value_for_formatting(PERSPECTIVE_FORMATTER, Self::value_for_formatting);
    }

    fn applied(registry: &BehaviorRegistry, config: &Arc<BehaviorConfig>) {
        if !config.is_first_application() {
            return;
        }

        let mut currency_options = Options::new();
        currency_options.insert("currency".into(), config.rename_lookup("currency").into());
        currency_options.insert("value_for_formatting".into(), PERSPECTIVE_FORMATTER.into());
        if let Some(code) = config.option("currency_code") {
            currency_options.insert("currency_code".into(), code.into());
        }

        CurrencyValue::acts_as(
            registry,
            config.model_type(),
            vec![
                config.rename_lookup("total_amount").into(),
                config.rename_lookup("tax_amount").into(),
                currency_options.into(),
            ],
        );
    }
}

fn calculate_total_amount(
    registry: &BehaviorRegistry,
    record: &mut dyn Record,
) -> Result<(), BehaviorError> {
    let model_type = record.model_type();
    let item = record
        .as_ledger_item_mut()
        .ok_or_else(|| BehaviorError::NotALedgerItem {
            model_type: model_type.name().to_string(),
        })?;
    LedgerItem::calculate_total_amount(registry, item).map(|_| ())
}

fn overflow(model_type: ModelType, attribute: &str) -> BehaviorError {
    BehaviorError::AmountOverflow {
        model_type: model_type.name().to_string(),
        attribute: attribute.to_string(),
    }
}

fn with_subtype(mut args: Vec<BehaviorArg>, subtype: &Subtype) -> Vec<BehaviorArg> {
    match args.last_mut() {
        Some(BehaviorArg::Options(options)) => {
            options.insert("subtype".into(), subtype.as_str().into());
        }
        _ => {
            let mut options = Options::new();
            options.insert("subtype".into(), subtype.as_str().into());
            args.push(options.into());
        }
    }
    args
}

impl LedgerItem {
    /// Applies the behavior to `model_type`.
    ///
    /// Recognized options: attribute renames keyed by canonical name,
    /// `subtype`, `currency_code` and `debit_when_sent_by_self`.
    pub fn acts_as(
        registry: &BehaviorRegistry,
        model_type: ModelType,
        args: Vec<BehaviorArg>,
    ) -> Arc<BehaviorConfig> {
        registry.acts_as::<Self>(model_type, args)
    }

    /// Applies the behavior with the `invoice` subtype.
    pub fn acts_as_invoice(
        registry: &BehaviorRegistry,
        model_type: ModelType,
        args: Vec<BehaviorArg>,
    ) -> Arc<BehaviorConfig> {
        Self::acts_as(registry, model_type, with_subtype(args, &Subtype::Invoice))
    }

    /// Applies the behavior with the `credit_note` subtype.
    pub fn acts_as_credit_note(
        registry: &BehaviorRegistry,
        model_type: ModelType,
        args: Vec<BehaviorArg>,
    ) -> Arc<BehaviorConfig> {
        Self::acts_as(registry, model_type, with_subtype(args, &Subtype::CreditNote))
    }

    /// Applies the behavior with the `payment` subtype.
    pub fn acts_as_payment(
        registry: &BehaviorRegistry,
        model_type: ModelType,
        args: Vec<BehaviorArg>,
    ) -> Arc<BehaviorConfig> {
        Self::acts_as(registry, model_type, with_subtype(args, &Subtype::Payment))
    }

    /// Current snapshot for `model_type`.
    #[must_use]
    pub fn config(
        registry: &BehaviorRegistry,
        model_type: ModelType,
    ) -> Option<Arc<BehaviorConfig>> {
        registry.config(Self::FAMILY, model_type)
    }

    /// Configured subtype of `model_type`.
    #[must_use]
    pub fn subtype(registry: &BehaviorRegistry, model_type: ModelType) -> Option<Subtype> {
        Self::config(registry, model_type)?
            .option("subtype")
            .map(Subtype::parse)
    }

    /// Returns true if `model_type` is an invoice type.
    #[must_use]
    pub fn is_invoice(registry: &BehaviorRegistry, model_type: ModelType) -> bool {
        Self::subtype(registry, model_type) == Some(Subtype::Invoice)
    }

    /// Returns true if `model_type` is a credit note type.
    #[must_use]
    pub fn is_credit_note(registry: &BehaviorRegistry, model_type: ModelType) -> bool {
        Self::subtype(registry, model_type) == Some(Subtype::CreditNote)
    }

    /// Returns true if `model_type` is a payment type.
    #[must_use]
    pub fn is_payment(registry: &BehaviorRegistry, model_type: ModelType) -> bool {
        Self::subtype(registry, model_type) == Some(Subtype::Payment)
    }

    /// Debit policy of `model_type`: the `debit_when_sent_by_self` option
    /// if set, else the subtype's built-in policy.
    pub fn debit_when_sent_by_self(
        registry: &BehaviorRegistry,
        model_type: ModelType,
    ) -> Result<bool, BehaviorError> {
        let config =
            Self::config(registry, model_type).ok_or_else(|| BehaviorError::NotALedgerItem {
                model_type: model_type.name().to_string(),
            })?;

        if let Some(flag) = config.option("debit_when_sent_by_self") {
            match flag.parse::<bool>() {
                Ok(policy) => return Ok(policy),
                Err(_) => warn!(
                    model_type = %model_type,
                    value = flag,
                    "ignoring debit_when_sent_by_self option"
                ),
            }
        }

        let subtype = config.option("subtype").map(Subtype::parse);
        subtype
            .as_ref()
            .and_then(Subtype::debit_when_sent_by_self)
            .ok_or_else(|| BehaviorError::UndefinedDebitPolicy {
                model_type: model_type.name().to_string(),
                subtype: subtype.map_or_else(|| "none".to_string(), |s| s.to_string()),
            })
    }

    /// Resolves a method name through the aliases.
    ///
    /// For `<name>_formatted` the base name is resolved first and the suffix
    /// appended afterwards, so renaming `total_amount` also renames its
    /// formatted accessor.
    #[must_use]
    pub fn method_name(config: &BehaviorConfig, name: &str) -> String {
        match name.strip_suffix(FORMATTED_SUFFIX) {
            Some(base) => format!("{}{FORMATTED_SUFFIX}", config.rename_lookup(base)),
            None => config.rename_lookup(name).to_string(),
        }
    }

    /// Reads the attribute a canonical name resolves to.
    #[must_use]
    pub fn read(registry: &BehaviorRegistry, record: &dyn Record, name: &str) -> Option<Value> {
        match Self::config(registry, record.model_type()) {
            Some(config) => config.read(Some(record), name),
            None if record.has_attribute(name) => record.read_attribute(name),
            None => None,
        }
    }

    /// Reads an amount through its alias and the currency value getter.
    #[must_use]
    pub fn read_amount(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        name: &str,
    ) -> Option<Decimal> {
        let attribute = Self::config(registry, record.model_type())
            .map_or_else(|| name.to_string(), |config| config.rename_lookup(name).to_string());
        if !record.has_attribute(&attribute) {
            return None;
        }
        CurrencyValue::get(registry, record, &attribute)
    }

    /// Rounded total amount.
    #[must_use]
    pub fn total_amount(registry: &BehaviorRegistry, record: &dyn Record) -> Option<Decimal> {
        Self::read_amount(registry, record, "total_amount")
    }

    /// Rounded tax amount.
    #[must_use]
    pub fn tax_amount(registry: &BehaviorRegistry, record: &dyn Record) -> Option<Decimal> {
        Self::read_amount(registry, record, "tax_amount")
    }

    /// Total minus tax, when both are present and the difference fits.
    #[must_use]
    pub fn net_amount(registry: &BehaviorRegistry, record: &dyn Record) -> Option<Decimal> {
        let total = Self::total_amount(registry, record)?;
        let tax = Self::tax_amount(registry, record)?;
        let net = total.checked_sub(tax);
        if net.is_none() {
            warn!(model_type = %record.model_type(), %total, %tax, "net amount overflows");
        }
        net
    }

    /// Recomputes `total_amount` and `tax_amount` from the line items.
    ///
    /// Every line item gets the back-reference assigned and its
    /// before-validation callbacks run before its amounts are read. Absent
    /// line amounts add nothing. Payments without line items keep their
    /// totals and yield `None`; otherwise the net total is returned.
    pub fn calculate_total_amount(
        registry: &BehaviorRegistry,
        item: &mut dyn LedgerItemRecord,
    ) -> Result<Option<Decimal>, BehaviorError> {
        let model_type = item.model_type();
        let config =
            Self::config(registry, model_type).ok_or_else(|| BehaviorError::NotALedgerItem {
                model_type: model_type.name().to_string(),
            })?;

        if Self::is_payment(registry, model_type) && item.line_item_count() == 0 {
            debug!(model_type = %model_type, "payment without line items, totals kept");
            return Ok(None);
        }

        let ledger_ref = LedgerItemRef {
            model_type,
            currency_code: CurrencyValue::currency_of(registry, &*item),
        };

        let mut net_total = Decimal::ZERO;
        let mut tax_total = Decimal::ZERO;
        let mut lines = 0_usize;
        for line in item.line_items_mut() {
            line.assign_ledger_item(ledger_ref.clone());
            registry.run_callbacks(LifecycleHook::BeforeValidation, &mut *line)?;

            if let Some(net) = LineItem::net_amount(registry, &*line) {
                net_total = net_total
                    .checked_add(net)
                    .ok_or_else(|| overflow(model_type, "net_amount"))?;
            }
            if let Some(tax) = LineItem::tax_amount(registry, &*line) {
                tax_total = tax_total
                    .checked_add(tax)
                    .ok_or_else(|| overflow(model_type, "tax_amount"))?;
            }
            lines += 1;
        }
        let total = net_total
            .checked_add(tax_total)
            .ok_or_else(|| overflow(model_type, "total_amount"))?;

        let record: &mut dyn Record = item;
        config.write(Some(&mut *record), "total_amount", Some(Value::Decimal(total)));
        config.write(Some(record), "tax_amount", Some(Value::Decimal(tax_total)));

        debug!(
            model_type = %model_type,
            lines,
            net_total = %net_total,
            tax_total = %tax_total,
            "ledger item totals recalculated"
        );
        Ok(Some(net_total))
    }

    /// Formatted accessor: `name` is a canonical amount name or its
    /// `_formatted` accessor name, resolved through the aliases.
    pub fn formatted(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        name: &str,
        options: &FormatOptions,
    ) -> Result<String, BehaviorError> {
        let method = match Self::config(registry, record.model_type()) {
            Some(config) => Self::method_name(&config, name),
            None => name.to_string(),
        };
        CurrencyValue::formatted(registry, record, &method, options)
    }
}
