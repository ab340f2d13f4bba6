//! Line item behavior: net and tax amounts contributing to a ledger item.
//!
//! Canonical attribute names are `net_amount`, `tax_amount` and `currency`.
//! A line item without a currency attribute takes its currency from the
//! ledger item it has been assigned to.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::behavior::{
    Behavior, BehaviorArg, BehaviorConfig, BehaviorFamily, BehaviorRegistry, ModelType, Options,
    Record,
};
use crate::currency::CurrencyValue;

/// The line item behavior.
pub struct LineItem;

impl Behavior for LineItem {
    const FAMILY: BehaviorFamily = BehaviorFamily::LineItem;

    fn applied(registry: &BehaviorRegistry, config: &Arc<BehaviorConfig>) {
        if !config.is_first_application() {
            return;
        }

        let mut currency_options = Options::new();
        currency_options.insert("currency".into(), config.rename_lookup("currency").into());

        CurrencyValue::acts_as(
            registry,
            config.model_type(),
            vec![
                config.rename_lookup("net_amount").into(),
                config.rename_lookup("tax_amount").into(),
                currency_options.into(),
            ],
        );
    }
}

impl LineItem {
    /// Applies the behavior to `model_type`.
    pub fn acts_as(
        registry: &BehaviorRegistry,
        model_type: ModelType,
        args: Vec<BehaviorArg>,
    ) -> Arc<BehaviorConfig> {
        registry.acts_as::<Self>(model_type, args)
    }

    /// Current snapshot for `model_type`.
    #[must_use]
    pub fn config(
        registry: &BehaviorRegistry,
        model_type: ModelType,
    ) -> Option<Arc<BehaviorConfig>> {
        registry.config(Self::FAMILY, model_type)
    }

    fn read_amount(
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

    /// Rounded net amount.
    #[must_use]
    pub fn net_amount(registry: &BehaviorRegistry, record: &dyn Record) -> Option<Decimal> {
        Self::read_amount(registry, record, "net_amount")
    }

    /// Rounded tax amount.
    #[must_use]
    pub fn tax_amount(registry: &BehaviorRegistry, record: &dyn Record) -> Option<Decimal> {
        Self::read_amount(registry, record, "tax_amount")
    }
}
