//! Currency value behavior: rounded reads, raw writes and formatted output
//! for monetary attributes.
//!
//! CRITICAL: Rounding happens on read only. The unrounded input stays on the
//! record until the save-time write-back, so aggregations that run before the
//! save still see it.

use std::sync::Arc;

use invoicing_shared::types::CurrencyDescriptor;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use super::formatter::{self, FormatOptions};
use crate::behavior::record::parse_decimal;
use crate::behavior::{
    Behavior, BehaviorArg, BehaviorConfig, BehaviorError, BehaviorFamily, BehaviorRegistry,
    LifecycleCallback, LifecycleHook, ModelType, Record, Value,
};

/// Suffix of the formatted accessor of a governed attribute.
pub const FORMATTED_SUFFIX: &str = "_formatted";

/// Rounds `value` to the nearest multiple of `unit`, midpoints away from zero.
///
/// A non-positive unit leaves the value untouched, and so does a value
/// whose number of units does not fit a `Decimal`.
///
/// ```
/// use invoicing_core::currency::round_to_unit;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_to_unit(dec!(12.345), dec!(0.01)), dec!(12.35));
/// assert_eq!(round_to_unit(dec!(1.12), dec!(0.05)), dec!(1.10));
/// ```
#[must_use]
pub fn round_to_unit(value: Decimal, unit: Decimal) -> Decimal {
    if unit <= Decimal::ZERO {
        return value;
    }
    let rounded = value
        .checked_div(unit)
        .map(|steps| steps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|steps| steps.checked_mul(unit));
    if rounded.is_none() {
        warn!(%value, %unit, "amount out of range for rounding, kept unrounded");
    }
    rounded.unwrap_or(value)
}

/// Entry of the governed-attribute table of a model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernedAttribute {
    /// Stored attribute name.
    pub name: String,
    /// Name of its formatted accessor.
    pub formatted_name: String,
}

impl GovernedAttribute {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            formatted_name: format!("{name}{FORMATTED_SUFFIX}"),
        }
    }
}

/// The currency value behavior.
pub struct CurrencyValue;

impl Behavior for CurrencyValue {
    const FAMILY: BehaviorFamily = BehaviorFamily::CurrencyValue;

    fn included(registry: &BehaviorRegistry, model_type: ModelType) {
        registry.register_callback(
            model_type,
            LifecycleCallback::new(
                LifecycleHook::BeforeSave,
                "write_back_currency_values",
                write_back_currency_values,
            ),
        );
    }

    fn applied(_registry: &BehaviorRegistry, config: &Arc<BehaviorConfig>) {
        for attribute in config.new_args() {
            debug!(
                model_type = %config.model_type(),
                attribute = %attribute,
                "currency value attribute governed"
            );
        }
    }
}

fn write_back_currency_values(
    registry: &BehaviorRegistry,
    record: &mut dyn Record,
) -> Result<(), BehaviorError> {
    CurrencyValue::write_back(registry, record);
    Ok(())
}

impl CurrencyValue {
    /// Applies the behavior to `model_type` for the given attributes.
    ///
    /// Recognized options: `currency` (name of the currency attribute),
    /// `currency_code` (fallback code), `conversion_input` and
    /// `value_for_formatting` (callback names), `negative` (default style).
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

    /// Governed attributes of `model_type`, in declaration order.
    #[must_use]
    pub fn governed_attributes(
        registry: &BehaviorRegistry,
        model_type: ModelType,
    ) -> Vec<GovernedAttribute> {
        Self::config(registry, model_type)
            .map(|config| config.all_args().iter().map(|a| GovernedAttribute::new(a)).collect())
            .unwrap_or_default()
    }

    /// Finds a governed attribute by its name or its formatted accessor name.
    #[must_use]
    pub fn governed_attribute(
        registry: &BehaviorRegistry,
        model_type: ModelType,
        name: &str,
    ) -> Option<GovernedAttribute> {
        Self::governed_attributes(registry, model_type)
            .into_iter()
            .find(|g| g.name == name || g.formatted_name == name)
    }

    /// Currency code of `record`: its currency attribute if it has one, else
    /// the code known from context, else the `currency_code` option.
    #[must_use]
    pub fn currency_of(registry: &BehaviorRegistry, record: &dyn Record) -> Option<String> {
        let config = Self::config(registry, record.model_type());
        let attribute = config
            .as_deref()
            .map_or("currency", |c| c.rename_lookup("currency"));

        if record.has_attribute(attribute) {
            return record
                .read_attribute(attribute)
                .and_then(|v| v.as_text().map(str::to_owned));
        }
        if let Some(code) = record.currency_code() {
            return Some(code);
        }
        config.and_then(|c| c.option("currency_code").map(str::to_owned))
    }

    /// Descriptor for `record`, through the record's lookup hook.
    #[must_use]
    pub fn currency_descriptor_for(
        registry: &BehaviorRegistry,
        record: &dyn Record,
    ) -> Option<CurrencyDescriptor> {
        let code = Self::currency_of(registry, record);
        record.currency_descriptor(code.as_deref())
    }

    /// Raw decimal input for `attr`: from the `conversion_input` callback if
    /// one is configured and yields a value, else the stored value.
    #[must_use]
    pub fn conversion_input(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        attr: &str,
    ) -> Option<Decimal> {
        let from_callback = Self::config(registry, record.model_type())
            .and_then(|config| config.option("conversion_input").map(str::to_owned))
            .and_then(|name| match registry.conversion_input(&name) {
                Some(callback) => callback(registry, record, attr),
                None => {
                    warn!(callback = %name, "conversion_input callback not registered");
                    None
                }
            });

        from_callback.or_else(|| record.read_attribute(attr).and_then(|v| v.as_decimal()))
    }

    /// Rounded value of `attr`.
    ///
    /// Attributes the behavior does not govern, and records without a
    /// currency descriptor, yield the stored value unrounded.
    #[must_use]
    pub fn get(registry: &BehaviorRegistry, record: &dyn Record, attr: &str) -> Option<Decimal> {
        let raw = || record.read_attribute(attr).and_then(|v| v.as_decimal());

        let governed = Self::config(registry, record.model_type())
            .is_some_and(|config| config.all_args().iter().any(|a| a == attr));
        if !governed {
            return raw();
        }
        let Some(descriptor) = Self::currency_descriptor_for(registry, record) else {
            return raw();
        };

        Self::conversion_input(registry, record, attr)
            .map(|value| round_to_unit(value, descriptor.rounding_unit))
    }

    /// Stores `value` as given; rounding is deferred to reads.
    pub fn set(record: &mut dyn Record, attr: &str, value: Option<Value>) {
        record.write_attribute(attr, value);
    }

    /// Replaces every governed attribute with its rounded value.
    ///
    /// Attributes the record does not declare are skipped rather than
    /// created.
    pub fn write_back(registry: &BehaviorRegistry, record: &mut dyn Record) {
        let Some(config) = Self::config(registry, record.model_type()) else {
            return;
        };

        for attr in config.all_args() {
            if !record.has_attribute(attr) {
                debug!(
                    model_type = %record.model_type(),
                    attribute = %attr,
                    "governed attribute missing, not written back"
                );
                continue;
            }
            let rounded = Self::get(registry, &*record, attr);
            record.write_attribute(attr, rounded.map(Value::Decimal));
        }
    }

    /// Formats `value` in the currency of `record`.
    ///
    /// Caller options win over the behavior's configured defaults. A
    /// configured `value_for_formatting` callback may transform the value
    /// first; it never touches the record.
    pub fn format_value(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        value: Decimal,
        options: &FormatOptions,
    ) -> Result<String, BehaviorError> {
        let config = Self::config(registry, record.model_type());
        let defaults = config
            .as_deref()
            .map(|c| FormatOptions::from_options(c.all_options()))
            .unwrap_or_default();
        let options = options.clone().merged_over(&defaults);

        let mut value = value;
        if let Some(name) = config.as_deref().and_then(|c| c.option("value_for_formatting")) {
            match registry.value_for_formatting(name) {
                Some(intercept) => value = intercept(registry, record, value, &options)?,
                None => warn!(callback = name, "value_for_formatting callback not registered"),
            }
        }

        Ok(match Self::currency_descriptor_for(registry, record) {
            Some(descriptor) => formatter::format_value(&descriptor, value, &options),
            None => value.to_string(),
        })
    }

    /// Formatted accessor: `name` is a governed attribute or its
    /// `_formatted` accessor name.
    ///
    /// Works from the raw textual input; input that is not a number formats
    /// as an empty string.
    pub fn formatted(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        name: &str,
        options: &FormatOptions,
    ) -> Result<String, BehaviorError> {
        let attr = match Self::governed_attribute(registry, record.model_type(), name) {
            Some(governed) => governed.name,
            None => name.strip_suffix(FORMATTED_SUFFIX).unwrap_or(name).to_string(),
        };

        let Some(value) = record
            .attribute_before_type_cast(&attr)
            .as_deref()
            .and_then(parse_decimal)
        else {
            return Ok(String::new());
        };

        let mut options = options.clone();
        options.attribute = Some(attr);
        Self::format_value(registry, record, value, &options)
    }
}
