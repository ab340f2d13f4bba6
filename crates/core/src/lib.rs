//! Composable behaviors for financial records.
//!
//! This crate contains pure logic with ZERO persistence dependencies.
//! Records are reached through the [`Record`] trait; behaviors are applied
//! to model types through a [`BehaviorRegistry`].
//!
//! # Modules
//!
//! - `behavior` - Behavior config chain, registry and lifecycle callbacks
//! - `currency` - Currency rounding and formatting
//! - `ledger` - Ledger item totals and debit/credit perspective
//! - `memory` - In-memory records
//!
//! ```
//! use invoicing_core::{BehaviorRegistry, CurrencyValue, ModelType, Record, Value};
//! use invoicing_core::memory::InMemoryRecord;
//! use rust_decimal_macros::dec;
//!
//! static PRODUCT: ModelType = ModelType::root("Product");
//!
//! let registry = BehaviorRegistry::new();
//! CurrencyValue::acts_as(&registry, PRODUCT, vec!["price".into()]);
//!
//! let mut product = InMemoryRecord::new(PRODUCT).with_attribute("price", Value::from("9.999"));
//! assert_eq!(CurrencyValue::get(&registry, &product, "price"), Some(dec!(10.00)));
//!
//! registry.prepare_for_save(&mut product).unwrap();
//! assert_eq!(product.read_attribute("price"), Some(Value::Decimal(dec!(10.00))));
//! ```

pub mod behavior;
pub mod currency;
pub mod ledger;
pub mod memory;

pub use behavior::{
    Behavior, BehaviorArg, BehaviorConfig, BehaviorError, BehaviorFamily, BehaviorRegistry,
    LifecycleHook, ModelType, Options, Record, Value, options,
};
pub use currency::{CurrencyValue, FormatOptions, SignDisplay};
pub use ledger::{LedgerItem, LedgerItemRecord, LineItem, LineItemRecord, Subtype};
