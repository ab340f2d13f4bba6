//! Registry of behavior applications keyed by family and model type.
//!
//! Declarations are written once, normally during single-threaded startup,
//! and read for the rest of the process. The maps are concurrent so reads
//! from several threads need no extra locking; declaring a behavior while
//! other threads read is still the caller's responsibility to serialize.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tracing::debug;

use super::Behavior;
use super::chain::{BehaviorArg, BehaviorConfig, BehaviorFamily};
use super::error::BehaviorError;
use super::lifecycle::{LifecycleCallback, LifecycleHook};
use super::model::ModelType;
use super::record::Record;
use crate::currency::FormatOptions;

/// Named callback producing the raw decimal input of a currency attribute.
pub type ConversionInputFn = fn(&BehaviorRegistry, &dyn Record, &str) -> Option<Decimal>;

/// Named callback transforming a value right before it is formatted.
pub type ValueForFormattingFn =
    fn(&BehaviorRegistry, &dyn Record, Decimal, &FormatOptions) -> Result<Decimal, BehaviorError>;

type ChainKey = (BehaviorFamily, ModelType);

static GLOBAL: Lazy<BehaviorRegistry> = Lazy::new(BehaviorRegistry::new);

/// Holds the config chain heads, lifecycle callbacks and named callbacks.
#[derive(Default)]
pub struct BehaviorRegistry {
    /// Snapshots produced by applications on exactly this type.
    applied: DashMap<ChainKey, Arc<BehaviorConfig>>,
    /// Snapshots resolved from an ancestor, memoized on first lookup.
    inherited: DashMap<ChainKey, Arc<BehaviorConfig>>,
    callbacks: DashMap<ModelType, Vec<LifecycleCallback>>,
    conversion_inputs: DashMap<String, ConversionInputFn>,
    value_formatters: DashMap<String, ValueForFormattingFn>,
}

impl BehaviorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Applies behavior `B` to `model_type`.
    ///
    /// The first application on a type hierarchy runs `B::included` (callback
    /// registration); every application then pushes a new snapshot linked to
    /// the most specific existing one and runs `B::applied`.
    pub fn acts_as<B: Behavior>(
        &self,
        model_type: ModelType,
        args: Vec<BehaviorArg>,
    ) -> Arc<BehaviorConfig> {
        let previous = self.config(B::FAMILY, model_type);
        if previous.is_none() {
            B::included(self, model_type);
        }

        let config = Arc::new(BehaviorConfig::new(
            B::FAMILY,
            model_type,
            previous,
            args,
            &B::option_defaults(),
        ));
        self.applied
            .insert((B::FAMILY, model_type), Arc::clone(&config));

        debug!(
            family = %B::FAMILY,
            model_type = %model_type,
            new_args = ?config.new_args(),
            first = config.is_first_application(),
            "behavior applied"
        );

        B::applied(self, &config);
        config
    }

    /// Current snapshot of `family` for `model_type`: its own, else the
    /// nearest ancestor's (memoized).
    #[must_use]
    pub fn config(
        &self,
        family: BehaviorFamily,
        model_type: ModelType,
    ) -> Option<Arc<BehaviorConfig>> {
        let key = (family, model_type);
        if let Some(own) = self.applied.get(&key).map(|e| Arc::clone(e.value())) {
            return Some(own);
        }
        if let Some(memo) = self.inherited.get(&key).map(|e| Arc::clone(e.value())) {
            return Some(memo);
        }

        let found = model_type
            .ancestors()
            .find_map(|ancestor| {
                self.applied
                    .get(&(family, ancestor))
                    .map(|e| Arc::clone(e.value()))
            })?;
        self.inherited.insert(key, Arc::clone(&found));
        Some(found)
    }

    /// Returns true if `family` was applied to `model_type` or an ancestor.
    #[must_use]
    pub fn has_behavior(&self, family: BehaviorFamily, model_type: ModelType) -> bool {
        self.config(family, model_type).is_some()
    }

    /// Appends a lifecycle callback to `model_type`.
    pub fn register_callback(&self, model_type: ModelType, callback: LifecycleCallback) {
        debug!(
            model_type = %model_type,
            hook = ?callback.hook,
            callback = callback.name,
            "lifecycle callback registered"
        );
        self.callbacks.entry(model_type).or_default().push(callback);
    }

    /// Callbacks for `hook` that apply to `model_type`: ancestors' first
    /// (root downwards), each type's in registration order.
    #[must_use]
    pub fn callbacks_for(
        &self,
        model_type: ModelType,
        hook: LifecycleHook,
    ) -> Vec<LifecycleCallback> {
        let mut lineage: Vec<ModelType> = model_type.lineage().collect();
        lineage.reverse();

        lineage
            .into_iter()
            .filter_map(|t| self.callbacks.get(&t).map(|e| e.value().clone()))
            .flatten()
            .filter(|callback| callback.hook == hook)
            .collect()
    }

    /// Runs every callback registered for `hook` on the record's type.
    ///
    /// Stops at the first failing callback.
    pub fn run_callbacks(
        &self,
        hook: LifecycleHook,
        record: &mut dyn Record,
    ) -> Result<(), BehaviorError> {
        for callback in self.callbacks_for(record.model_type(), hook) {
            (callback.run)(self, &mut *record)?;
        }
        Ok(())
    }

    /// Runs the hooks a save goes through, in order: before validation,
    /// then before save.
    pub fn prepare_for_save(&self, record: &mut dyn Record) -> Result<(), BehaviorError> {
        self.run_callbacks(LifecycleHook::BeforeValidation, record)?;
        self.run_callbacks(LifecycleHook::BeforeSave, record)
    }

    /// Registers a named `conversion_input` callback.
    pub fn register_conversion_input(&self, name: impl Into<String>, callback: ConversionInputFn) {
        self.conversion_inputs.insert(name.into(), callback);
    }

    /// Looks up a named `conversion_input` callback.
    #[must_use]
    pub fn conversion_input(&self, name: &str) -> Option<ConversionInputFn> {
        self.conversion_inputs.get(name).map(|e| *e.value())
    }

    /// Registers a named `value_for_formatting` callback.
    pub fn register_value_for_formatting(
        &self,
        name: impl Into<String>,
        callback: ValueForFormattingFn,
    ) {
        self.value_formatters.insert(name.into(), callback);
    }

    /// Looks up a named `value_for_formatting` callback.
    #[must_use]
    pub fn value_for_formatting(&self, name: &str) -> Option<ValueForFormattingFn> {
        self.value_formatters.get(name).map(|e| *e.value())
    }
}
