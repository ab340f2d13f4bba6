//! Lifecycle hook points behaviors register into.
//!
//! The persistence collaborator owns the save lifecycle; it calls
//! [`BehaviorRegistry::run_callbacks`](super::BehaviorRegistry::run_callbacks)
//! at each hook point and the registered callbacks run in order.

use super::error::BehaviorError;
use super::record::Record;
use super::registry::BehaviorRegistry;

/// Hook points of the save lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    /// Before validation; derived values are computed here.
    BeforeValidation,
    /// After validation, right before the record is persisted.
    BeforeSave,
}

/// Signature of a lifecycle callback.
pub type CallbackFn = fn(&BehaviorRegistry, &mut dyn Record) -> Result<(), BehaviorError>;

/// A callback registered on a model type.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleCallback {
    /// Hook point it runs at.
    pub hook: LifecycleHook,
    /// Name for logs and errors.
    pub name: &'static str,
    /// The callback itself.
    pub run: CallbackFn,
}

impl LifecycleCallback {
    /// Creates a callback.
    #[must_use]
    pub const fn new(hook: LifecycleHook, name: &'static str, run: CallbackFn) -> Self {
        Self { hook, name, run }
    }
}
