//! Behavior composition for record types.
//!
//! This module implements the protocol every behavior is built on:
//! - Model type identities with explicit inheritance
//! - The record capability contract
//! - Immutable config chain snapshots and alias resolution
//! - A registry keyed by behavior family and model type
//! - Ordered lifecycle callbacks

pub mod chain;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod record;
pub mod registry;

#[cfg(test)]
mod props;

use std::sync::Arc;

pub use chain::{BehaviorArg, BehaviorConfig, BehaviorFamily, Options, extract_args, options};
pub use error::BehaviorError;
pub use lifecycle::{CallbackFn, LifecycleCallback, LifecycleHook};
pub use model::ModelType;
pub use record::{Record, Value};
pub use registry::{BehaviorRegistry, ConversionInputFn, ValueForFormattingFn};

/// A reusable extension that can be applied to model types, repeatedly and
/// across a type hierarchy.
pub trait Behavior {
    /// Chain the behavior's snapshots are stored under.
    const FAMILY: BehaviorFamily;

    /// Options the first application in a chain starts from.
    fn option_defaults() -> Options {
        Options::new()
    }

    /// One-time setup when the family first reaches a type hierarchy.
    fn included(_registry: &BehaviorRegistry, _model_type: ModelType) {}

    /// Runs after every application, with the new snapshot.
    fn applied(_registry: &BehaviorRegistry, _config: &Arc<BehaviorConfig>) {}
}
