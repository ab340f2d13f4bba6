//! Currency-aware monetary attributes.
//!
//! - Exact rounding to a currency's smallest unit on read
//! - Raw write-through with a save-time write-back
//! - Human-readable formatting with configurable negative styles

pub mod formatter;
pub mod value;

#[cfg(test)]
mod props;

pub use formatter::{FormatOptions, MINUS_SIGN, SignDisplay, format_value};
pub use value::{CurrencyValue, FORMATTED_SUFFIX, GovernedAttribute, round_to_unit};
