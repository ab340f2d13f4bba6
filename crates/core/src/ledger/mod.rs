//! Ledger item and line item behaviors.
//!
//! This module implements:
//! - The ledger and line item record contracts
//! - Total and tax aggregation across line items
//! - Subtype conveniences and debit policies
//! - Debit/credit perspective for display

pub mod item;
pub mod line_item;
mod perspective;
pub mod types;

#[cfg(test)]
mod props;

pub use item::{LedgerItem, PERSPECTIVE_FORMATTER};
pub use line_item::LineItem;
pub use types::{LedgerItemRecord, LedgerItemRef, LineItemRecord, Subtype};
