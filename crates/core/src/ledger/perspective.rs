//! Debit/credit perspective of a ledger item.
//!
//! A viewer is identified by a party id; `None` stands for the operating
//! party itself, recognized through an `is_self` flag in the party's
//! details.

use rust_decimal::Decimal;

use super::item::LedgerItem;
use crate::behavior::{BehaviorError, BehaviorRegistry, Record, Value};
use crate::currency::{FormatOptions, SignDisplay};

impl LedgerItem {
    /// Returns true if `viewer` sent this document.
    #[must_use]
    pub fn sent_by(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        viewer: Option<&Value>,
    ) -> bool {
        Self::is_party(registry, record, viewer, "sender_id", "sender_details")
    }

    /// Returns true if `viewer` received this document.
    #[must_use]
    pub fn received_by(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        viewer: Option<&Value>,
    ) -> bool {
        Self::is_party(registry, record, viewer, "recipient_id", "recipient_details")
    }

    fn is_party(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        viewer: Option<&Value>,
        id_attribute: &str,
        details_attribute: &str,
    ) -> bool {
        if Self::read(registry, record, id_attribute).as_ref() == viewer {
            return true;
        }
        viewer.is_none()
            && Self::read(registry, record, details_attribute)
                .as_ref()
                .and_then(Value::as_map)
                .and_then(|details| details.get("is_self"))
                .is_some_and(Value::is_truthy)
    }

    /// Whether the document is a debit from `viewer`'s point of view.
    ///
    /// The viewer must be exactly one of sender and recipient.
    pub fn is_debit(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        viewer: Option<&Value>,
    ) -> Result<bool, BehaviorError> {
        let sent = Self::sent_by(registry, record, viewer);
        let received = Self::received_by(registry, record, viewer);
        let self_id = || viewer.map_or_else(|| "nil".to_string(), ToString::to_string);

        match (sent, received) {
            (false, false) => Err(BehaviorError::AmbiguousParty { self_id: self_id() }),
            (true, true) => Err(BehaviorError::ConflictingParty { self_id: self_id() }),
            _ => {
                if Self::debit_when_sent_by_self(registry, record.model_type())? {
                    Ok(sent)
                } else {
                    Ok(received)
                }
            }
        }
    }

    /// Display-only sign flips for formatting.
    ///
    /// Negates the value if `debit` is negative and the document is a debit
    /// for `self_id`, and independently if `credit` is negative and it is a
    /// credit. The perspective is only resolved when a flip is requested.
    pub fn value_for_formatting(
        registry: &BehaviorRegistry,
        record: &dyn Record,
        value: Decimal,
        options: &FormatOptions,
    ) -> Result<Decimal, BehaviorError> {
        let viewer = options.self_id.as_ref();
        let mut value = value;

        if options.debit == Some(SignDisplay::Negative)
            && Self::is_debit(registry, record, viewer)?
        {
            value = -value;
        }
        if options.credit == Some(SignDisplay::Negative)
            && !Self::is_debit(registry, record, viewer)?
        {
            value = -value;
        }
        Ok(value)
    }
}
