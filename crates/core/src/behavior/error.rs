//! Errors raised while evaluating behaviors.
//!
//! Missing attributes, currencies and associations are not errors; they are
//! `None`. Only questions that cannot be answered unambiguously fail.

use invoicing_shared::AppError;
use thiserror::Error;

/// Errors that can occur while evaluating behaviors on a record.
#[derive(Debug, Error)]
pub enum BehaviorError {
    /// The viewer is neither sender nor recipient.
    #[error("self_id {self_id} is neither sender nor recipient")]
    AmbiguousParty {
        /// The viewer identity as displayed.
        self_id: String,
    },

    /// The viewer is both sender and recipient.
    #[error("self_id {self_id} is both sender and recipient")]
    ConflictingParty {
        /// The viewer identity as displayed.
        self_id: String,
    },

    /// The ledger subtype has no debit policy and the type does not set one.
    #[error("{model_type} has subtype {subtype} without a debit_when_sent_by_self policy")]
    UndefinedDebitPolicy {
        /// Record type name.
        model_type: String,
        /// Subtype name (or "none").
        subtype: String,
    },

    /// A ledger item operation was invoked on a record that is not one.
    #[error("{model_type} does not act as a ledger item")]
    NotALedgerItem {
        /// Record type name.
        model_type: String,
    },

    /// Summing or subtracting amounts left the decimal range.
    #[error("{attribute} of {model_type} overflows")]
    AmountOverflow {
        /// Record type name.
        model_type: String,
        /// Attribute being computed.
        attribute: String,
    },

    /// A lifecycle callback failed.
    #[error("Callback {name} failed: {message}")]
    Callback {
        /// Callback name.
        name: String,
        /// Failure description.
        message: String,
    },
}

impl BehaviorError {
    /// Returns the error code for logs and reports.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AmbiguousParty { .. } => "AMBIGUOUS_PARTY",
            Self::ConflictingParty { .. } => "CONFLICTING_PARTY",
            Self::UndefinedDebitPolicy { .. } => "UNDEFINED_DEBIT_POLICY",
            Self::NotALedgerItem { .. } => "NOT_A_LEDGER_ITEM",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
            Self::Callback { .. } => "CALLBACK_FAILED",
        }
    }
}

impl From<BehaviorError> for AppError {
    fn from(err: BehaviorError) -> Self {
        match err {
            BehaviorError::AmbiguousParty { .. }
            | BehaviorError::ConflictingParty { .. }
            | BehaviorError::UndefinedDebitPolicy { .. }
            | BehaviorError::AmountOverflow { .. } => Self::InvalidArgument(err.to_string()),
            BehaviorError::NotALedgerItem { .. } | BehaviorError::Callback { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BehaviorError::AmbiguousParty { self_id: "1".into() }.error_code(),
            "AMBIGUOUS_PARTY"
        );
        assert_eq!(
            BehaviorError::ConflictingParty { self_id: "1".into() }.error_code(),
            "CONFLICTING_PARTY"
        );
        assert_eq!(
            BehaviorError::UndefinedDebitPolicy {
                model_type: "Receipt".into(),
                subtype: "receipt".into()
            }
            .error_code(),
            "UNDEFINED_DEBIT_POLICY"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BehaviorError::AmbiguousParty { self_id: "42".into() }.to_string(),
            "self_id 42 is neither sender nor recipient"
        );
        assert_eq!(
            BehaviorError::ConflictingParty { self_id: "none".into() }.to_string(),
            "self_id none is both sender and recipient"
        );
    }

    #[test]
    fn test_party_errors_become_invalid_argument() {
        let err: AppError = BehaviorError::AmbiguousParty { self_id: "9".into() }.into();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");

        let err: AppError = BehaviorError::NotALedgerItem {
            model_type: "Note".into(),
        }
        .into();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");

        let err: AppError = BehaviorError::AmountOverflow {
            model_type: "Invoice".into(),
            attribute: "total_amount".into(),
        }
        .into();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }
}
