//! Currency descriptors used for rounding and display.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! The rounding unit is a `rust_decimal::Decimal` so that rounding stays exact.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest number of fractional digits a `Decimal` can carry.
const MAX_DECIMAL_DIGITS: u32 = 28;

/// Where the currency symbol is placed relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    /// Symbol before the amount (`$12.00`).
    Prefix,
    /// Symbol after the amount (`12.00 €`).
    Suffix,
}

/// How negative amounts are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeStyle {
    /// Prefix with the unicode minus sign (U+2212).
    #[default]
    Minus,
    /// Prefix with an ASCII hyphen.
    Hyphen,
    /// Wrap the amount in parentheses.
    Brackets,
}

impl std::fmt::Display for NegativeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minus => write!(f, "minus"),
            Self::Hyphen => write!(f, "hyphen"),
            Self::Brackets => write!(f, "brackets"),
        }
    }
}

impl std::str::FromStr for NegativeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minus" => Ok(Self::Minus),
            "hyphen" => Ok(Self::Hyphen),
            "brackets" => Ok(Self::Brackets),
            _ => Err(format!("Unknown negative style: {s}")),
        }
    }
}

/// Everything needed to round and display amounts in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyDescriptor {
    /// ISO 4217 style code (e.g., "EUR").
    pub code: String,
    /// Display symbol; empty means "no symbol".
    pub symbol: String,
    /// Smallest representable increment (e.g., 0.01, or 0.05 for cash CHF).
    pub rounding_unit: Decimal,
    /// Fractional digits shown when formatting, derived from the rounding unit.
    pub decimal_digits: u32,
    /// Placement of the symbol.
    pub symbol_position: SymbolPosition,
    /// Whether a space separates amount and symbol.
    pub use_space_separator: bool,
}

impl CurrencyDescriptor {
    /// Creates a descriptor, deriving `decimal_digits` from `rounding_unit`.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        symbol: impl Into<String>,
        rounding_unit: Decimal,
        symbol_position: SymbolPosition,
        use_space_separator: bool,
    ) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
            rounding_unit,
            decimal_digits: decimal_digits_for(rounding_unit),
            symbol_position,
            use_space_separator,
        }
    }

    /// The descriptor records fall back to: euro, cents, suffixed with a space.
    #[must_use]
    pub fn default_currency() -> Self {
        Self::new(
            "EUR",
            "\u{20ac}",
            Decimal::new(1, 2),
            SymbolPosition::Suffix,
            true,
        )
    }

    /// Looks up a built-in descriptor by code (case-insensitive).
    #[must_use]
    pub fn for_code(code: &str) -> Option<Self> {
        let cents = Decimal::new(1, 2);
        let descriptor = match code.to_uppercase().as_str() {
            "EUR" => Self::default_currency(),
            "USD" => Self::new("USD", "$", cents, SymbolPosition::Prefix, false),
            "GBP" => Self::new("GBP", "\u{a3}", cents, SymbolPosition::Prefix, false),
            "JPY" => Self::new("JPY", "\u{a5}", Decimal::ONE, SymbolPosition::Prefix, false),
            "IDR" => Self::new("IDR", "Rp", Decimal::ONE, SymbolPosition::Prefix, true),
            "SGD" => Self::new("SGD", "S$", cents, SymbolPosition::Prefix, false),
            "CHF" => Self::new("CHF", "CHF", Decimal::new(5, 2), SymbolPosition::Prefix, true),
            _ => return None,
        };
        Some(descriptor)
    }
}

/// Number of fractional digits implied by a rounding unit.
///
/// Equivalent to `-floor(log10(unit))` floored at zero, computed without floats:
/// the smallest `k >= 0` for which `unit * 10^k >= 1`.
#[must_use]
pub fn decimal_digits_for(rounding_unit: Decimal) -> u32 {
    if rounding_unit <= Decimal::ZERO {
        return 0;
    }

    let mut scaled = rounding_unit;
    let mut digits = 0;
    while scaled < Decimal::ONE && digits < MAX_DECIMAL_DIGITS {
        scaled *= Decimal::TEN;
        digits += 1;
    }
    digits
}

/// Set of known currencies, keyed by upper-case code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyTable {
    entries: BTreeMap<String, CurrencyDescriptor>,
}

impl CurrencyTable {
    /// Codes shipped with the crate.
    pub const BUILTIN_CODES: [&'static str; 7] = ["EUR", "USD", "GBP", "JPY", "IDR", "SGD", "CHF"];

    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding every built-in descriptor.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for descriptor in Self::BUILTIN_CODES
            .iter()
            .filter_map(|code| CurrencyDescriptor::for_code(code))
        {
            table.insert(descriptor);
        }
        table
    }

    /// Adds or replaces a descriptor.
    pub fn insert(&mut self, descriptor: CurrencyDescriptor) {
        self.entries
            .insert(descriptor.code.to_uppercase(), descriptor);
    }

    /// Returns the descriptor for `code`, if known.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&CurrencyDescriptor> {
        self.entries.get(&code.to_uppercase())
    }

    /// Number of known currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
