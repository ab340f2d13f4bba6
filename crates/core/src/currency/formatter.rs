//! Human-readable formatting of monetary values.
//!
//! Formatting is a pure function of a descriptor, a value and options. It
//! never changes the value that is stored.

use invoicing_shared::types::{CurrencyDescriptor, NegativeStyle, SymbolPosition};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::behavior::{Options, Value};

/// Unicode minus sign used for negative amounts by default.
pub const MINUS_SIGN: char = '\u{2212}';

/// Display sign requested for one side of a debit/credit perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignDisplay {
    /// Show as stored.
    Positive,
    /// Show with the sign flipped.
    Negative,
}

impl std::str::FromStr for SignDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            _ => Err(format!("Unknown sign display: {s}")),
        }
    }
}

/// Options accepted when formatting a value. Unset fields fall back to the
/// behavior's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Rendering of negative amounts.
    pub negative: Option<NegativeStyle>,
    /// Sign applied when the item is a debit for `self_id`.
    pub debit: Option<SignDisplay>,
    /// Sign applied when the item is a credit for `self_id`.
    pub credit: Option<SignDisplay>,
    /// Viewing party; `None` means the operating party itself.
    pub self_id: Option<Value>,
    /// Attribute being formatted, filled in by the formatted accessor.
    pub attribute: Option<String>,
}

impl FormatOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the negative style.
    #[must_use]
    pub fn negative(mut self, style: NegativeStyle) -> Self {
        self.negative = Some(style);
        self
    }

    /// Sets the debit display.
    #[must_use]
    pub fn debit(mut self, display: SignDisplay) -> Self {
        self.debit = Some(display);
        self
    }

    /// Sets the credit display.
    #[must_use]
    pub fn credit(mut self, display: SignDisplay) -> Self {
        self.credit = Some(display);
        self
    }

    /// Sets the viewing party.
    #[must_use]
    pub fn self_id(mut self, self_id: impl Into<Value>) -> Self {
        self.self_id = Some(self_id.into());
        self
    }

    /// Reads `negative`, `debit` and `credit` from a behavior option map.
    /// Unparseable values are skipped.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            negative: parse_option(options, "negative"),
            debit: parse_option(options, "debit"),
            credit: parse_option(options, "credit"),
            self_id: None,
            attribute: None,
        }
    }

    /// Fills every unset field from `defaults`.
    #[must_use]
    pub fn merged_over(self, defaults: &FormatOptions) -> Self {
        Self {
            negative: self.negative.or(defaults.negative),
            debit: self.debit.or(defaults.debit),
            credit: self.credit.or(defaults.credit),
            self_id: self.self_id.or_else(|| defaults.self_id.clone()),
            attribute: self.attribute.or_else(|| defaults.attribute.clone()),
        }
    }
}

fn parse_option<T: std::str::FromStr<Err = String>>(options: &Options, key: &str) -> Option<T> {
    let raw = options.get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(message) => {
            warn!(option = key, %message, "ignoring formatting option");
            None
        }
    }
}

/// Formats `value` in the given currency.
///
/// ```
/// use invoicing_core::currency::{FormatOptions, format_value};
/// use invoicing_shared::types::{CurrencyDescriptor, NegativeStyle};
/// use rust_decimal_macros::dec;
///
/// let eur = CurrencyDescriptor::default_currency();
/// assert_eq!(format_value(&eur, dec!(1234.5), &FormatOptions::new()), "1,234.50 €");
///
/// let brackets = FormatOptions::new().negative(NegativeStyle::Brackets);
/// assert_eq!(format_value(&eur, dec!(-1234.5), &brackets), "(1,234.50 €)");
/// ```
#[must_use]
pub fn format_value(
    descriptor: &CurrencyDescriptor,
    value: Decimal,
    options: &FormatOptions,
) -> String {
    let negative = value < Decimal::ZERO;

    let mut fixed = value
        .abs()
        .round_dp_with_strategy(descriptor.decimal_digits, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(descriptor.decimal_digits);
    let text = fixed.to_string();
    // a zero magnitude may still print with a sign
    let text = text.trim_start_matches('-');

    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    let mut amount = group_thousands(integer);
    if let Some(fraction) = fraction {
        amount.push('.');
        amount.push_str(fraction);
    }

    let formatted = attach_symbol(descriptor, amount);

    if !negative {
        return formatted;
    }
    match options.negative.unwrap_or_default() {
        NegativeStyle::Brackets => format!("({formatted})"),
        NegativeStyle::Hyphen => format!("-{formatted}"),
        NegativeStyle::Minus => format!("{MINUS_SIGN}{formatted}"),
    }
}

fn attach_symbol(descriptor: &CurrencyDescriptor, amount: String) -> String {
    let symbol = descriptor.symbol.as_str();
    if symbol.is_empty() {
        return amount;
    }

    let separator = if descriptor.use_space_separator { " " } else { "" };
    match descriptor.symbol_position {
        SymbolPosition::Suffix => format!("{amount}{separator}{symbol}"),
        SymbolPosition::Prefix => format!("{symbol}{separator}{amount}"),
    }
}

/// Inserts a comma every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
