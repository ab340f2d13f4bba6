//! Behavior config chain: immutable snapshots of every behavior application.
//!
//! Each application of a behavior family to a model type produces one
//! [`BehaviorConfig`]. It links to the snapshot that was in effect before
//! (on the same type or an ancestor), and its merged arguments and options
//! are fully determined by that link plus its own input. Nothing is mutated
//! after construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use super::model::ModelType;
use super::record::{Record, Value};

/// Option map of a behavior application. Keys are canonical names; values
/// are names too (renamed attributes, callback names, subtype tags, codes).
pub type Options = BTreeMap<String, String>;

/// Builds an [`Options`] map from pairs.
pub fn options<K, V, I>(pairs: I) -> Options
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// The families of behaviors a model type can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorFamily {
    /// Rounded and formatted monetary attributes.
    CurrencyValue,
    /// Invoices, credit notes, payments.
    LedgerItem,
    /// Lines contributing to a ledger item's totals.
    LineItem,
}

impl BehaviorFamily {
    /// Snake-case name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CurrencyValue => "currency_value",
            Self::LedgerItem => "ledger_item",
            Self::LineItem => "line_item",
        }
    }
}

impl std::fmt::Display for BehaviorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One element of the free-form argument list of a behavior application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BehaviorArg {
    /// An attribute name.
    Attr(String),
    /// A nested list, flattened on extraction.
    List(Vec<BehaviorArg>),
    /// An option map; only honoured in trailing position.
    Options(Options),
}

impl From<&str> for BehaviorArg {
    fn from(name: &str) -> Self {
        Self::Attr(name.to_string())
    }
}

impl From<String> for BehaviorArg {
    fn from(name: String) -> Self {
        Self::Attr(name)
    }
}

impl From<Options> for BehaviorArg {
    fn from(options: Options) -> Self {
        Self::Options(options)
    }
}

impl<T: Into<BehaviorArg>> From<Vec<T>> for BehaviorArg {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Splits an argument list into deduplicated attribute names and the
/// trailing option map.
pub fn extract_args(mut args: Vec<BehaviorArg>) -> (Vec<String>, Options) {
    let options = match args.pop() {
        Some(BehaviorArg::Options(options)) => options,
        Some(other) => {
            args.push(other);
            Options::new()
        }
        None => Options::new(),
    };

    let mut names = Vec::new();
    flatten_into(args, &mut names);
    (names, options)
}

fn flatten_into(args: Vec<BehaviorArg>, names: &mut Vec<String>) {
    for arg in args {
        match arg {
            BehaviorArg::Attr(name) => {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            BehaviorArg::List(items) => flatten_into(items, names),
            BehaviorArg::Options(ignored) => {
                warn!(
                    keys = ?ignored.keys().collect::<Vec<_>>(),
                    "ignoring non-trailing option map"
                );
            }
        }
    }
}

/// Snapshot of one behavior application.
#[derive(Debug)]
pub struct BehaviorConfig {
    family: BehaviorFamily,
    model_type: ModelType,
    previous: Option<Arc<BehaviorConfig>>,
    current_args: Vec<String>,
    all_args: Vec<String>,
    new_args: Vec<String>,
    current_options: Options,
    all_options: Options,
}

impl BehaviorConfig {
    /// Builds the snapshot for one application.
    ///
    /// `defaults` only matter for the first application in a chain; later
    /// applications start from `previous.all_options`.
    #[must_use]
    pub fn new(
        family: BehaviorFamily,
        model_type: ModelType,
        previous: Option<Arc<BehaviorConfig>>,
        args: Vec<BehaviorArg>,
        defaults: &Options,
    ) -> Self {
        let (current_args, current_options) = extract_args(args);

        let mut all_options = previous
            .as_ref()
            .map_or_else(|| defaults.clone(), |p| p.all_options.clone());
        all_options.extend(
            current_options
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let (all_args, new_args) = match &previous {
            None => (current_args.clone(), current_args.clone()),
            Some(p) => {
                let mut all_args = p.all_args.clone();
                let mut new_args = Vec::new();
                for arg in &current_args {
                    if !all_args.contains(arg) {
                        all_args.push(arg.clone());
                        new_args.push(arg.clone());
                    }
                }
                (all_args, new_args)
            }
        };

        Self {
            family,
            model_type,
            previous,
            current_args,
            all_args,
            new_args,
            current_options,
            all_options,
        }
    }

    /// Behavior family of this snapshot.
    #[must_use]
    pub fn family(&self) -> BehaviorFamily {
        self.family
    }

    /// Type the behavior was applied to.
    #[must_use]
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    /// Snapshot in effect before this application.
    #[must_use]
    pub fn previous(&self) -> Option<&Arc<BehaviorConfig>> {
        self.previous.as_ref()
    }

    /// True when no earlier application exists on this type or its ancestors.
    #[must_use]
    pub fn is_first_application(&self) -> bool {
        self.previous.is_none()
    }

    /// Attribute names given to this application.
    #[must_use]
    pub fn current_args(&self) -> &[String] {
        &self.current_args
    }

    /// All attribute names of the chain, earliest first.
    #[must_use]
    pub fn all_args(&self) -> &[String] {
        &self.all_args
    }

    /// Names introduced by this application.
    #[must_use]
    pub fn new_args(&self) -> &[String] {
        &self.new_args
    }

    /// Options given to this application.
    #[must_use]
    pub fn current_options(&self) -> &Options {
        &self.current_options
    }

    /// Defaults, then earlier options, then this application's; later wins.
    #[must_use]
    pub fn all_options(&self) -> &Options {
        &self.all_options
    }

    /// Merged option value for `key`.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.all_options.get(key).map(String::as_str)
    }

    /// Resolves an alias: the option value stored under `name`, or `name`.
    #[must_use]
    pub fn rename_lookup<'a>(&'a self, name: &'a str) -> &'a str {
        self.option(name).unwrap_or(name)
    }

    /// Reads the attribute `name` resolves to, or `None` when the record is
    /// absent or does not expose it.
    #[must_use]
    pub fn read(&self, record: Option<&dyn Record>, name: &str) -> Option<Value> {
        let attribute = self.rename_lookup(name);
        let record = record?;
        if !record.has_attribute(attribute) {
            return None;
        }
        record.read_attribute(attribute)
    }

    /// Writes the attribute `name` resolves to; no-op without a record.
    pub fn write(&self, record: Option<&mut dyn Record>, name: &str, value: Option<Value>) {
        if let Some(record) = record {
            record.write_attribute(self.rename_lookup(name), value);
        }
    }

    /// This snapshot followed by every earlier one.
    pub fn history(&self) -> impl Iterator<Item = &BehaviorConfig> {
        std::iter::successors(Some(self), |config| config.previous.as_deref())
    }
}
