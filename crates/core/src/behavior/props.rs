//! Property-based tests for the behavior config chain.
//!
//! - Monotonicity: merged args are the first-seen union of every application
//! - Last write wins: merged options hold the latest value per key

use std::sync::Arc;

use proptest::prelude::*;

use super::chain::{BehaviorArg, BehaviorConfig, BehaviorFamily, Options};
use super::model::ModelType;
use super::registry::BehaviorRegistry;
use super::Behavior;

static CHAINED: ModelType = ModelType::root("Chained");
static CHAINED_CHILD: ModelType = ModelType::derived("ChainedChild", &CHAINED);

struct Plain;

impl Behavior for Plain {
    const FAMILY: BehaviorFamily = BehaviorFamily::CurrencyValue;
}

/// Strategy for one application: attribute names and an option map.
fn application() -> impl Strategy<Value = (Vec<String>, Options)> {
    (
        prop::collection::vec("[a-f]", 0..5),
        prop::collection::btree_map("k[1-3]", "[a-z]{1,3}", 0..3),
    )
}

fn to_args(names: &[String], options: &Options) -> Vec<BehaviorArg> {
    let mut args: Vec<BehaviorArg> = names.iter().cloned().map(BehaviorArg::Attr).collect();
    args.push(BehaviorArg::Options(options.clone()));
    args
}

fn expected_args(applications: &[(Vec<String>, Options)]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in applications.iter().flat_map(|(names, _)| names) {
        if !seen.contains(name) {
            seen.push(name.clone());
        }
    }
    seen
}

fn expected_options(applications: &[(Vec<String>, Options)]) -> Options {
    let mut merged = Options::new();
    for (_, options) in applications {
        merged.extend(options.clone());
    }
    merged
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* sequence of applications, `all_args` is the deduplicated
    /// union in first-seen order and `all_options` is last-write-wins.
    #[test]
    fn prop_chain_merges_monotonically(
        applications in prop::collection::vec(application(), 1..6),
    ) {
        let mut head: Option<Arc<BehaviorConfig>> = None;
        for (names, options) in &applications {
            head = Some(Arc::new(BehaviorConfig::new(
                BehaviorFamily::CurrencyValue,
                CHAINED,
                head.take(),
                to_args(names, options),
                &Options::new(),
            )));
        }
        let head = head.unwrap();

        prop_assert_eq!(head.all_args().to_vec(), expected_args(&applications));
        prop_assert_eq!(head.all_options(), &expected_options(&applications));
        prop_assert_eq!(head.history().count(), applications.len());
    }

    /// *For any* application, `new_args` are exactly the names the previous
    /// snapshot did not have.
    #[test]
    fn prop_new_args_are_the_difference(
        first in application(),
        second in application(),
    ) {
        let registry = BehaviorRegistry::new();
        let parent = registry.acts_as::<Plain>(CHAINED, to_args(&first.0, &first.1));
        let child = registry.acts_as::<Plain>(CHAINED_CHILD, to_args(&second.0, &second.1));

        let expected: Vec<String> = child
            .all_args()
            .iter()
            .filter(|name| !parent.all_args().contains(name))
            .cloned()
            .collect();
        prop_assert_eq!(child.new_args().to_vec(), expected);
        prop_assert!(child.all_args().starts_with(parent.all_args()));
    }
}
