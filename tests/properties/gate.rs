//! Property tests for the trigger filter.

use std::cell::Cell;

use proptest::prelude::*;

use deploygate::domain::ports::RevisionReader;
use deploygate::domain::services::{GateDecision, SkipReason, TriggerFilter};
use deploygate::{DeployGateResult, RevisionId};

/// Counts lookups; every file exists
#[derive(Default)]
struct CountingReader {
    reads: Cell<usize>,
}

impl RevisionReader for CountingReader {
    fn read_file(&self, _revision: &RevisionId, _path: &str) -> DeployGateResult<Option<String>> {
        self.reads.set(self.reads.get() + 1);
        Ok(Some(String::new()))
    }
}

fn revision() -> impl Strategy<Value = RevisionId> {
    "[0-9a-f]{40}".prop_map(|s| s.parse().unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Any ref other than the target branch is skipped without
    /// touching the repository.
    #[test]
    fn property_other_refs_skip_without_reads(
        refname in "refs/(heads|tags|changes)/[A-Za-z0-9/_.-]{0,24}",
        rev in revision(),
    ) {
        prop_assume!(refname != "refs/heads/master");
        let reader = CountingReader::default();

        let decision = TriggerFilter::default().evaluate(&refname, &rev, &reader);

        let is_not_target = matches!(
            decision,
            GateDecision::Skip(SkipReason::NotTargetBranch { .. })
        );
        prop_assert!(is_not_target);
        prop_assert_eq!(reader.reads.get(), 0);
    }

    /// PROPERTY: With both files present, the target branch proceeds for
    /// every non-zero revision.
    #[test]
    fn property_target_branch_with_files_proceeds(rev in revision()) {
        prop_assume!(!rev.is_zero());
        let reader = CountingReader::default();

        let decision = TriggerFilter::default().evaluate("refs/heads/master", &rev, &reader);

        prop_assert_eq!(decision, GateDecision::Proceed);
        prop_assert_eq!(reader.reads.get(), 2);
    }
}
