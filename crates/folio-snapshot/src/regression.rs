//! Before/after regression detection
//!
//! [`compare`] classifies every rule seen in either snapshot as fixed,
//! regressed or unchanged and recommends what to do with the pass output.
//!
//! # Recommendation order
//!
//! 1. any critical regression (failing rule with `error` severity) → revert
//! 2. net change below zero → revert
//! 3. nothing regressed → accept
//! 4. otherwise → review, unless a [`ReviewPolicy`] threshold promotes it

use crate::error::SnapshotError;
use crate::snapshot::{RuleSnapshot, Severity, SnapshotKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What the caller should do with a pass's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// Keep the new content
    Accept,
    /// Restore the pre-pass content and snapshot
    Revert,
    /// Some rule regressed but the pass was not a net loss
    Review,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => f.write_str("accept"),
            Self::Revert => f.write_str("revert"),
            Self::Review => f.write_str("review"),
        }
    }
}

/// Policy for promoting `review` outcomes
///
/// With no threshold (the default) every non-critical regression that is
/// offset by fixes is sent to review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewPolicy {
    /// Accept instead of review when `net_change >= threshold`
    pub auto_accept_net_threshold: Option<u32>,
}

impl ReviewPolicy {
    /// Conservative policy: always review
    #[inline]
    #[must_use]
    pub const fn conservative() -> Self {
        Self {
            auto_accept_net_threshold: None,
        }
    }

    /// Accept when net change reaches `threshold`
    #[inline]
    #[must_use]
    pub const fn auto_accept_at(threshold: u32) -> Self {
        Self {
            auto_accept_net_threshold: Some(threshold),
        }
    }
}

/// Classified difference between a pass's before and after snapshots
///
/// `fixed`, `regressed` and `unchanged` partition the union of rule ids of
/// both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassDelta {
    pub pass_number: u32,
    pub fixed: BTreeSet<String>,
    pub regressed: BTreeSet<String>,
    pub unchanged: BTreeSet<String>,
    /// Subset of `regressed` whose failing severity is `error`
    pub critical: BTreeSet<String>,
    pub net_change: i64,
    pub recommendation: Recommendation,
}

impl PassDelta {
    /// Whether any critical regression was found
    #[inline]
    #[must_use]
    pub fn has_critical_regression(&self) -> bool {
        !self.critical.is_empty()
    }

    /// Number of rules classified
    #[inline]
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.fixed.len() + self.regressed.len() + self.unchanged.len()
    }
}

/// Compare two snapshots with the conservative review policy
#[must_use]
pub fn compare(before: &RuleSnapshot, after: &RuleSnapshot) -> PassDelta {
    compare_with_policy(before, after, &ReviewPolicy::conservative())
}

/// Compare two snapshots, promoting `review` per `policy`
#[must_use]
pub fn compare_with_policy(
    before: &RuleSnapshot,
    after: &RuleSnapshot,
    policy: &ReviewPolicy,
) -> PassDelta {
    let ids: BTreeSet<&String> = before.rules().keys().chain(after.rules().keys()).collect();

    let mut fixed = BTreeSet::new();
    let mut regressed = BTreeSet::new();
    let mut unchanged = BTreeSet::new();
    let mut critical = BTreeSet::new();

    for id in ids {
        let was_passing = before.is_passing(id);
        let now = after.status(id);
        let is_passing = now.map_or(true, |s| s.passed);

        match (was_passing, is_passing) {
            (false, true) => {
                fixed.insert(id.clone());
            }
            (true, false) => {
                if now.is_some_and(|s| s.severity == Severity::Error) {
                    critical.insert(id.clone());
                }
                regressed.insert(id.clone());
            }
            _ => {
                unchanged.insert(id.clone());
            }
        }
    }

    let net_change = fixed.len() as i64 - regressed.len() as i64;
    let recommendation = recommend(!critical.is_empty(), net_change, regressed.len(), policy);

    tracing::debug!(
        pass = after.pass_number(),
        fixed = fixed.len(),
        regressed = regressed.len(),
        critical = critical.len(),
        net_change,
        %recommendation,
        "compared pass snapshots"
    );

    PassDelta {
        pass_number: after.pass_number(),
        fixed,
        regressed,
        unchanged,
        critical,
        net_change,
        recommendation,
    }
}

/// Compare after checking both snapshots belong to the same job and pass
///
/// # Errors
/// - [`SnapshotError::JobMismatch`] if the job ids differ
/// - [`SnapshotError::PassMismatch`] if the pass numbers differ
/// - [`SnapshotError::KindMismatch`] if the kinds are not before/after
pub fn compare_checked(
    before: &RuleSnapshot,
    after: &RuleSnapshot,
    policy: &ReviewPolicy,
) -> Result<PassDelta, SnapshotError> {
    if before.job_id() != after.job_id() {
        return Err(SnapshotError::JobMismatch {
            before: before.job_id().clone(),
            after: after.job_id().clone(),
        });
    }
    if before.pass_number() != after.pass_number() {
        return Err(SnapshotError::PassMismatch {
            before: before.pass_number(),
            after: after.pass_number(),
        });
    }
    if before.kind() != SnapshotKind::Before {
        return Err(SnapshotError::KindMismatch {
            expected: SnapshotKind::Before,
            actual: before.kind(),
        });
    }
    if after.kind() != SnapshotKind::After {
        return Err(SnapshotError::KindMismatch {
            expected: SnapshotKind::After,
            actual: after.kind(),
        });
    }
    Ok(compare_with_policy(before, after, policy))
}

fn recommend(
    critical: bool,
    net_change: i64,
    regressed: usize,
    policy: &ReviewPolicy,
) -> Recommendation {
    if critical || net_change < 0 {
        return Recommendation::Revert;
    }
    if regressed == 0 {
        return Recommendation::Accept;
    }
    match policy.auto_accept_net_threshold {
        Some(threshold) if net_change >= i64::from(threshold) => Recommendation::Accept,
        _ => Recommendation::Review,
    }
}

/// Whether the delta asks for a revert
#[inline]
#[must_use]
pub fn should_revert(delta: &PassDelta) -> bool {
    delta.recommendation == Recommendation::Revert
}

/// Audit message for a revert, `None` for any other recommendation
#[must_use]
pub fn revert_reason(delta: &PassDelta) -> Option<String> {
    if !should_revert(delta) {
        return None;
    }
    let regressed: Vec<&str> = delta.regressed.iter().map(String::as_str).collect();
    let mut reason = format!(
        "pass {} reverted: regressed rules [{}], net change {:+}",
        delta.pass_number,
        regressed.join(", "),
        delta.net_change
    );
    if delta.has_critical_regression() {
        let critical: Vec<&str> = delta.critical.iter().map(String::as_str).collect();
        reason.push_str(&format!(", critical [{}]", critical.join(", ")));
    }
    Some(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHash;
    use crate::snapshot::{JobId, RuleStatus};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn snap(kind: SnapshotKind, rules: &[(&str, RuleStatus)]) -> RuleSnapshot {
        let rules: BTreeMap<String, RuleStatus> =
            rules.iter().map(|(id, s)| ((*id).to_string(), *s)).collect();
        RuleSnapshot::new(JobId::new("job"), 4, kind, rules, ContentHash::default()).unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_snapshots_accept() {
        let delta = compare(&snap(SnapshotKind::Before, &[]), &snap(SnapshotKind::After, &[]));
        assert_eq!(delta.recommendation, Recommendation::Accept);
        assert_eq!(delta.net_change, 0);
        assert_eq!(delta.rule_count(), 0);
    }

    #[test]
    fn critical_regression_overrides_positive_net() {
        let before = snap(
            SnapshotKind::Before,
            &[
                ("A1", RuleStatus::fail(Severity::Error, 1)),
                ("A2", RuleStatus::fail(Severity::Warning, 2)),
                ("CRITICAL1", RuleStatus::pass(Severity::Error)),
            ],
        );
        let after = snap(
            SnapshotKind::After,
            &[
                ("A1", RuleStatus::pass(Severity::Error)),
                ("A2", RuleStatus::pass(Severity::Warning)),
                ("CRITICAL1", RuleStatus::fail(Severity::Error, 1)),
            ],
        );
        let delta = compare(&before, &after);
        assert_eq!(delta.net_change, 1);
        assert_eq!(delta.fixed, set(&["A1", "A2"]));
        assert_eq!(delta.critical, set(&["CRITICAL1"]));
        assert_eq!(delta.recommendation, Recommendation::Revert);
        assert!(should_revert(&delta));
    }

    #[test]
    fn missing_rules_use_passing_baseline() {
        let before = snap(
            SnapshotKind::Before,
            &[
                ("GONE-FAILING", RuleStatus::fail(Severity::Warning, 1)),
                ("GONE-PASSING", RuleStatus::pass(Severity::Warning)),
            ],
        );
        let after = snap(
            SnapshotKind::After,
            &[
                ("NEW-FAILING", RuleStatus::fail(Severity::Info, 1)),
                ("NEW-PASSING", RuleStatus::pass(Severity::Info)),
            ],
        );
        let delta = compare(&before, &after);
        assert_eq!(delta.fixed, set(&["GONE-FAILING"]));
        assert_eq!(delta.regressed, set(&["NEW-FAILING"]));
        assert_eq!(delta.unchanged, set(&["GONE-PASSING", "NEW-PASSING"]));
    }

    #[test]
    fn negative_net_reverts() {
        let before = snap(SnapshotKind::Before, &[]);
        let after = snap(
            SnapshotKind::After,
            &[("W1", RuleStatus::fail(Severity::Warning, 1))],
        );
        let delta = compare(&before, &after);
        assert_eq!(delta.net_change, -1);
        assert_eq!(delta.recommendation, Recommendation::Revert);
        assert!(!delta.has_critical_regression());
    }

    #[test]
    fn offset_regression_goes_to_review() {
        let before = snap(
            SnapshotKind::Before,
            &[
                ("W1", RuleStatus::pass(Severity::Warning)),
                ("W2", RuleStatus::fail(Severity::Warning, 1)),
            ],
        );
        let after = snap(
            SnapshotKind::After,
            &[
                ("W1", RuleStatus::fail(Severity::Warning, 1)),
                ("W2", RuleStatus::pass(Severity::Warning)),
            ],
        );
        let delta = compare(&before, &after);
        assert_eq!(delta.net_change, 0);
        assert_eq!(delta.recommendation, Recommendation::Review);
        assert_eq!(revert_reason(&delta), None);
    }

    #[test]
    fn policy_threshold_promotes_review() {
        let before = snap(
            SnapshotKind::Before,
            &[
                ("W1", RuleStatus::pass(Severity::Warning)),
                ("W2", RuleStatus::fail(Severity::Warning, 1)),
                ("W3", RuleStatus::fail(Severity::Warning, 1)),
                ("W4", RuleStatus::fail(Severity::Info, 1)),
            ],
        );
        let after = snap(
            SnapshotKind::After,
            &[("W1", RuleStatus::fail(Severity::Warning, 1))],
        );
        let conservative = compare(&before, &after);
        assert_eq!(conservative.net_change, 2);
        assert_eq!(conservative.recommendation, Recommendation::Review);

        let promoted = compare_with_policy(&before, &after, &ReviewPolicy::auto_accept_at(2));
        assert_eq!(promoted.recommendation, Recommendation::Accept);

        let too_high = compare_with_policy(&before, &after, &ReviewPolicy::auto_accept_at(3));
        assert_eq!(too_high.recommendation, Recommendation::Review);
    }

    #[test]
    fn revert_reason_names_rules_and_signed_net() {
        let before = snap(SnapshotKind::Before, &[]);
        let after = snap(
            SnapshotKind::After,
            &[
                ("H1-SINGLE", RuleStatus::fail(Severity::Error, 2)),
                ("KW", RuleStatus::fail(Severity::Warning, 1)),
            ],
        );
        let delta = compare(&before, &after);
        let reason = revert_reason(&delta).unwrap();
        assert_eq!(
            reason,
            "pass 4 reverted: regressed rules [H1-SINGLE, KW], net change -2, critical [H1-SINGLE]"
        );
    }

    #[test]
    fn checked_compare_rejects_cross_pass() {
        let before = snap(SnapshotKind::Before, &[]);
        let after = RuleSnapshot::new(
            JobId::new("job"),
            5,
            SnapshotKind::After,
            BTreeMap::new(),
            ContentHash::default(),
        )
        .unwrap();
        let err = compare_checked(&before, &after, &ReviewPolicy::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::PassMismatch { before: 4, after: 5 }));
    }

    #[test]
    fn checked_compare_rejects_swapped_kinds() {
        let before = snap(SnapshotKind::Before, &[]);
        let after = snap(SnapshotKind::After, &[]);
        let err = compare_checked(&after, &before, &ReviewPolicy::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::KindMismatch { .. }));
        assert!(compare_checked(&before, &after, &ReviewPolicy::default()).is_ok());
    }
}
