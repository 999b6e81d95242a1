//! Traversal guards shared by the tree resolver and the cost rollup.
//!
//! Both walks visit the same composition graph, which may be cyclic. Depth,
//! expansion count and ancestor path are tracked here so the two walks stop
//! at exactly the same places.

use partforge_models::TruncationReason;

use crate::config::{BomConfig, CyclePolicy};
use crate::error::{PartforgeError, PartforgeResult};

/// Limits applied to a single resolution or rollup call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Nodes deeper than this (root = 0) are not expanded.
    pub max_depth: usize,
    /// Maximum number of composition loads per call.
    pub max_expansions: usize,
    pub cycle_policy: CyclePolicy,
}

impl TraversalLimits {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_expansions: 10_000,
            cycle_policy: CyclePolicy::DepthLimit,
        }
    }
}

impl From<&BomConfig> for TraversalLimits {
    fn from(config: &BomConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_expansions: config.max_expansions,
            cycle_policy: config.cycle_policy,
        }
    }
}

/// What the walk should do with an assembly it is about to descend into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    Expand,
    DepthExceeded,
    Cycle,
    BudgetExhausted,
}

impl Visit {
    /// The placeholder reason for every outcome except `Expand`.
    pub(crate) fn truncation(self) -> Option<TruncationReason> {
        match self {
            Self::Expand => None,
            Self::DepthExceeded => Some(TruncationReason::Depth),
            Self::Cycle => Some(TruncationReason::Cycle),
            Self::BudgetExhausted => Some(TruncationReason::Budget),
        }
    }
}

/// Mutable walk state: expansions spent and the IPNs from the root down to
/// the node being expanded.
#[derive(Debug)]
pub(crate) struct Walk {
    limits: TraversalLimits,
    expansions: usize,
    path: Vec<String>,
    truncations: Vec<TruncationReason>,
}

impl Walk {
    pub(crate) fn new(limits: TraversalLimits) -> Self {
        Self {
            limits,
            expansions: 0,
            path: Vec::new(),
            truncations: Vec::new(),
        }
    }

    /// Decides whether `ipn` at `depth` may be expanded and, if so, spends
    /// one unit of the expansion budget.
    ///
    /// Under the `reject` policy a revisited ancestor is an error.
    pub(crate) fn admit(&mut self, ipn: &str, depth: usize) -> PartforgeResult<Visit> {
        let visit = self.check(ipn, depth)?;
        if let Some(reason) = visit.truncation() {
            self.truncations.push(reason);
        }
        Ok(visit)
    }

    fn check(&mut self, ipn: &str, depth: usize) -> PartforgeResult<Visit> {
        if depth > self.limits.max_depth {
            return Ok(Visit::DepthExceeded);
        }

        if self.limits.cycle_policy != CyclePolicy::DepthLimit && self.on_path(ipn) {
            if self.limits.cycle_policy == CyclePolicy::Reject {
                let mut cycle = self.path.clone();
                cycle.push(ipn.to_string());
                return Err(PartforgeError::cycle_detected(cycle));
            }
            return Ok(Visit::Cycle);
        }

        if self.expansions >= self.limits.max_expansions {
            return Ok(Visit::BudgetExhausted);
        }

        self.expansions += 1;
        Ok(Visit::Expand)
    }

    pub(crate) fn enter(&mut self, ipn: &str) {
        self.path.push(ipn.to_string());
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    pub(crate) fn expansions(&self) -> usize {
        self.expansions
    }

    /// Truncated branches in the order they were cut off
    pub(crate) fn into_truncations(self) -> Vec<TruncationReason> {
        self.truncations
    }

    fn on_path(&self, ipn: &str) -> bool {
        self.path.iter().any(|ancestor| ancestor == ipn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_guard_is_exclusive() {
        let mut walk = Walk::new(TraversalLimits::default().with_max_depth(2));
        assert_eq!(walk.admit("PCA-A", 2).unwrap(), Visit::Expand);
        assert_eq!(walk.admit("PCA-A", 3).unwrap(), Visit::DepthExceeded);
    }

    #[test]
    fn test_budget_is_spent_per_expansion() {
        let mut walk = Walk::new(TraversalLimits::default().with_max_expansions(2));
        assert_eq!(walk.admit("PCA-A", 0).unwrap(), Visit::Expand);
        assert_eq!(walk.admit("PCA-B", 1).unwrap(), Visit::Expand);
        assert_eq!(walk.admit("PCA-C", 1).unwrap(), Visit::BudgetExhausted);
        assert_eq!(walk.expansions(), 2);
        assert_eq!(walk.into_truncations(), vec![TruncationReason::Budget]);
    }

    #[test]
    fn test_cycle_policies() {
        let limits = TraversalLimits::default();

        let mut walk = Walk::new(limits);
        walk.enter("PCA-X");
        assert_eq!(walk.admit("PCA-X", 1).unwrap(), Visit::Expand);

        let mut walk = Walk::new(limits.with_cycle_policy(CyclePolicy::Detect));
        walk.enter("PCA-X");
        assert_eq!(walk.admit("PCA-X", 1).unwrap(), Visit::Cycle);
        walk.leave();
        assert_eq!(walk.admit("PCA-X", 1).unwrap(), Visit::Expand);

        let mut walk = Walk::new(limits.with_cycle_policy(CyclePolicy::Reject));
        walk.enter("PCA-X");
        walk.enter("PCA-Y");
        let err = walk.admit("PCA-X", 2).unwrap_err();
        assert_eq!(err.error_code(), "CYCLE_DETECTED");
        assert!(err.to_string().contains("PCA-X -> PCA-Y -> PCA-X"));
    }
}
