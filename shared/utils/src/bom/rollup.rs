//! Cost Rollup
//!
//! Walks the same composition graph as the tree resolver, under the same
//! guards, but folds it into a single number: each leaf contributes its last
//! known unit price times its row quantity, each sub-assembly its own rolled
//! up cost times its row quantity. Truncated branches contribute nothing, so
//! the result for cyclic or very deep structures is an undercount.

use partforge_models::{PriceBook, TruncationReason};
use tracing::{debug, warn};

use super::locator::CompositionSource;
use super::traversal::{TraversalLimits, Walk};
use crate::error::PartforgeResult;
use crate::validation::AssemblyConvention;

/// Unit price source consulted for leaf parts
pub trait PriceLookup {
    /// Latest known non-zero unit price, `None` when unknown.
    fn unit_price(&self, ipn: &str) -> PartforgeResult<Option<f64>>;
}

impl PriceLookup for PriceBook {
    fn unit_price(&self, ipn: &str) -> PartforgeResult<Option<f64>> {
        Ok(self.get(ipn).flatten())
    }
}

/// Rollup result with the reasons of every truncated branch
#[derive(Debug, Clone, PartialEq)]
pub struct RolledUpCost {
    pub cost: f64,
    pub truncations: Vec<TruncationReason>,
}

pub struct CostRollup<'a> {
    compositions: &'a dyn CompositionSource,
    convention: &'a AssemblyConvention,
    prices: &'a dyn PriceLookup,
    limits: TraversalLimits,
}

impl<'a> CostRollup<'a> {
    pub fn new(
        compositions: &'a dyn CompositionSource,
        convention: &'a AssemblyConvention,
        prices: &'a dyn PriceLookup,
    ) -> Self {
        Self {
            compositions,
            convention,
            prices,
            limits: TraversalLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Rolled-up cost of one unit of `ipn`; always finite and non-negative.
    pub fn rollup(&self, ipn: &str) -> PartforgeResult<f64> {
        self.rollup_detailed(ipn).map(|rolled| rolled.cost)
    }

    /// Like [`CostRollup::rollup`], also reporting the branches that were
    /// cut off and so contributed nothing.
    pub fn rollup_detailed(&self, ipn: &str) -> PartforgeResult<RolledUpCost> {
        self.convention.validate_assembly(ipn)?;

        let mut walk = Walk::new(self.limits);
        let cost = self.assembly_cost(ipn, 0, &mut walk)?;

        debug!(ipn = %ipn, cost = cost, expansions = walk.expansions(), "Rolled up BOM cost");
        Ok(RolledUpCost {
            cost,
            truncations: walk.into_truncations(),
        })
    }

    fn assembly_cost(&self, ipn: &str, depth: usize, walk: &mut Walk) -> PartforgeResult<f64> {
        if let Some(reason) = walk.admit(ipn, depth)?.truncation() {
            warn!(ipn = %ipn, depth = depth, reason = reason.as_str(), "Cost rollup truncated, branch contributes 0");
            return Ok(0.0);
        }

        let Some(entries) = self.compositions.load(ipn) else {
            return Ok(0.0);
        };

        walk.enter(ipn);
        let mut total = 0.0;
        for entry in &entries {
            let unit_cost = if self.convention.is_assembly(&entry.ipn) {
                self.assembly_cost(&entry.ipn, depth + 1, walk)?
            } else {
                self.leaf_price(&entry.ipn)?
            };
            total += unit_cost * entry.qty;
        }
        walk.leave();

        Ok(saturate(ipn, total))
    }

    fn leaf_price(&self, ipn: &str) -> PartforgeResult<f64> {
        let price = self
            .prices
            .unit_price(ipn)?
            .filter(|p| p.is_finite() && *p > 0.0);
        if price.is_none() {
            debug!(ipn = %ipn, "No purchase price known, contributes 0");
        }
        Ok(price.unwrap_or(0.0))
    }
}

fn saturate(ipn: &str, total: f64) -> f64 {
    if total.is_finite() {
        total
    } else {
        warn!(ipn = %ipn, "Rolled up cost overflowed, saturating");
        f64::MAX
    }
}
