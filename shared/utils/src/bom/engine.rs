//! BOM Engine
//!
//! Binds the resolver and the cost rollup to the configured catalog and
//! composition directories. Stateless between calls: every resolution reloads
//! the part catalog once and shares it across the whole walk.

use partforge_models::BomNode;
use std::time::Instant;
use tracing::info;

use super::locator::CompositionDirectory;
use super::resolver::BomResolver;
use super::rollup::{CostRollup, PriceLookup, RolledUpCost};
use super::traversal::TraversalLimits;
use crate::catalog::FlatFileCatalog;
use crate::config::BomConfig;
use crate::error::{PartforgeError, PartforgeResult};
use crate::validation::{validate_model, AssemblyConvention};

#[derive(Debug, Clone)]
pub struct BomEngine {
    catalog: FlatFileCatalog,
    compositions: CompositionDirectory,
    convention: AssemblyConvention,
    limits: TraversalLimits,
}

impl BomEngine {
    pub fn from_config(config: &BomConfig) -> PartforgeResult<Self> {
        validate_model(config).map_err(|e| PartforgeError::configuration(e.to_string()))?;

        Ok(Self {
            catalog: FlatFileCatalog::new(&config.parts_root),
            compositions: CompositionDirectory::new(
                &config.composition_root,
                &config.composition_extensions,
            ),
            convention: AssemblyConvention::new(&config.assembly_prefixes)?,
            limits: TraversalLimits::from(config),
        })
    }

    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn convention(&self) -> &AssemblyConvention {
        &self.convention
    }

    pub fn limits(&self) -> TraversalLimits {
        self.limits
    }

    pub fn resolve_bom(&self, ipn: &str) -> PartforgeResult<BomNode> {
        let started = Instant::now();
        let catalog = self.catalog.load();

        let tree = BomResolver::new(&catalog, &self.compositions, &self.convention)
            .with_limits(self.limits)
            .resolve(ipn)?;

        info!(
            ipn = %ipn,
            nodes = tree.node_count(),
            truncated = tree.placeholders().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "BOM resolved"
        );
        Ok(tree)
    }

    pub fn rollup_cost(&self, ipn: &str, prices: &dyn PriceLookup) -> PartforgeResult<f64> {
        self.rollup_cost_detailed(ipn, prices).map(|rolled| rolled.cost)
    }

    pub fn rollup_cost_detailed(
        &self,
        ipn: &str,
        prices: &dyn PriceLookup,
    ) -> PartforgeResult<RolledUpCost> {
        let started = Instant::now();

        let rolled = CostRollup::new(&self.compositions, &self.convention, prices)
            .with_limits(self.limits)
            .rollup_detailed(ipn)?;

        info!(
            ipn = %ipn,
            cost = rolled.cost,
            truncated = rolled.truncations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "BOM cost rolled up"
        );
        Ok(rolled)
    }
}
