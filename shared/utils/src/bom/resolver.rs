//! BOM Tree Resolver
//!
//! Expands an assembly into a display tree, depth first, in composition-file
//! row order. Every node carries the quantity from its immediate parent's row
//! only; the cost rollup is the place where quantities multiply.

use partforge_models::BomNode;
use tracing::{debug, warn};

use super::locator::CompositionSource;
use super::traversal::{TraversalLimits, Visit, Walk};
use crate::catalog::PartCatalog;
use crate::error::PartforgeResult;
use crate::validation::AssemblyConvention;

pub struct BomResolver<'a> {
    catalog: &'a dyn PartCatalog,
    compositions: &'a dyn CompositionSource,
    convention: &'a AssemblyConvention,
    limits: TraversalLimits,
}

impl<'a> BomResolver<'a> {
    pub fn new(
        catalog: &'a dyn PartCatalog,
        compositions: &'a dyn CompositionSource,
        convention: &'a AssemblyConvention,
    ) -> Self {
        Self {
            catalog,
            compositions,
            convention,
            limits: TraversalLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolves the BOM tree of an assembly.
    ///
    /// Fails only when `ipn` is not an assembly, or when a cycle is found
    /// under the `reject` policy. Missing or malformed composition data
    /// yields fewer children, never an error.
    pub fn resolve(&self, ipn: &str) -> PartforgeResult<BomNode> {
        self.convention.validate_assembly(ipn)?;

        let mut walk = Walk::new(self.limits);
        let root = self.resolve_assembly(ipn, 0, &mut walk)?;

        debug!(
            ipn = %ipn,
            nodes = root.node_count(),
            expansions = walk.expansions(),
            "Resolved BOM tree"
        );
        Ok(root)
    }

    fn resolve_assembly(&self, ipn: &str, depth: usize, walk: &mut Walk) -> PartforgeResult<BomNode> {
        let visit = walk.admit(ipn, depth)?;
        if let Some(reason) = visit.truncation() {
            warn!(ipn = %ipn, depth = depth, reason = reason.as_str(), "BOM expansion truncated");
            return Ok(BomNode::placeholder(ipn, reason));
        }
        debug_assert_eq!(visit, Visit::Expand);

        let mut node = BomNode::new(ipn, self.catalog.description_of(ipn));
        let Some(entries) = self.compositions.load(ipn) else {
            debug!(ipn = %ipn, "No composition file, assembly has no children");
            return Ok(node);
        };

        walk.enter(ipn);
        for entry in &entries {
            let mut child = if self.convention.is_assembly(&entry.ipn) {
                self.resolve_assembly(&entry.ipn, depth + 1, walk)?
            } else {
                let description = entry
                    .description
                    .clone()
                    .unwrap_or_else(|| self.catalog.description_of(&entry.ipn));
                BomNode::new(&entry.ipn, description)
            };
            child.apply_entry(entry);
            node.children.push(child);
        }
        walk.leave();

        Ok(node)
    }
}
