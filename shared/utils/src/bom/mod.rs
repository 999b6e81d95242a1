//! BOM (Bill of Materials) Resolution Module
//!
//! Recursive expansion of assemblies into display trees and cost rollups over
//! the same, possibly cyclic, composition graph.

pub mod parser;
pub mod locator;
pub mod traversal;
pub mod resolver;
pub mod rollup;
pub mod engine;

pub use parser::{parse_quantity, ColumnRoles, CompositionParser, ParsedComposition};
pub use locator::{CompositionDirectory, CompositionSource, InMemoryCompositions};
pub use traversal::TraversalLimits;
pub use resolver::BomResolver;
pub use rollup::{CostRollup, PriceLookup, RolledUpCost};
pub use engine::BomEngine;
