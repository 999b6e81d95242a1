//! # Partforge Core Domain Models
//!
//! Data types shared by the BOM resolution engine, the price history store
//! and the HTTP query surface.
//!
//! ## Key Models
//!
//! - **Part**: a catalog entry keyed by IPN with a few well-known fields
//! - **CompositionEntry**: one line of an assembly's composition file
//! - **BomNode**: a node of a resolved, display-oriented BOM tree
//! - **PurchaseRecord**: the latest priced purchase order line for an IPN
//! - **CostReport**: the cost query response
//! - **PriceBook**: per-request memo of unit prices

pub mod part;
pub mod bom;
pub mod cost;

#[cfg(test)]
pub mod property_tests;

pub use part::*;
pub use bom::*;
pub use cost::*;
