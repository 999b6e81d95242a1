//! Bill of Materials domain models.
//!
//! `CompositionEntry` is one line of an assembly's composition file and
//! `BomNode` is the resolved, display-oriented tree built from those lines.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One BOM line: a child of the assembly whose composition file was read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionEntry {
    pub ipn: String,
    /// Always finite and non-negative; malformed input falls back to 1.
    pub qty: f64,
    pub reference: Option<String>,
    pub description: Option<String>,
}

impl CompositionEntry {
    pub fn new(ipn: impl Into<String>, qty: f64) -> Self {
        Self {
            ipn: ipn.into(),
            qty,
            reference: None,
            description: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Why a node was cut short instead of being expanded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// The node sits deeper than the configured maximum depth.
    Depth,
    /// The node's IPN already appears on the path from the root.
    Cycle,
    /// The per-call expansion budget ran out.
    Budget,
}

impl TruncationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::Cycle => "cycle",
            Self::Budget => "budget",
        }
    }

    /// Description used for placeholder nodes.
    pub fn placeholder_description(&self) -> &'static str {
        match self {
            Self::Depth => "[truncated: maximum BOM depth reached]",
            Self::Cycle => "[truncated: circular reference]",
            Self::Budget => "[truncated: expansion budget exhausted]",
        }
    }
}

/// A node of a resolved BOM tree.
///
/// `qty` is the quantity stated in the immediate parent's composition row,
/// not the cumulative product along the path. Use
/// [`BomNode::required_quantities`] for multiplied requirements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BomNode {
    pub ipn: String,
    pub description: String,
    pub qty: Option<f64>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub children: Vec<BomNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<TruncationReason>,
}

impl BomNode {
    pub fn new(ipn: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            ipn: ipn.into(),
            description: description.into(),
            qty: None,
            reference: None,
            children: Vec::new(),
            truncated: None,
        }
    }

    /// Terminal node standing in for a subtree that was not expanded.
    pub fn placeholder(ipn: impl Into<String>, reason: TruncationReason) -> Self {
        let mut node = Self::new(ipn, reason.placeholder_description());
        node.truncated = Some(reason);
        node
    }

    pub fn is_placeholder(&self) -> bool {
        self.truncated.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Applies the parent's composition row to this node.
    ///
    /// Quantity and reference always come from the row; the row description
    /// only fills in when the node has none of its own.
    pub fn apply_entry(&mut self, entry: &CompositionEntry) {
        self.qty = Some(entry.qty);
        self.reference = entry.reference.clone();
        if self.description.is_empty() {
            if let Some(description) = &entry.description {
                self.description = description.clone();
            }
        }
    }

    /// Total number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BomNode::node_count).sum::<usize>()
    }

    /// Number of levels below this node (0 for a childless node).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Iterates over the placeholders in this subtree, depth first.
    pub fn placeholders(&self) -> Vec<&BomNode> {
        let mut found = Vec::new();
        self.collect_placeholders(&mut found);
        found
    }

    fn collect_placeholders<'a>(&'a self, found: &mut Vec<&'a BomNode>) {
        if self.is_placeholder() {
            found.push(self);
        }
        for child in &self.children {
            child.collect_placeholders(found);
        }
    }

    /// Cumulative requirement per leaf IPN for one unit of this node.
    ///
    /// Each leaf contributes the product of the quantities on its path below
    /// this node. Placeholders contribute nothing.
    ///
    /// A childless node counts as a leaf even when it is an assembly whose
    /// composition is missing or empty. The cost rollup prices such an
    /// assembly at 0, so the two agree only while assemblies have no entry
    /// in the price book being applied.
    pub fn required_quantities(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for child in &self.children {
            child.accumulate_requirements(1.0, &mut totals);
        }
        totals
    }

    fn accumulate_requirements(&self, multiplier: f64, totals: &mut BTreeMap<String, f64>) {
        if self.is_placeholder() {
            return;
        }
        let extended = multiplier * self.qty.unwrap_or(1.0);
        if self.children.is_empty() {
            *totals.entry(self.ipn.clone()).or_insert(0.0) += extended;
        } else {
            for child in &self.children {
                child.accumulate_requirements(extended, totals);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(ipn: &str, qty: f64) -> BomNode {
        let mut node = BomNode::new(ipn, "");
        node.apply_entry(&CompositionEntry::new(ipn, qty));
        node
    }

    #[test]
    fn test_apply_entry_keeps_own_description() {
        let mut node = BomNode::new("PCA-A", "Main board");
        node.apply_entry(
            &CompositionEntry::new("PCA-A", 2.0)
                .with_reference("U1")
                .with_description("Row text"),
        );
        assert_eq!(node.description, "Main board");
        assert_eq!(node.qty, Some(2.0));
        assert_eq!(node.reference.as_deref(), Some("U1"));
    }

    #[test]
    fn test_apply_entry_fills_empty_description() {
        let mut node = BomNode::new("PCA-A", "");
        node.apply_entry(&CompositionEntry::new("PCA-A", 1.0).with_description("Row text"));
        assert_eq!(node.description, "Row text");
    }

    #[test]
    fn test_required_quantities_multiplies_path() {
        let mut inner = child("PCA-B", 3.0);
        inner.children.push(child("RES-001", 4.0));
        let mut root = BomNode::new("ASY-ROOT", "");
        root.children.push(inner);
        root.children.push(child("RES-001", 1.0));

        let required = root.required_quantities();
        assert_eq!(required.get("RES-001"), Some(&13.0));
    }

    #[test]
    fn test_required_quantities_counts_childless_assembly() {
        let mut root = BomNode::new("ASY-ROOT", "");
        root.children.push(child("PCA-EMPTY", 2.0));
        root.children.push(child("RES-001", 1.0));

        let required = root.required_quantities();
        assert_eq!(required.get("PCA-EMPTY"), Some(&2.0));
        assert_eq!(required.get("RES-001"), Some(&1.0));
    }

    #[test]
    fn test_required_quantities_skips_placeholders() {
        let mut root = BomNode::new("PCA-X", "");
        let mut placeholder = BomNode::placeholder("PCA-X", TruncationReason::Depth);
        placeholder.apply_entry(&CompositionEntry::new("PCA-X", 1.0));
        root.children.push(placeholder);
        assert!(root.required_quantities().is_empty());
    }

    #[test]
    fn test_placeholder_serialization() {
        let node = BomNode::placeholder("PCA-X", TruncationReason::Cycle);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["truncated"], "cycle");
        assert_eq!(json["ref"], serde_json::Value::Null);
        assert_eq!(json["children"].as_array().map(Vec::len), Some(0));

        let plain = serde_json::to_value(BomNode::new("PCA-Y", "")).unwrap();
        assert!(plain.get("truncated").is_none());
    }

    #[test]
    fn test_depth_and_count() {
        let mut mid = child("PCA-B", 1.0);
        mid.children.push(child("RES-001", 1.0));
        let mut root = BomNode::new("ASY-ROOT", "");
        root.children.push(mid);
        assert_eq!(root.depth(), 2);
        assert_eq!(root.node_count(), 3);
    }
}
