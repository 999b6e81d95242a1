//! Property-based tests for Partforge core domain models
//!
//! Covers currency rounding and the cumulative-requirement fold over
//! generated BOM trees.

use proptest::prelude::*;

use crate::{round_currency, BomNode, CompositionEntry, TruncationReason};

prop_compose! {
    fn arb_ipn()(prefix in "(RES|CAP|IC)", number in 1..999u32) -> String {
        format!("{}-{:03}", prefix, number)
    }
}

fn chain(quantities: &[f64], leaf: &str) -> BomNode {
    let mut node = BomNode::new(leaf, "");
    node.apply_entry(&CompositionEntry::new(leaf, *quantities.last().unwrap_or(&1.0)));
    for (level, qty) in quantities.iter().rev().skip(1).enumerate() {
        let ipn = format!("PCA-L{}", level);
        let mut parent = BomNode::new(&ipn, "");
        parent.apply_entry(&CompositionEntry::new(&ipn, *qty));
        parent.children.push(node);
        node = parent;
    }
    let mut root = BomNode::new("ASY-ROOT", "");
    root.children.push(node);
    root
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Rounding is idempotent and moves a value by at most half a cent
    #[test]
    fn prop_round_currency_is_stable(amount in 0.0f64..1_000_000.0) {
        let rounded = round_currency(amount);
        prop_assert_eq!(round_currency(rounded), rounded);
        prop_assert!((rounded - amount).abs() <= 0.005 + 1e-9);
    }

    /// A straight chain requires the product of its quantities of the leaf
    #[test]
    fn prop_chain_requirement_is_product(
        quantities in prop::collection::vec(0.0f64..20.0, 1..6),
        leaf in arb_ipn(),
    ) {
        let root = chain(&quantities, &leaf);
        let expected: f64 = quantities.iter().product();
        let required = root.required_quantities();
        let actual = required.get(&leaf).copied().unwrap_or(0.0);
        prop_assert!((actual - expected).abs() <= expected.abs() * 1e-9 + 1e-12);
    }

    /// Display quantities never accumulate down the tree
    #[test]
    fn prop_node_qty_is_immediate(quantities in prop::collection::vec(0.0f64..20.0, 1..6)) {
        let root = chain(&quantities, "RES-001");
        let mut node = &root.children[0];
        for qty in &quantities {
            prop_assert_eq!(node.qty, Some(*qty));
            match node.children.first() {
                Some(next) => node = next,
                None => break,
            }
        }
    }

    /// Placeholders never contribute requirements
    #[test]
    fn prop_placeholders_contribute_nothing(qty in 0.0f64..20.0) {
        let mut root = BomNode::new("PCA-X", "");
        let mut placeholder = BomNode::placeholder("PCA-X", TruncationReason::Depth);
        placeholder.apply_entry(&CompositionEntry::new("PCA-X", qty));
        root.children.push(placeholder);
        prop_assert!(root.required_quantities().is_empty());
        prop_assert_eq!(root.placeholders().len(), 1);
    }
}
